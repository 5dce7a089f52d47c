//! Console output formatting.
//!
//! # Output Format
//!
//! ```text
//! Processing 3 images from scans/2019
//! Processed: 001.jpg (1840x2610)
//! Error processing 002.jpg: could not read image (Failed to decode ...)
//! Processed: 003.jpg (1838x2604)
//! Finished processing images from scans/2019
//! Successful: 2, Failed: 1
//!
//! All processing completed
//! ```
//!
//! Failure and missing-input lines go to stderr, everything else to stdout.
//!
//! # Architecture
//!
//! [`format_batch_event`] is pure (returns lines, no I/O) for testability;
//! [`print_batch_event`] writes them to the right stream. [`spawn_printer`]
//! runs the printing on its own thread so workers never wait on the console.

use crate::batch::{BatchEvent, InputKind};
use crate::job::JobOutcome;
use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("console output thread panicked")]
pub struct PrinterPanicked;

/// Which console stream a formatted event belongs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Stream for `event`: problems go to stderr.
pub fn event_stream(event: &BatchEvent) -> Stream {
    match event {
        BatchEvent::ImageFinished(JobOutcome::Failure { .. }) | BatchEvent::InputMissing { .. } => {
            Stream::Stderr
        }
        _ => Stream::Stdout,
    }
}

fn images_noun(count: usize) -> &'static str {
    if count == 1 { "image" } else { "images" }
}

/// Format a single batch event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started {
            source,
            image_count,
        } => vec![format!(
            "Processing {} {} from {}",
            image_count,
            images_noun(*image_count),
            source.display()
        )],
        BatchEvent::ImageFinished(JobOutcome::Success {
            identifier,
            width,
            height,
            ..
        }) => vec![format!("Processed: {} ({}x{})", identifier, width, height)],
        BatchEvent::ImageFinished(JobOutcome::Failure {
            identifier,
            message,
        }) => vec![format!("Error processing {}: {}", identifier, message)],
        BatchEvent::Finished { source, report } => vec![
            format!("Finished processing images from {}", source.display()),
            format!(
                "Successful: {}, Failed: {}",
                report.success_count, report.failure_count
            ),
        ],
        BatchEvent::InputMissing { path, kind } => {
            let what = match kind {
                InputKind::Folder => "Input folder",
                InputKind::Image => "Input image",
            };
            vec![format!("Error: {} {} does not exist", what, path.display())]
        }
    }
}

pub fn print_batch_event(event: &BatchEvent) {
    let stream = event_stream(event);
    for line in format_batch_event(event) {
        match stream {
            Stream::Stdout => println!("{}", line),
            Stream::Stderr => eprintln!("{}", line),
        }
    }
}

/// Print every event received on `rx` from a dedicated thread.
///
/// The thread ends once every sender has been dropped.
pub fn spawn_printer(rx: Receiver<BatchEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        for event in rx {
            print_batch_event(&event);
        }
    })
}

/// Wait for the printer thread, turning a panic in it into an error.
pub fn join_printer(printer: JoinHandle<()>) -> Result<(), PrinterPanicked> {
    printer.join().map_err(|_| PrinterPanicked)
}

/// Closing line printed once every input has been handled.
pub fn format_completion() -> Vec<String> {
    vec![String::new(), "All processing completed".to_string()]
}

pub fn print_completion() {
    for line in format_completion() {
        println!("{}", line);
    }
}
