//! Running a batch of crop jobs on a bounded worker pool.
//!
//! A batch is every image from one input folder (or one explicitly named
//! image). [`run_batch`] builds a rayon pool of exactly `workers` threads for
//! the batch, spawns one [`run_job`] per image into it, and collects the
//! outcomes on the calling thread through an mpsc channel:
//!
//! ```text
//!            ┌─ worker 1 ─ run_job(a.jpg) ─┐
//! identifiers┼─ worker 2 ─ run_job(b.jpg) ─┼─► channel ─► BatchReport
//!            └─ worker N ─ run_job(c.jpg) ─┘      │
//!                                                 └─► BatchEvent::ImageFinished
//! ```
//!
//! Outcomes arrive in completion order and are forwarded as events the
//! moment they are received, so a failure is reported while the rest of the
//! batch is still running. Jobs share nothing but the channel; the report is
//! owned by the collecting thread alone.
//!
//! [`run_batch`] blocks until every job has finished.

use crate::imaging::{ImageBackend, Threshold, is_supported_image};
use crate::job::{ImageJob, JobOutcome, run_job};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Could not create output folder {path}: {source}")]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not list input folder {folder}: {source}")]
    List {
        folder: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Could not start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("Input folder {0} is not a folder")]
    NotAFolder(PathBuf),
    #[error("Worker count must be at least 1")]
    NoWorkers,
}

/// Per-batch settings, fixed for the duration of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    pub threshold: Threshold,
    /// Number of concurrent workers. Must be at least 1.
    pub workers: usize,
}

/// Success and failure counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub success_count: usize,
    pub failure_count: usize,
}

impl BatchReport {
    pub fn record(&mut self, outcome: &JobOutcome) {
        if outcome.is_success() {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }
}

/// What kind of input was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Folder,
    Image,
}

/// Progress events, in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Started {
        source: PathBuf,
        image_count: usize,
    },
    ImageFinished(JobOutcome),
    Finished {
        source: PathBuf,
        report: BatchReport,
    },
    /// A requested input does not exist and was skipped.
    InputMissing {
        path: PathBuf,
        kind: InputKind,
    },
}

pub(crate) fn emit(events: Option<&Sender<BatchEvent>>, event: BatchEvent) {
    if let Some(tx) = events {
        tx.send(event).ok();
    }
}

/// File names in `folder` with a recognised image extension, sorted.
///
/// Only direct children are listed. Entries that cannot be inspected are
/// skipped with a warning; failing to read the folder itself, or `folder`
/// being something other than a directory, is an error.
pub fn list_images(folder: &Path) -> Result<Vec<String>, BatchError> {
    if folder.exists() && !folder.is_dir() {
        return Err(BatchError::NotAFolder(folder.to_path_buf()));
    }
    let mut names = Vec::new();

    let walker = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(BatchError::List {
                    folder: folder.to_path_buf(),
                    source: err,
                });
            }
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_supported_image(entry.path()) {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => names.push(name.to_string()),
            None => warn!(path = %entry.path().display(), "skipping non-UTF-8 file name"),
        }
    }

    Ok(names)
}

/// Crop every image in `identifiers` from `source_folder` into
/// `destination_folder`, using `settings.workers` concurrent workers.
///
/// Creates `destination_folder` first. Per-image failures are counted in the
/// returned report; only setup problems (output folder, worker pool) are
/// returned as errors.
pub fn run_batch<B: ImageBackend>(
    backend: &B,
    identifiers: &[String],
    source_folder: &Path,
    destination_folder: &Path,
    settings: &BatchSettings,
    events: Option<&Sender<BatchEvent>>,
) -> Result<BatchReport, BatchError> {
    if settings.workers == 0 {
        return Err(BatchError::NoWorkers);
    }

    std::fs::create_dir_all(destination_folder).map_err(|source| BatchError::CreateOutput {
        path: destination_folder.to_path_buf(),
        source,
    })?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.workers)
        .thread_name(|i| format!("autocrop-worker-{i}"))
        .build()?;

    debug!(
        source = %source_folder.display(),
        images = identifiers.len(),
        workers = settings.workers,
        "starting batch"
    );
    emit(
        events,
        BatchEvent::Started {
            source: source_folder.to_path_buf(),
            image_count: identifiers.len(),
        },
    );

    let threshold = settings.threshold;
    let (tx, rx) = mpsc::channel::<JobOutcome>();
    let mut report = BatchReport::default();

    pool.in_place_scope(|scope| {
        for identifier in identifiers {
            let job = ImageJob::new(identifier, source_folder, destination_folder);
            let tx = tx.clone();
            scope.spawn(move |_| {
                tx.send(run_job(backend, &job, threshold)).ok();
            });
        }
        // The loop below ends once every worker has dropped its sender.
        drop(tx);

        for outcome in rx {
            report.record(&outcome);
            emit(events, BatchEvent::ImageFinished(outcome));
        }
    });

    emit(
        events,
        BatchEvent::Finished {
            source: source_folder.to_path_buf(),
            report,
        },
    );
    Ok(report)
}
