//! Cropping a single image file.
//!
//! A job runs decode → detect → crop → encode for one input and reports the
//! result as a [`JobOutcome`]. Nothing a job does can fail the caller: every
//! error, and any panic raised by a codec, is turned into
//! [`JobOutcome::Failure`], so one corrupt file never takes down a batch.

use crate::imaging::{
    BackendError, CropError, ImageBackend, Threshold, crop_to_box, detect_borders,
};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum JobError {
    #[error("could not read image ({0})")]
    Decode(#[source] BackendError),
    #[error("could not read image (no pixels)")]
    Empty,
    #[error(transparent)]
    InvalidBox(#[from] CropError),
    #[error("could not write image ({0})")]
    Encode(#[source] BackendError),
}

/// One unit of work: crop `source` into `destination`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageJob {
    /// File name used in progress output.
    pub identifier: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl ImageJob {
    /// Job for `identifier` read from `source_folder` and written under the
    /// same name into `destination_folder`.
    pub fn new(identifier: &str, source_folder: &Path, destination_folder: &Path) -> Self {
        Self {
            identifier: identifier.to_string(),
            source: source_folder.join(identifier),
            destination: destination_folder.join(identifier),
        }
    }
}

/// Result of one job. Produced exactly once per input image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success {
        identifier: String,
        output_path: PathBuf,
        width: u32,
        height: u32,
    },
    Failure {
        identifier: String,
        message: String,
    },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success { .. })
    }

    pub fn identifier(&self) -> &str {
        match self {
            JobOutcome::Success { identifier, .. } | JobOutcome::Failure { identifier, .. } => {
                identifier
            }
        }
    }
}

/// Run one job to completion and report what happened.
pub fn run_job(backend: &impl ImageBackend, job: &ImageJob, threshold: Threshold) -> JobOutcome {
    let result = panic::catch_unwind(AssertUnwindSafe(|| crop_file(backend, job, threshold)));

    match result {
        Ok(Ok((width, height))) => JobOutcome::Success {
            identifier: job.identifier.clone(),
            output_path: job.destination.clone(),
            width,
            height,
        },
        Ok(Err(err)) => {
            if matches!(err, JobError::InvalidBox(_)) {
                warn!(image = %job.source.display(), "detector produced an out-of-range box: {err}");
            }
            JobOutcome::Failure {
                identifier: job.identifier.clone(),
                message: err.to_string(),
            }
        }
        Err(payload) => JobOutcome::Failure {
            identifier: job.identifier.clone(),
            message: format!("worker panicked: {}", panic_message(payload.as_ref())),
        },
    }
}

fn crop_file(
    backend: &impl ImageBackend,
    job: &ImageJob,
    threshold: Threshold,
) -> Result<(u32, u32), JobError> {
    let image = backend.decode(&job.source).map_err(JobError::Decode)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(JobError::Empty);
    }

    let bounds = detect_borders(&image, threshold);
    debug!(
        image = %job.source.display(),
        width = image.width(),
        height = image.height(),
        "content {bounds}"
    );

    let cropped = crop_to_box(&image, &bounds)?;
    backend
        .encode(&cropped, &job.destination)
        .map_err(JobError::Encode)?;
    Ok(cropped.dimensions())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
