//! Top-level controller: one batch per input, run one after another.
//!
//! Folders are processed first, then individually named images, each in the
//! order given. Every folder becomes a batch written to
//! `<output>/<folder name>`; every named image becomes a single-image batch
//! written straight into `<output>`.
//!
//! ```text
//! -f scans/2019 -f scans/2020 -i loose/cover.jpg -o out
//!
//! out/
//! ├── 2019/        ← batch 1
//! ├── 2020/        ← batch 2
//! └── cover.jpg    ← batch 3
//! ```
//!
//! Missing inputs are reported and skipped. Failing to create an output
//! folder, list an input folder (including a `-f` path that is a file), or
//! start a worker pool aborts the run.

use crate::batch::{
    BatchError, BatchEvent, BatchReport, BatchSettings, InputKind, emit, list_images, run_batch,
};
use crate::imaging::ImageBackend;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Could not create output directory {path}: {source}")]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Batch(#[from] BatchError),
}

/// Everything a run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub folders: Vec<PathBuf>,
    pub images: Vec<PathBuf>,
    pub output: PathBuf,
    pub settings: BatchSettings,
}

/// Reports of every batch that ran, plus the inputs that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: Vec<(PathBuf, BatchReport)>,
    pub missing: Vec<PathBuf>,
}

impl RunSummary {
    /// Counts summed over all batches.
    pub fn totals(&self) -> BatchReport {
        self.batches
            .iter()
            .fold(BatchReport::default(), |acc, (_, report)| BatchReport {
                success_count: acc.success_count + report.success_count,
                failure_count: acc.failure_count + report.failure_count,
            })
    }
}

/// Output folder for a folder batch: `<output>/<base name of folder>`.
///
/// Paths without a base name (such as `/`) write into `output` itself.
pub fn folder_destination(output: &Path, folder: &Path) -> PathBuf {
    match folder.file_name() {
        Some(name) => output.join(name),
        None => output.to_path_buf(),
    }
}

/// Process every input in `request`, blocking until all batches are done.
pub fn run<B: ImageBackend>(
    backend: &B,
    request: &RunRequest,
    events: Option<&Sender<BatchEvent>>,
) -> Result<RunSummary, RunError> {
    std::fs::create_dir_all(&request.output).map_err(|source| RunError::CreateOutput {
        path: request.output.clone(),
        source,
    })?;

    let mut summary = RunSummary::default();

    for folder in &request.folders {
        if !folder.exists() {
            report_missing(&mut summary, events, folder, InputKind::Folder);
            continue;
        }
        let names = list_images(folder)?;
        let destination = folder_destination(&request.output, folder);
        debug!(
            folder = %folder.display(),
            destination = %destination.display(),
            "folder batch"
        );
        let report = run_batch(
            backend,
            &names,
            folder,
            &destination,
            &request.settings,
            events,
        )?;
        summary.batches.push((folder.clone(), report));
    }

    // A single image never needs more than one worker.
    let single = BatchSettings {
        workers: 1,
        ..request.settings
    };
    for image in &request.images {
        let name = image.file_name().and_then(|n| n.to_str());
        let Some(name) = name.filter(|_| image.exists()) else {
            report_missing(&mut summary, events, image, InputKind::Image);
            continue;
        };
        let parent = image
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let report = run_batch(
            backend,
            &[name.to_string()],
            parent,
            &request.output,
            &single,
            events,
        )?;
        summary.batches.push((image.clone(), report));
    }

    Ok(summary)
}

fn report_missing(
    summary: &mut RunSummary,
    events: Option<&Sender<BatchEvent>>,
    path: &Path,
    kind: InputKind,
) {
    summary.missing.push(path.to_path_buf());
    emit(
        events,
        BatchEvent::InputMissing {
            path: path.to_path_buf(),
            kind,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Threshold;
    use crate::imaging::backend::tests::MockBackend;
    use crate::test_helpers::bordered_image;
    use std::fs;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn request(output: &Path) -> RunRequest {
        RunRequest {
            folders: Vec::new(),
            images: Vec::new(),
            output: output.to_path_buf(),
            settings: BatchSettings {
                threshold: Threshold::new(60),
                workers: 2,
            },
        }
    }

    /// Create empty placeholder files so listing and existence checks pass;
    /// pixels come from the mock backend.
    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn folder_destination_uses_base_name() {
        assert_eq!(
            folder_destination(Path::new("out"), Path::new("scans/2019")),
            PathBuf::from("out/2019")
        );
        assert_eq!(
            folder_destination(Path::new("out"), Path::new("scans/2019/")),
            PathBuf::from("out/2019")
        );
        assert_eq!(
            folder_destination(Path::new("out"), Path::new("/")),
            PathBuf::from("out")
        );
    }

    #[test]
    fn totals_sum_batches() {
        let summary = RunSummary {
            batches: vec![
                (
                    PathBuf::from("a"),
                    BatchReport {
                        success_count: 2,
                        failure_count: 1,
                    },
                ),
                (
                    PathBuf::from("b"),
                    BatchReport {
                        success_count: 3,
                        failure_count: 0,
                    },
                ),
            ],
            missing: Vec::new(),
        };
        assert_eq!(
            summary.totals(),
            BatchReport {
                success_count: 5,
                failure_count: 1
            }
        );
    }

    #[test]
    fn each_folder_is_its_own_batch() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("in/first");
        let second = tmp.path().join("in/second");
        touch(&first.join("a.png"));
        touch(&first.join("b.png"));
        touch(&first.join("skip.txt"));
        touch(&second.join("c.png"));

        let backend = MockBackend::new()
            .with_source(first.join("a.png"), bordered_image(10, 10, 2, 255))
            .with_source(second.join("c.png"), bordered_image(10, 10, 2, 255));

        let out = tmp.path().join("out");
        let mut req = request(&out);
        req.folders = vec![first.clone(), second.clone()];

        let summary = run(&backend, &req, None).unwrap();

        assert_eq!(
            summary.batches,
            vec![
                (
                    first,
                    BatchReport {
                        success_count: 1,
                        failure_count: 1
                    }
                ),
                (
                    second,
                    BatchReport {
                        success_count: 1,
                        failure_count: 0
                    }
                ),
            ]
        );
        assert!(backend.written_image(&out.join("first/a.png")).is_some());
        assert!(backend.written_image(&out.join("second/c.png")).is_some());
        assert!(out.join("first").is_dir());
    }

    #[test]
    fn named_image_writes_into_output_root_without_filtering() {
        let tmp = TempDir::new().unwrap();
        let image = tmp.path().join("loose/cover.webp");
        touch(&image);
        let backend = MockBackend::new().with_source(&image, bordered_image(12, 8, 1, 200));

        let out = tmp.path().join("out");
        let mut req = request(&out);
        req.images = vec![image.clone()];

        let summary = run(&backend, &req, None).unwrap();

        assert_eq!(
            summary.batches,
            vec![(
                image,
                BatchReport {
                    success_count: 1,
                    failure_count: 0
                }
            )]
        );
        let written = backend.written_image(&out.join("cover.webp")).unwrap();
        assert_eq!(written.dimensions(), (10, 6));
    }

    #[test]
    fn missing_inputs_are_skipped_and_reported() {
        let tmp = TempDir::new().unwrap();
        let present = tmp.path().join("in/present");
        touch(&present.join("a.png"));
        let backend =
            MockBackend::new().with_source(present.join("a.png"), bordered_image(6, 6, 1, 255));

        let out = tmp.path().join("out");
        let mut req = request(&out);
        req.folders = vec![tmp.path().join("in/absent"), present.clone()];
        req.images = vec![tmp.path().join("ghost.jpg")];

        let (tx, rx) = mpsc::channel();
        let summary = run(&backend, &req, Some(&tx)).unwrap();
        drop(tx);

        assert_eq!(
            summary.missing,
            vec![tmp.path().join("in/absent"), tmp.path().join("ghost.jpg")]
        );
        assert_eq!(summary.batches.len(), 1);
        assert_eq!(summary.totals().success_count, 1);

        let events: Vec<BatchEvent> = rx.into_iter().collect();
        assert_eq!(
            events.first(),
            Some(&BatchEvent::InputMissing {
                path: tmp.path().join("in/absent"),
                kind: InputKind::Folder,
            })
        );
        assert_eq!(
            events.last(),
            Some(&BatchEvent::InputMissing {
                path: tmp.path().join("ghost.jpg"),
                kind: InputKind::Image,
            })
        );
    }

    #[test]
    fn file_given_as_folder_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("scan.jpg");
        touch(&file);

        let mut req = request(&tmp.path().join("out"));
        req.folders = vec![file.clone()];
        let (tx, rx) = mpsc::channel();
        let result = run(&MockBackend::new(), &req, Some(&tx));
        drop(tx);

        assert!(matches!(
            result,
            Err(RunError::Batch(BatchError::NotAFolder(p))) if p == file
        ));
        assert!(
            rx.into_iter()
                .all(|e| !matches!(e, BatchEvent::InputMissing { .. }))
        );
    }

    #[test]
    fn uncreatable_output_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "").unwrap();

        let req = request(&blocker.join("out"));
        let result = run(&MockBackend::new(), &req, None);

        assert!(matches!(result, Err(RunError::CreateOutput { .. })));
    }

    #[test]
    fn folders_run_before_images() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("in/batch");
        let image = tmp.path().join("single.png");
        touch(&folder.join("a.png"));
        touch(&image);
        let backend = MockBackend::new();

        let mut req = request(&tmp.path().join("out"));
        req.images = vec![image.clone()];
        req.folders = vec![folder.clone()];

        let summary = run(&backend, &req, None).unwrap();
        let order: Vec<&PathBuf> = summary.batches.iter().map(|(p, _)| p).collect();
        assert_eq!(order, vec![&folder, &image]);
    }
}
