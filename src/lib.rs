//! # autocrop
//!
//! Batch-removes uniform near-black borders from scans and photographs.
//! Point it at folders (or single images) and it writes cropped copies to an
//! output directory.
//!
//! # Pipeline
//!
//! ```text
//! run        inputs      →  one batch per folder / named image, sequentially
//! batch      batch       →  N pool workers, outcomes collected in completion order
//! job        image file  →  decode → detect borders → crop → encode
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Border detection, cropping, and the codec backend seam |
//! | [`job`] | One image: turns every error into a [`job::JobOutcome`] |
//! | [`batch`] | Folder listing, bounded worker pool, per-batch report and events |
//! | [`run`] | Top-level controller across all inputs |
//! | [`config`] | Layered `autocrop.toml` + CLI configuration and validation |
//! | [`output`] | Console formatting of progress events |
//!
//! # Design Decisions
//!
//! ## Failures Are Data
//!
//! A corrupt or unwritable image must not stop a batch of thousands. Jobs
//! never return `Err`: decode, crop, and encode failures (and codec panics)
//! become a `Failure` outcome that is counted and printed. Only problems with
//! the run itself, such as an output folder that cannot be created, abort.
//!
//! ## Integer Means
//!
//! "Row mean above threshold" is evaluated as `row sum > threshold × samples`
//! on `u64` sums. Results are exact, including the boundary where a mean
//! equals the threshold and the row is treated as border.
//!
//! ## Never Crop To Nothing
//!
//! When no row (or column) clears the threshold, that axis keeps its full
//! extent. An all-black frame is written back unchanged instead of vanishing.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod job;
pub mod output;
pub mod run;

#[cfg(test)]
pub(crate) mod test_helpers;
