//! Image codec backend trait and shared error type.
//!
//! The [`ImageBackend`] trait is the seam between the cropping pipeline and
//! the codecs: decode a file into an 8-bit RGB buffer, encode a buffer back
//! to a file. Border detection and cropping never see a path.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the in-memory `MockBackend` below.

use image::RgbImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Decode(String),
    #[error("{0}")]
    Encode(String),
}

/// Trait for image codec backends.
///
/// Backends are shared by every worker of a batch, hence `Sync`.
pub trait ImageBackend: Sync {
    /// Decode the image at `path` into three-channel 8-bit pixels.
    fn decode(&self, path: &Path) -> Result<RgbImage, BackendError>;

    /// Encode `image` to `path`, choosing the container from the extension.
    fn encode(&self, image: &RgbImage, path: &Path) -> Result<(), BackendError>;
}
