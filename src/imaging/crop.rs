//! Cropping an image to a detected [`BoundingBox`].
//!
//! The cropper checks the box against the source itself instead of trusting
//! the detector, so a bad box surfaces as [`CropError::InvalidBox`] rather
//! than a panic or a silently clamped result.

use super::borders::BoundingBox;
use image::RgbImage;
use image::imageops;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CropError {
    #[error("crop box ({bounds}) is outside the {width}x{height} image")]
    InvalidBox {
        bounds: BoundingBox,
        width: u32,
        height: u32,
    },
}

/// Copy the region delimited by `bounds` into a new image.
///
/// The result is `bounds.width() x bounds.height()`, and pixel `(x, y)` of the
/// result equals pixel `(bounds.left + x, bounds.top + y)` of the source.
pub fn crop_to_box(image: &RgbImage, bounds: &BoundingBox) -> Result<RgbImage, CropError> {
    let (width, height) = image.dimensions();
    if !bounds.fits_within(width, height) {
        return Err(CropError::InvalidBox {
            bounds: *bounds,
            width,
            height,
        });
    }

    Ok(imageops::crop_imm(
        image,
        bounds.left,
        bounds.top,
        bounds.width(),
        bounds.height(),
    )
    .to_image())
}
