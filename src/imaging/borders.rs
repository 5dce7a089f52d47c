//! Border detection.
//!
//! A border is a run of rows (or columns) at the image edge whose mean
//! intensity does not exceed the threshold. Detection reduces the image to
//! two intensity profiles, one per row and one per column, and keeps the
//! span between the first and last entry that is strictly above the
//! threshold:
//!
//! ```text
//! row means:  0  0  0  92 180 77  0  0     threshold 60
//!                      ^        ^
//!                     top     bottom
//! ```
//!
//! Means are compared as integer sums (`sum > threshold * samples`), which
//! is exact and avoids any float rounding at the boundary.
//!
//! All functions here are pure; nothing touches the filesystem.

use super::params::Threshold;
use image::RgbImage;
use std::fmt;

/// Intensity samples contributed by one pixel.
const CHANNELS: u64 = 3;

/// Inclusive pixel-index rectangle delimiting detected content.
///
/// Holds `top <= bottom < height` and `left <= right < width` for the image
/// it was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl BoundingBox {
    /// The box covering a whole `width x height` image.
    ///
    /// Zero-sized dimensions collapse to index 0 rather than underflowing.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            top: 0,
            bottom: height.saturating_sub(1),
            left: 0,
            right: width.saturating_sub(1),
        }
    }

    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    /// Whether the box is well-formed and lies inside a `width x height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.top <= self.bottom
            && self.left <= self.right
            && self.bottom < height
            && self.right < width
    }

    /// Whether the box covers the whole image, i.e. cropping would be a no-op.
    pub fn is_full(&self, width: u32, height: u32) -> bool {
        *self == Self::full(width, height)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows {}..={}, cols {}..={}",
            self.top, self.bottom, self.left, self.right
        )
    }
}

/// Compute the bounding box of non-border content.
///
/// Rows and columns whose mean intensity over all channels is strictly above
/// `threshold` are content. When no row qualifies, the vertical extent is the
/// full height; columns are handled the same way. An all-dark image therefore
/// yields the full-extent box and is never cropped to nothing.
///
/// The image must have at least one pixel for the box invariants to hold.
pub fn detect_borders(image: &RgbImage, threshold: Threshold) -> BoundingBox {
    let (width, height) = image.dimensions();
    let (row_sums, col_sums) = intensity_sums(image);

    let cutoff = u64::from(threshold.value());
    let row_cutoff = cutoff * u64::from(width) * CHANNELS;
    let col_cutoff = cutoff * u64::from(height) * CHANNELS;

    let full = BoundingBox::full(width, height);
    let (top, bottom) = content_span(&row_sums, row_cutoff).unwrap_or((full.top, full.bottom));
    let (left, right) = content_span(&col_sums, col_cutoff).unwrap_or((full.left, full.right));

    BoundingBox {
        top,
        bottom,
        left,
        right,
    }
}

/// Per-row and per-column sums of every channel sample, in one pass.
fn intensity_sums(image: &RgbImage) -> (Vec<u64>, Vec<u64>) {
    let (width, height) = image.dimensions();
    let mut row_sums = vec![0u64; height as usize];
    let mut col_sums = vec![0u64; width as usize];

    for (x, y, pixel) in image.enumerate_pixels() {
        let sum: u64 = pixel.0.iter().map(|&c| u64::from(c)).sum();
        row_sums[y as usize] += sum;
        col_sums[x as usize] += sum;
    }

    (row_sums, col_sums)
}

/// First and last index whose sum is strictly above `cutoff`.
fn content_span(sums: &[u64], cutoff: u64) -> Option<(u32, u32)> {
    let first = sums.iter().position(|&s| s > cutoff)?;
    let last = sums.iter().rposition(|&s| s > cutoff)?;
    Some((first as u32, last as u32))
}
