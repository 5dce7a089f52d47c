//! Shared test utilities for the autocrop test suite.
//!
//! Provides synthetic image builders with known border layouts and small
//! filesystem helpers for writing real and corrupt image files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let img = bordered_image(40, 30, 5, 200);
//! write_image(&tmp.path().join("scan.png"), &img);
//! write_corrupt(&tmp.path().join("broken.jpg"));
//! ```

use image::{Rgb, RgbImage};
use std::ops::RangeInclusive;
use std::path::Path;

// =========================================================================
// Synthetic images
// =========================================================================

/// Uniform grey image with every channel set to `value`.
pub fn solid_image(width: u32, height: u32, value: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([value, value, value]))
}

/// Black image with a white block where `rows` and `cols` intersect.
pub fn block_image(
    width: u32,
    height: u32,
    rows: RangeInclusive<u32>,
    cols: RangeInclusive<u32>,
) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if rows.contains(&y) && cols.contains(&x) {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    })
}

/// Uniform `value` content surrounded by a black border `border` pixels wide.
pub fn bordered_image(width: u32, height: u32, border: u32, value: u8) -> RgbImage {
    let rows = border..=height - border - 1;
    let cols = border..=width - border - 1;
    RgbImage::from_fn(width, height, |x, y| {
        if rows.contains(&y) && cols.contains(&x) {
            Rgb([value, value, value])
        } else {
            Rgb([0, 0, 0])
        }
    })
}

/// Image where every pixel is distinguishable from its neighbours.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

// =========================================================================
// Files
// =========================================================================

/// Encode `image` to `path`, format chosen by extension.
pub fn write_image(path: &Path, image: &RgbImage) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    image.save(path).unwrap();
}

/// Write bytes that no decoder accepts, under an image-looking name.
pub fn write_corrupt(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"definitely not an image").unwrap();
}
