//! Value types shared by the imaging operations.
//!
//! ## Types
//!
//! - [`Threshold`]: Intensity cutoff (0–255, default 60) separating border from content.
//! - [`Quality`]: Lossy JPEG encoding quality (1–100, default 95). Clamped on construction.

/// Intensity cutoff for border detection.
///
/// A row or column whose mean intensity is *strictly greater* than the
/// threshold counts as content. A mean exactly equal to it is border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Threshold(pub u8);

impl Threshold {
    pub fn new(value: u8) -> Self {
        Self(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(60)
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}
