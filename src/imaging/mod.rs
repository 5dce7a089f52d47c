//! Image operations in pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image` crate via [`RustBackend`] |
//! | **Border detection** | row/column intensity sums ([`detect_borders`]) |
//! | **Crop** | `image::imageops::crop_imm` behind a bounds check ([`crop_to_box`]) |
//!
//! The module is split into:
//! - **Parameters**: [`Threshold`] and [`Quality`] value types
//! - **Borders**: pure detection over an in-memory buffer (unit testable)
//! - **Crop**: pure sub-image extraction
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
pub mod borders;
pub mod crop;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use borders::{BoundingBox, detect_borders};
pub use crop::{CropError, crop_to_box};
pub use params::{Quality, Threshold};
pub use rust_backend::{RustBackend, is_supported_image, supported_input_extensions};
