//! Pure Rust codec backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, TIFF, BMP) | `image::ImageReader` with content sniffing, then `into_rgb8` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the configured [`Quality`] |
//! | Encode → PNG, TIFF, BMP | `image::RgbImage::write_to` |
//!
//! Encoders write through a `BufWriter` that is flushed explicitly, so a
//! failed final write is reported instead of lost on drop.

use super::backend::{BackendError, ImageBackend};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions picked up when listing an input folder.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("tiff", ImageFormat::Tiff),
    ("bmp", ImageFormat::Bmp),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the image file extensions recognised in folder listings.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has a recognised image extension, ignoring case.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Production backend using the `image` crate's decoders and encoders.
pub struct RustBackend {
    jpeg_quality: Quality,
}

impl RustBackend {
    pub fn new() -> Self {
        Self::with_quality(Quality::default())
    }

    pub fn with_quality(jpeg_quality: Quality) -> Self {
        Self { jpeg_quality }
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn output_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Create `path`, run `encode` into a buffered writer, and flush it.
///
/// The file is removed again if encoding or the final flush fails, so a
/// failed write leaves nothing behind.
fn write_encoded(
    path: &Path,
    encode: impl FnOnce(&mut BufWriter<File>) -> Result<(), BackendError>,
) -> Result<(), BackendError> {
    let mut writer = BufWriter::new(File::create(path)?);
    let result = encode(&mut writer).and_then(|()| writer.flush().map_err(BackendError::Io));
    if result.is_err() {
        drop(writer);
        let _ = std::fs::remove_file(path);
    }
    result
}

fn save_jpeg(image: &RgbImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    write_encoded(path, |writer| {
        JpegEncoder::new_with_quality(writer, quality.value() as u8)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| {
                BackendError::Encode(format!("JPEG encode of {} failed: {}", path.display(), e))
            })
    })
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<RgbImage, BackendError> {
        let decoded = ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| {
                BackendError::Decode(format!("Failed to decode {}: {}", path.display(), e))
            })?;
        Ok(decoded.into_rgb8())
    }

    fn encode(&self, image: &RgbImage, path: &Path) -> Result<(), BackendError> {
        let ext = output_extension(path);
        if matches!(ext.as_str(), "jpg" | "jpeg") {
            return save_jpeg(image, path, self.jpeg_quality);
        }

        let format = ImageFormat::from_extension(&ext)
            .filter(|fmt| fmt.writing_enabled())
            .ok_or_else(|| BackendError::Encode(format!("Unsupported output format: {}", ext)))?;
        write_encoded(path, |writer| {
            image.write_to(writer, format).map_err(|e| {
                BackendError::Encode(format!("Failed to write {}: {}", path.display(), e))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_image, solid_image, write_corrupt, write_image};

    #[test]
    fn supported_extensions_match_listing_formats() {
        let exts = super::supported_input_extensions();
        for expected in &["png", "jpg", "jpeg", "tiff", "bmp"] {
            assert!(
                exts.contains(expected),
                "expected {expected} in supported extensions"
            );
        }
        assert!(!exts.contains(&"webp"));
    }

    #[test]
    fn extension_match_ignores_case() {
        assert!(is_supported_image(Path::new("scan.JPG")));
        assert!(is_supported_image(Path::new("dir/scan.Tiff")));
        assert!(is_supported_image(Path::new("scan.bmp")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("scan.tif")));
        assert!(!is_supported_image(Path::new("README")));
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.png");
        let img = gradient_image(23, 17);

        let backend = RustBackend::new();
        backend.encode(&img, &path).unwrap();
        assert_eq!(backend.decode(&path).unwrap(), img);
    }

    #[test]
    fn jpeg_encode_keeps_dimensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.jpg");

        let backend = RustBackend::with_quality(Quality::new(80));
        backend.encode(&solid_image(40, 25, 255), &path).unwrap();
        assert_eq!(backend.decode(&path).unwrap().dimensions(), (40, 25));
    }

    #[test]
    fn uppercase_extension_is_encoded() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("OUT.PNG");

        let backend = RustBackend::new();
        backend.encode(&solid_image(3, 3, 9), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn tiff_and_bmp_decode() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = RustBackend::new();
        for name in ["scan.tiff", "scan.bmp"] {
            let path = tmp.path().join(name);
            write_image(&path, &gradient_image(8, 5));
            assert_eq!(backend.decode(&path).unwrap().dimensions(), (8, 5), "{name}");
        }
    }

    #[test]
    fn decode_corrupt_file_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.jpg");
        write_corrupt(&path);

        let result = RustBackend::new().decode(&path);
        assert!(result.is_err());
    }

    #[test]
    fn decode_nonexistent_file_is_io_error() {
        let result = RustBackend::new().decode(Path::new("/nonexistent/image.jpg"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn encode_unknown_extension_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.xyz");
        let result = RustBackend::new().encode(&solid_image(2, 2, 0), &path);
        assert!(matches!(result, Err(BackendError::Encode(_))));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn write_to_full_device_errors_and_leaves_nothing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = RustBackend::new();
        for name in ["full.jpg", "full.png", "full.bmp"] {
            let path = tmp.path().join(name);
            std::os::unix::fs::symlink("/dev/full", &path).unwrap();

            let result = backend.encode(&gradient_image(20, 20), &path);

            assert!(result.is_err(), "{name} reported a successful write");
            assert!(path.symlink_metadata().is_err(), "{name} left a file behind");
        }
    }

    #[test]
    fn encode_into_missing_directory_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("missing/out.jpg");
        let result = RustBackend::new().encode(&solid_image(2, 2, 0), &path);
        assert!(matches!(result, Err(BackendError::Io(_))));
    }
}
