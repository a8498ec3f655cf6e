//! Test helpers: upload fixtures and probe doubles for integration tests.
//!
//! Run from workspace root: `cargo test -p mediagate-processing`.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};
use mediagate_processing::{DimensionProbe, DurationProbe, ProbeError, UploadedFile};
use tempfile::TempDir;

/// Route validator logs to the test output. Set `RUST_LOG=debug` to see rejections.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 64])
    });
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format)
        .expect("Failed to encode test image");
    buffer
}

/// 100x200 JPEG, in memory.
pub fn image_file() -> UploadedFile {
    init_tracing();
    UploadedFile::from_bytes(
        "test_image.jpg",
        "image/jpeg",
        encode(100, 200, ImageFormat::Jpeg),
    )
}

pub fn jpeg_file(width: u32, height: u32) -> UploadedFile {
    init_tracing();
    UploadedFile::from_bytes(
        "test_image.jpg",
        "image/jpeg",
        encode(width, height, ImageFormat::Jpeg),
    )
}

pub fn png_file(width: u32, height: u32) -> UploadedFile {
    init_tracing();
    UploadedFile::from_bytes(
        "test_image.png",
        "image/png",
        encode(width, height, ImageFormat::Png),
    )
}

/// Video upload spooled to a temporary file the test owns.
///
/// The content is filler: duration comes from an injected probe.
pub fn video_file() -> (TempDir, UploadedFile) {
    init_tracing();
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("dummy_video.mp4");
    std::fs::write(&path, vec![0u8; 4096]).expect("Failed to write dummy video");

    let file = UploadedFile::from_temporary_path("dummy_video.mp4", "video/mp4", &path)
        .expect("Failed to wrap dummy video");
    (temp_dir, file)
}

pub struct FixedDimensions(pub u32, pub u32);

impl DimensionProbe for FixedDimensions {
    fn dimensions(&self, _file: &UploadedFile) -> Result<(u32, u32), ProbeError> {
        Ok((self.0, self.1))
    }
}

pub struct FixedDuration(pub f64);

impl DurationProbe for FixedDuration {
    fn duration(&self, path: &Path) -> Result<f64, ProbeError> {
        if !path.is_file() {
            return Err(ProbeError::NotFound(path.to_path_buf()));
        }
        Ok(self.0)
    }
}

pub struct UnrecognizedVideo;

impl DurationProbe for UnrecognizedVideo {
    fn duration(&self, _path: &Path) -> Result<f64, ProbeError> {
        Err(ProbeError::Unrecognized("No video stream found".to_string()))
    }
}
