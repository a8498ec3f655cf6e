use std::path::Path;
use std::time::Instant;

use bytes::Bytes;
use image::{DynamicImage, GenericImageView};
use mediagate_core::QualityPreset;

use crate::traits::ProbeError;
use crate::upload::UploadedFile;

const WEBP_CONTENT_TYPE: &str = "image/webp";
/// Largest width or height libwebp can encode.
const WEBP_MAX_DIMENSION: u32 = 16383;

/// Re-encodes images to WebP
pub struct ImageCompressor;

impl ImageCompressor {
    /// Decode an uploaded image and return a new WebP file.
    ///
    /// The source handle is left untouched. The new file keeps the original
    /// stem (`photo.jpg` becomes `photo.webp`).
    pub fn convert_to_webp(
        file: &UploadedFile,
        quality: QualityPreset,
    ) -> Result<UploadedFile, ProbeError> {
        let start = Instant::now();

        let data = file.read_bytes().map_err(|e| ProbeError::Tool(e.into()))?;
        let img =
            image::load_from_memory(&data).map_err(|e| ProbeError::Unrecognized(e.to_string()))?;

        let webp_data = Self::compress_webp(&img, quality)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            original_size = data.len(),
            compressed_size = webp_data.len(),
            quality = quality.webp_quality(),
            "Image converted to WebP"
        );

        Ok(UploadedFile::from_bytes(
            webp_filename(file.filename()),
            WEBP_CONTENT_TYPE,
            webp_data,
        ))
    }

    /// Compress to lossy WebP.
    ///
    /// Images with a side above 16383 px cannot be represented in WebP and
    /// are reported as [`ProbeError::Unrecognized`].
    pub fn compress_webp(
        img: &DynamicImage,
        quality: QualityPreset,
    ) -> Result<Bytes, ProbeError> {
        let (width, height) = img.dimensions();
        if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
            return Err(ProbeError::Unrecognized(format!(
                "{width}x{height} exceeds the WebP limit of {WEBP_MAX_DIMENSION}px per side"
            )));
        }

        // Convert to RGBA for WebP encoding
        let rgba_img = img.to_rgba8();

        let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
        let webp_data = encoder
            .encode_simple(false, quality.webp_quality())
            .map_err(|e| ProbeError::Unrecognized(format!("WebP encoding failed: {e:?}")))?;

        Ok(Bytes::copy_from_slice(&webp_data))
    }
}

fn webp_filename(original: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    format!("{stem}.webp")
}
