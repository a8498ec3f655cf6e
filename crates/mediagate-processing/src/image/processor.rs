//! Image inspector - format sniffing and full decoding

use std::io::Cursor;

use image::{GenericImageView, ImageReader};

use crate::metadata::ImageMetadata;
use crate::traits::{DimensionProbe, ProbeError};
use crate::upload::UploadedFile;

pub struct ImageInspector;

impl ImageInspector {
    /// Open `data` as an image and decode it completely.
    ///
    /// The format is sniffed from the content, not taken from the declared
    /// content type. Anything the `image` crate cannot identify, or whose pixel
    /// data is corrupt or truncated, is reported as [`ProbeError::Unrecognized`].
    pub fn inspect(data: &[u8]) -> Result<ImageMetadata, ProbeError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ProbeError::Unrecognized(e.to_string()))?;

        let format = reader
            .format()
            .ok_or_else(|| ProbeError::Unrecognized("unknown image format".to_string()))?;

        let (width, height) = reader
            .decode()
            .map_err(|e| ProbeError::Unrecognized(e.to_string()))?
            .dimensions();

        Ok(ImageMetadata {
            width,
            height,
            format: format!("{:?}", format),
            size_bytes: Some(data.len() as u64),
        })
    }
}

/// Default [`DimensionProbe`]: decodes the image and reports its dimensions.
pub struct DecodedDimensions;

impl DimensionProbe for DecodedDimensions {
    fn dimensions(&self, file: &UploadedFile) -> Result<(u32, u32), ProbeError> {
        let data = file.read_bytes().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ProbeError::NotFound(
                file.temporary_file_path()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_default(),
            ),
            _ => ProbeError::Tool(e.into()),
        })?;
        let metadata = ImageInspector::inspect(&data)?;
        Ok((metadata.width, metadata.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 10, 10]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .unwrap();
        buffer
    }

    #[test]
    fn test_inspect_jpeg() {
        let data = create_test_jpeg(100, 200);
        let metadata = ImageInspector::inspect(&data).unwrap();

        assert_eq!(metadata.width, 100);
        assert_eq!(metadata.height, 200);
        assert_eq!(metadata.format, "Jpeg");
        assert_eq!(metadata.size_bytes, Some(data.len() as u64));
    }

    #[test]
    fn test_inspect_invalid_image() {
        let result = ImageInspector::inspect(b"not an image");
        assert!(matches!(result, Err(ProbeError::Unrecognized(_))));
    }

    #[test]
    fn test_inspect_truncated_header() {
        let data = create_test_jpeg(100, 200);
        let result = ImageInspector::inspect(&data[..4]);
        assert!(result.is_err());
    }

    #[test]
    fn test_inspect_truncated_body() {
        let img = RgbImage::from_fn(400, 400, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 7]));
        let mut data = Vec::new();
        img.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .unwrap();

        // IHDR survives, so the header alone still reads as 400x400
        let truncated = &data[..data.len() / 3];
        let header = ImageReader::new(Cursor::new(truncated))
            .with_guessed_format()
            .unwrap()
            .into_dimensions()
            .unwrap();
        assert_eq!(header, (400, 400));

        let result = ImageInspector::inspect(truncated);
        assert!(matches!(result, Err(ProbeError::Unrecognized(_))));
    }

    #[test]
    fn test_decoded_dimensions() {
        let file = UploadedFile::from_bytes("a.jpg", "image/jpeg", create_test_jpeg(64, 32));
        assert_eq!(DecodedDimensions.dimensions(&file).unwrap(), (64, 32));
    }

    #[test]
    fn test_decoded_dimensions_missing_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), create_test_jpeg(8, 8)).unwrap();
        let file = UploadedFile::from_temporary_path("a.jpg", "image/jpeg", temp.path()).unwrap();
        temp.close().unwrap();

        let result = DecodedDimensions.dimensions(&file);
        assert!(matches!(result, Err(ProbeError::NotFound(_))));
    }
}
