//! Mediagate Upload Processing Library
//!
//! This crate validates a single uploaded image or video against size, type,
//! aspect-ratio, resolution, and duration constraints, and optionally
//! re-encodes accepted images to WebP.

pub mod compression;
pub mod image;
pub mod metadata;
pub mod traits;
pub mod upload;
pub mod validator;
pub mod video;

// Re-export commonly used types
pub use compression::ImageCompressor;
pub use self::image::{DecodedDimensions, ImageInspector};
pub use metadata::{ImageMetadata, VideoMetadata};
pub use traits::{DimensionProbe, DurationProbe, ProbeError};
pub use upload::{UploadedFile, ValidatedUpload};
pub use validator::UploadValidator;
pub use video::FfprobeProbe;

pub use mediagate_core::{
    AspectRatio, MediaType, QualityPreset, Resolution, ValidationConstraints, ValidationError,
    ValidationErrorKind, ValidationLimits,
};
