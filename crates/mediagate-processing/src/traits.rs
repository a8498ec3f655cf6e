//! Probe traits injected into the validator
//!
//! The validator never inspects pixels or containers itself: it asks a
//! [`DimensionProbe`] for image dimensions and a [`DurationProbe`] for video
//! duration. Production code uses the decoding/ffprobe implementations; tests
//! swap in doubles.

use std::path::{Path, PathBuf};

use crate::upload::UploadedFile;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The caller-owned file disappeared.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The probe ran but the content is not a recognizable media file.
    #[error("Unrecognized media: {0}")]
    Unrecognized(String),

    /// The probing tool itself could not run.
    #[error("Probe tool failed: {0}")]
    Tool(#[source] anyhow::Error),
}

/// Extract width and height from an uploaded image.
pub trait DimensionProbe: Send + Sync {
    fn dimensions(&self, file: &UploadedFile) -> Result<(u32, u32), ProbeError>;
}

/// Extract the duration (seconds) of a video stored on disk.
pub trait DurationProbe: Send + Sync {
    fn duration(&self, path: &Path) -> Result<f64, ProbeError>;
}
