//! Error types module
//!
//! Upload validation failures are unified under [`ValidationError`]. Every
//! variant except [`ValidationError::ProbeFailed`] is a local, deterministic
//! rejection of the input: retrying with the same file and constraints always
//! yields the same error. Each error can describe itself for a user-facing
//! form (field tag, machine-readable code, client message) and tells the
//! caller at which level to log it.

use std::path::PathBuf;

use crate::models::{AspectRatio, MediaType, Resolution};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for caller-side mistakes like a removed temp file
    Warn,
    /// Error level - for unexpected failures like a missing probe binary
    Error,
}

/// Discriminant of a [`ValidationError`], suitable for matching in tests and
/// for mapping onto form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    InvalidType,
    SizeExceeded,
    InvalidRatio,
    InvalidResolution,
    DurationExceeded,
    FileUnavailable,
    ProbeFailed,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid file type: expected {expected}, got {actual}")]
    InvalidType { expected: MediaType, actual: String },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    SizeExceeded { size: u64, max: u64 },

    #[error("Invalid aspect ratio: expected {expected}, got {actual}")]
    InvalidRatio {
        expected: AspectRatio,
        actual: Resolution,
    },

    #[error("Resolution too low: {actual} (min: {min})")]
    InvalidResolution { actual: Resolution, min: Resolution },

    #[error("Video too long: {duration:.2}s (max: {max}s)")]
    DurationExceeded { duration: f64, max: u64 },

    #[error("Uploaded file is no longer available: {}", path.display())]
    FileUnavailable { path: PathBuf },

    #[error("Media probe failed: {0}")]
    ProbeFailed(String),
}

impl ValidationError {
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            ValidationError::InvalidType { .. } => ValidationErrorKind::InvalidType,
            ValidationError::SizeExceeded { .. } => ValidationErrorKind::SizeExceeded,
            ValidationError::InvalidRatio { .. } => ValidationErrorKind::InvalidRatio,
            ValidationError::InvalidResolution { .. } => ValidationErrorKind::InvalidResolution,
            ValidationError::DurationExceeded { .. } => ValidationErrorKind::DurationExceeded,
            ValidationError::FileUnavailable { .. } => ValidationErrorKind::FileUnavailable,
            ValidationError::ProbeFailed(_) => ValidationErrorKind::ProbeFailed,
        }
    }

    /// Category tag used to attach the error to a form input.
    pub fn field(&self) -> &'static str {
        match self.kind() {
            ValidationErrorKind::InvalidType => "type",
            ValidationErrorKind::SizeExceeded => "size",
            ValidationErrorKind::InvalidRatio => "ratio",
            ValidationErrorKind::InvalidResolution => "resolution",
            ValidationErrorKind::DurationExceeded => "duration",
            ValidationErrorKind::FileUnavailable | ValidationErrorKind::ProbeFailed => "file",
        }
    }

    /// Machine-readable error code (e.g., "SIZE_EXCEEDED")
    pub fn error_code(&self) -> &'static str {
        match self.kind() {
            ValidationErrorKind::InvalidType => "INVALID_TYPE",
            ValidationErrorKind::SizeExceeded => "SIZE_EXCEEDED",
            ValidationErrorKind::InvalidRatio => "INVALID_RATIO",
            ValidationErrorKind::InvalidResolution => "INVALID_RESOLUTION",
            ValidationErrorKind::DurationExceeded => "DURATION_EXCEEDED",
            ValidationErrorKind::FileUnavailable => "FILE_UNAVAILABLE",
            ValidationErrorKind::ProbeFailed => "PROBE_FAILED",
        }
    }

    /// Client-facing message. Never includes server-side paths.
    pub fn client_message(&self) -> String {
        match self {
            ValidationError::InvalidType { expected, .. } => {
                format!("Please upload a valid {expected} file.")
            }
            ValidationError::SizeExceeded { max, .. } => {
                format!("File is too large. Maximum size is {}.", human_size(*max))
            }
            ValidationError::InvalidRatio { expected, .. } => {
                format!("Image must have a {expected} aspect ratio.")
            }
            ValidationError::InvalidResolution { min, .. } => {
                format!("Image resolution must be at least {min}.")
            }
            ValidationError::DurationExceeded { max, .. } => {
                format!("Video must be at most {max} seconds long.")
            }
            ValidationError::FileUnavailable { .. } => {
                "The uploaded file could not be read. Please upload it again.".to_string()
            }
            ValidationError::ProbeFailed(_) => {
                "The uploaded file could not be processed. Please try again later.".to_string()
            }
        }
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            ValidationError::FileUnavailable { .. } => LogLevel::Warn,
            ValidationError::ProbeFailed(_) => LogLevel::Error,
            _ => LogLevel::Debug,
        }
    }
}

/// Malformed `"W:H"` aspect ratio string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatioParseError {
    #[error("Invalid aspect ratio {0:?}: expected \"W:H\" with positive integers")]
    Format(String),

    #[error("Invalid aspect ratio {0:?}: width and height must be non-zero")]
    ZeroComponent(String),
}

fn human_size(bytes: u64) -> String {
    const MB: u64 = 1024 * 1024;
    const KB: u64 = 1024;
    if bytes >= MB && bytes % MB == 0 {
        format!("{} MB", bytes / MB)
    } else if bytes >= KB && bytes % KB == 0 {
        format!("{} KB", bytes / KB)
    } else {
        format!("{bytes} bytes")
    }
}
