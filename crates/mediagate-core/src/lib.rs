//! Mediagate Core Library
//!
//! This crate provides the domain types, error taxonomy, and configuration
//! shared by the upload validation components.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{QualityPreset, ValidationConstraints, ValidationLimits};
pub use error::{LogLevel, RatioParseError, ValidationError, ValidationErrorKind};
pub use models::{AspectRatio, MediaType, Resolution};
