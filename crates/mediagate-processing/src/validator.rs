//! Upload validator
//!
//! Checks run in a fixed order and stop at the first failure:
//! availability → type → size → ratio → resolution → duration.
//!
//! The validator only reads the upload. Image conversion produces a new file;
//! temporary files handed in by the caller are never deleted here, the caller
//! removes them (see [`UploadValidator::file_path`]).

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use mediagate_core::{LogLevel, MediaType, Resolution, ValidationConstraints, ValidationError};

use crate::compression::ImageCompressor;
use crate::image::{DecodedDimensions, ImageInspector};
use crate::traits::{DimensionProbe, DurationProbe, ProbeError};
use crate::upload::{UploadedFile, ValidatedUpload};
use crate::video::FfprobeProbe;

pub struct UploadValidator<'a> {
    file: &'a UploadedFile,
    constraints: ValidationConstraints,
    dimension_probe: Arc<dyn DimensionProbe>,
    duration_probe: Option<Arc<dyn DurationProbe>>,
}

impl<'a> UploadValidator<'a> {
    pub fn new(file: &'a UploadedFile, constraints: ValidationConstraints) -> Self {
        Self {
            file,
            constraints,
            dimension_probe: Arc::new(DecodedDimensions),
            duration_probe: None,
        }
    }

    /// Replace the default header-decoding dimension probe.
    pub fn with_dimension_probe(mut self, probe: Arc<dyn DimensionProbe>) -> Self {
        self.dimension_probe = probe;
        self
    }

    /// Replace the default ffprobe duration probe.
    pub fn with_duration_probe(mut self, probe: Arc<dyn DurationProbe>) -> Self {
        self.duration_probe = Some(probe);
        self
    }

    pub fn constraints(&self) -> &ValidationConstraints {
        &self.constraints
    }

    /// Caller-owned temporary path of the upload, if it was spooled to disk.
    ///
    /// The validator never removes this file. Once processing is done the
    /// caller deletes it; validating again afterwards fails with
    /// [`ValidationError::FileUnavailable`].
    pub fn file_path(&self) -> Option<&'a Path> {
        let file: &'a UploadedFile = self.file;
        file.temporary_file_path()
    }

    #[tracing::instrument(skip(self), fields(
        filename = %self.file.filename(),
        content_type = %self.file.content_type(),
        size = self.file.size(),
        expected_type = %self.constraints.expected_type()
    ))]
    pub fn validate(&self) -> Result<ValidatedUpload<'a>, ValidationError> {
        let result = self.run_checks();

        match &result {
            Ok(validated) => {
                tracing::info!(converted = validated.is_converted(), "Upload validated");
            }
            Err(err) => log_rejection(err),
        }

        result
    }

    fn run_checks(&self) -> Result<ValidatedUpload<'a>, ValidationError> {
        self.check_available()?;
        self.check_type()?;
        self.check_size()?;

        match self.constraints.expected_type() {
            MediaType::Image => self.validate_image(),
            MediaType::Video => self.validate_video(),
        }
    }

    fn check_available(&self) -> Result<(), ValidationError> {
        match self.file.temporary_file_path() {
            Some(path) if !self.file.is_available() => Err(ValidationError::FileUnavailable {
                path: path.to_path_buf(),
            }),
            _ => Ok(()),
        }
    }

    fn check_type(&self) -> Result<(), ValidationError> {
        let expected = self.constraints.expected_type();
        let declared = self.file.content_type();

        if MediaType::from_content_type(declared) != Some(expected) {
            return Err(ValidationError::InvalidType {
                expected,
                actual: if declared.is_empty() {
                    "no content type".to_string()
                } else {
                    declared.to_string()
                },
            });
        }

        if expected == MediaType::Image {
            let data = self.file.read_bytes().map_err(|e| {
                self.probe_error(match e.kind() {
                    std::io::ErrorKind::NotFound => ProbeError::NotFound(
                        self.file
                            .temporary_file_path()
                            .map(Path::to_path_buf)
                            .unwrap_or_default(),
                    ),
                    _ => ProbeError::Tool(e.into()),
                })
            })?;
            ImageInspector::inspect(&data).map_err(|e| self.probe_error(e))?;
        }

        Ok(())
    }

    fn check_size(&self) -> Result<(), ValidationError> {
        let size = self.file.size();
        let max = self.constraints.max_size();
        if size > max {
            return Err(ValidationError::SizeExceeded { size, max });
        }
        Ok(())
    }

    fn validate_image(&self) -> Result<ValidatedUpload<'a>, ValidationError> {
        let limits = self.constraints.limits();

        if let Some(ratio) = self.constraints.aspect_ratio() {
            let (width, height) = self
                .dimension_probe
                .dimensions(self.file)
                .map_err(|e| self.probe_error(e))?;
            let actual = Resolution::new(width, height);

            if !ratio.matches(actual, limits.ratio_tolerance) {
                return Err(ValidationError::InvalidRatio {
                    expected: *ratio,
                    actual,
                });
            }

            let min = limits.resolution_floor(ratio);
            if !actual.meets(&min) {
                return Err(ValidationError::InvalidResolution { actual, min });
            }
        }

        if self.constraints.convert_to_compressed_format() {
            let converted = ImageCompressor::convert_to_webp(self.file, limits.webp_quality)
                .map_err(|e| self.probe_error(e))?;
            return Ok(ValidatedUpload::Converted(converted));
        }

        Ok(ValidatedUpload::Original(self.file))
    }

    fn validate_video(&self) -> Result<ValidatedUpload<'a>, ValidationError> {
        let probe: Arc<dyn DurationProbe> = match &self.duration_probe {
            Some(probe) => Arc::clone(probe),
            None => Arc::new(
                FfprobeProbe::new(self.constraints.limits().ffprobe_path.as_str())
                    .map_err(|e| ValidationError::ProbeFailed(format!("{e:#}")))?,
            ),
        };

        let duration = match self.file.temporary_file_path() {
            Some(path) => probe.duration(path),
            None => self.probe_spilled(probe.as_ref()),
        }
        .map_err(|e| self.probe_error(e))?;

        let max = self.constraints.limits().max_video_duration;
        if duration > max as f64 {
            return Err(ValidationError::DurationExceeded { duration, max });
        }

        Ok(ValidatedUpload::Original(self.file))
    }

    /// Probe an in-memory video through a scoped temp file owned by the validator.
    fn probe_spilled(&self, probe: &dyn DurationProbe) -> Result<f64, ProbeError> {
        let suffix = self
            .file
            .extension()
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        let data = self.file.read_bytes().map_err(|e| ProbeError::Tool(e.into()))?;

        let mut temp_file = tempfile::Builder::new()
            .prefix("mediagate-probe-")
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| ProbeError::Tool(e.into()))?;
        temp_file
            .write_all(&data)
            .and_then(|_| temp_file.flush())
            .map_err(|e| ProbeError::Tool(e.into()))?;

        probe.duration(temp_file.path())
    }

    fn probe_error(&self, err: ProbeError) -> ValidationError {
        match err {
            ProbeError::NotFound(path) => ValidationError::FileUnavailable { path },
            ProbeError::Unrecognized(reason) => ValidationError::InvalidType {
                expected: self.constraints.expected_type(),
                actual: reason,
            },
            ProbeError::Tool(source) => ValidationError::ProbeFailed(format!("{source:#}")),
        }
    }
}

fn log_rejection(err: &ValidationError) {
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(
            error_code = err.error_code(),
            field = err.field(),
            error = %err,
            "Upload rejected"
        ),
        LogLevel::Warn => tracing::warn!(
            error_code = err.error_code(),
            field = err.field(),
            error = %err,
            "Upload rejected"
        ),
        LogLevel::Error => tracing::error!(
            error_code = err.error_code(),
            field = err.field(),
            error = %err,
            "Upload could not be validated"
        ),
    }
}
