//! Configuration module
//!
//! [`ValidationLimits`] holds the process-wide thresholds (loaded from the
//! environment or taken from defaults). [`ValidationConstraints`] is the
//! immutable, per-upload configuration handed to the validator; it is built
//! with named `with_*` options instead of mutating fields after construction.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use anyhow::anyhow;

use crate::error::RatioParseError;
use crate::models::{AspectRatio, MediaType, Resolution};

const MB: u64 = 1024 * 1024;

// Defaults
const MAX_FILE_SIZE_MB: u64 = 10;
const MAX_VIDEO_SIZE_MB: u64 = 500;
const MAX_VIDEO_DURATION_SECS: u64 = 300;
/// Maximum relative deviation between actual and requested aspect ratio (1%).
const RATIO_TOLERANCE: f64 = 0.01;
/// Floor for ratios without an entry in the resolution table.
const MIN_SHORT_EDGE_PX: u32 = 320;

/// Per-ratio minimum resolutions used unless overridden.
const DEFAULT_RESOLUTION_FLOORS: [((u32, u32), (u32, u32)); 5] = [
    ((1, 1), (400, 400)),
    ((4, 3), (800, 600)),
    ((3, 4), (600, 800)),
    ((16, 9), (1280, 720)),
    ((9, 16), (720, 1280)),
];

/// Quality presets for WebP conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityPreset {
    #[default]
    Normal, // Default quality, balanced size and quality
    Better,   // Higher quality, ≈125% file size
    Best,     // Near pristine quality, ≈170% file size
    Lighter,  // Smaller files, ≈80% file size
    Lightest, // Maximum compression, ≈50% file size
}

impl QualityPreset {
    pub fn parse(s: &str) -> Result<Self, anyhow::Error> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(QualityPreset::Normal),
            "better" => Ok(QualityPreset::Better),
            "best" => Ok(QualityPreset::Best),
            "lighter" => Ok(QualityPreset::Lighter),
            "lightest" => Ok(QualityPreset::Lightest),
            _ => Err(anyhow!("Invalid quality preset: {}", s)),
        }
    }

    /// Get quality value for WebP (0-100)
    pub fn webp_quality(self) -> f32 {
        match self {
            QualityPreset::Normal => 80.0,
            QualityPreset::Better => 90.0,
            QualityPreset::Best => 98.0,
            QualityPreset::Lighter => 70.0,
            QualityPreset::Lightest => 55.0,
        }
    }
}

/// Thresholds shared by every validation call.
#[derive(Clone, Debug)]
pub struct ValidationLimits {
    pub max_file_size: u64,
    pub max_video_size: u64,
    /// Seconds
    pub max_video_duration: u64,
    pub ratio_tolerance: f64,
    pub resolution_floors: HashMap<AspectRatio, Resolution>,
    /// Both sides must reach this when the ratio has no table entry.
    pub min_short_edge: u32,
    pub webp_quality: QualityPreset,
    pub ffprobe_path: String,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE_MB * MB,
            max_video_size: MAX_VIDEO_SIZE_MB * MB,
            max_video_duration: MAX_VIDEO_DURATION_SECS,
            ratio_tolerance: RATIO_TOLERANCE,
            resolution_floors: default_resolution_floors(),
            min_short_edge: MIN_SHORT_EDGE_PX,
            webp_quality: QualityPreset::default(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

impl ValidationLimits {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name: &str| env::var(name).ok())
    }

    /// Build limits from a variable lookup. Unset variables take the default;
    /// set but malformed ones are an error.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let defaults = Self::default();

        let webp_quality = match lookup("WEBP_QUALITY") {
            Some(preset) => QualityPreset::parse(&preset)?,
            None => defaults.webp_quality,
        };

        let limits = ValidationLimits {
            max_file_size: megabytes(
                "MAX_FILE_SIZE_MB",
                parse_var(&lookup, "MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB)?,
            )?,
            max_video_size: megabytes(
                "MAX_VIDEO_SIZE_MB",
                parse_var(&lookup, "MAX_VIDEO_SIZE_MB", MAX_VIDEO_SIZE_MB)?,
            )?,
            max_video_duration: parse_var(
                &lookup,
                "MAX_VIDEO_DURATION_SECS",
                MAX_VIDEO_DURATION_SECS,
            )?,
            ratio_tolerance: parse_var(&lookup, "RATIO_TOLERANCE", RATIO_TOLERANCE)?,
            resolution_floors: defaults.resolution_floors,
            min_short_edge: parse_var(&lookup, "MIN_SHORT_EDGE_PX", MIN_SHORT_EDGE_PX)?,
            webp_quality,
            ffprobe_path: lookup("FFPROBE_PATH").unwrap_or(defaults.ffprobe_path),
        };

        limits.validate()?;
        Ok(limits)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size == 0 {
            return Err(anyhow!("MAX_FILE_SIZE_MB must be greater than zero"));
        }

        if self.max_video_size == 0 {
            return Err(anyhow!("MAX_VIDEO_SIZE_MB must be greater than zero"));
        }

        if self.max_video_duration == 0 {
            return Err(anyhow!("MAX_VIDEO_DURATION_SECS must be greater than zero"));
        }

        if !(0.0..1.0).contains(&self.ratio_tolerance) {
            return Err(anyhow!("RATIO_TOLERANCE must be in [0, 1)"));
        }

        if self.ffprobe_path.trim().is_empty() {
            return Err(anyhow!("FFPROBE_PATH must not be empty"));
        }

        Ok(())
    }

    /// Minimum resolution accepted for images of the given ratio.
    pub fn resolution_floor(&self, ratio: &AspectRatio) -> Resolution {
        self.resolution_floors
            .get(ratio)
            .copied()
            .unwrap_or(Resolution::new(self.min_short_edge, self.min_short_edge))
    }

    pub fn with_resolution_floor(mut self, ratio: AspectRatio, floor: Resolution) -> Self {
        self.resolution_floors.insert(ratio, floor);
        self
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, anyhow::Error> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| anyhow!("{} must be a valid number", name)),
        None => Ok(default),
    }
}

fn megabytes(name: &str, value: u64) -> Result<u64, anyhow::Error> {
    value
        .checked_mul(MB)
        .ok_or_else(|| anyhow!("{} is too large", name))
}

fn default_resolution_floors() -> HashMap<AspectRatio, Resolution> {
    DEFAULT_RESOLUTION_FLOORS
        .iter()
        .filter_map(|&((w, h), (min_w, min_h))| {
            AspectRatio::new(w, h)
                .ok()
                .map(|ratio| (ratio, Resolution::new(min_w, min_h)))
        })
        .collect()
}

/// Per-upload validation configuration.
#[derive(Clone, Debug)]
pub struct ValidationConstraints {
    expected_type: MediaType,
    aspect_ratio: Option<AspectRatio>,
    convert_to_compressed_format: bool,
    limits: ValidationLimits,
}

impl ValidationConstraints {
    pub fn new(expected_type: MediaType) -> Self {
        Self {
            expected_type,
            aspect_ratio: None,
            convert_to_compressed_format: false,
            limits: ValidationLimits::default(),
        }
    }

    pub fn image() -> Self {
        Self::new(MediaType::Image)
    }

    pub fn video() -> Self {
        Self::new(MediaType::Video)
    }

    /// Require a `"W:H"` aspect ratio (images only).
    pub fn with_aspect_ratio(self, ratio: &str) -> Result<Self, RatioParseError> {
        Ok(self.with_ratio(ratio.parse()?))
    }

    pub fn with_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(ratio);
        self
    }

    /// Re-encode accepted images to WebP (images only).
    pub fn with_webp(mut self, convert: bool) -> Self {
        self.convert_to_compressed_format = convert;
        self
    }

    /// Replace the thresholds. Limits that fail [`ValidationLimits::validate`]
    /// are rejected.
    pub fn with_limits(mut self, limits: ValidationLimits) -> Result<Self, anyhow::Error> {
        limits.validate()?;
        self.limits = limits;
        Ok(self)
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.limits.max_file_size = bytes;
        self
    }

    pub fn with_max_video_size(mut self, bytes: u64) -> Self {
        self.limits.max_video_size = bytes;
        self
    }

    pub fn with_max_video_duration(mut self, seconds: u64) -> Self {
        self.limits.max_video_duration = seconds;
        self
    }

    pub fn expected_type(&self) -> MediaType {
        self.expected_type
    }

    pub fn aspect_ratio(&self) -> Option<&AspectRatio> {
        self.aspect_ratio.as_ref()
    }

    pub fn convert_to_compressed_format(&self) -> bool {
        self.convert_to_compressed_format
    }

    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    /// Size threshold for the expected media type.
    pub fn max_size(&self) -> u64 {
        match self.expected_type {
            MediaType::Image => self.limits.max_file_size,
            MediaType::Video => self.limits.max_video_size,
        }
    }
}
