use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RatioParseError;

/// Media type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            _ => None,
        }
    }

    /// Derive the media category from a declared content type.
    ///
    /// Parameters (`; charset=...`) and case are ignored. Returns `None` for
    /// anything that is neither `image/*` nor `video/*`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();

        let (top_level, subtype) = essence.split_once('/')?;
        if subtype.is_empty() {
            return None;
        }

        match top_level {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when both dimensions reach the given floor.
    pub fn meets(&self, floor: &Resolution) -> bool {
        self.width >= floor.width && self.height >= floor.height
    }

    pub fn short_edge(&self) -> u32 {
        self.width.min(self.height)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Declared width-to-height proportion, always stored in lowest terms.
///
/// Parsed from a `"W:H"` string, so `"32:18"` and `"16:9"` are the same ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AspectRatio {
    width: u32,
    height: u32,
}

impl AspectRatio {
    pub fn new(width: u32, height: u32) -> Result<Self, RatioParseError> {
        if width == 0 || height == 0 {
            return Err(RatioParseError::ZeroComponent(format!("{width}:{height}")));
        }
        let divisor = gcd(width, height);
        Ok(Self {
            width: width / divisor,
            height: height / divisor,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_f64(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Compare actual pixel dimensions against this ratio.
    ///
    /// The relative deviation `|actual / expected - 1|` must not exceed
    /// `tolerance`. A zero-sized side never matches.
    pub fn matches(&self, actual: Resolution, tolerance: f64) -> bool {
        if actual.width == 0 || actual.height == 0 {
            return false;
        }
        let actual_ratio = actual.width as f64 / actual.height as f64;
        (actual_ratio / self.as_f64() - 1.0).abs() <= tolerance
    }
}

impl FromStr for AspectRatio {
    type Err = RatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| RatioParseError::Format(s.to_string()))?;

        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|_| RatioParseError::Format(s.to_string()))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|_| RatioParseError::Format(s.to_string()))?;

        Self::new(width, height)
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = RatioParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AspectRatio> for String {
    fn from(ratio: AspectRatio) -> Self {
        ratio.to_string()
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_parse() {
        assert_eq!(MediaType::parse("image"), Some(MediaType::Image));
        assert_eq!(MediaType::parse(" VIDEO "), Some(MediaType::Video));
        assert_eq!(MediaType::parse("audio"), None);
    }

    #[test]
    fn test_media_type_from_content_type() {
        assert_eq!(
            MediaType::from_content_type("image/jpeg"),
            Some(MediaType::Image)
        );
        assert_eq!(
            MediaType::from_content_type("Video/MP4; codecs=avc1"),
            Some(MediaType::Video)
        );
        assert_eq!(MediaType::from_content_type("application/pdf"), None);
        assert_eq!(MediaType::from_content_type("image/"), None);
        assert_eq!(MediaType::from_content_type(""), None);
    }

    #[test]
    fn test_media_type_serialization() {
        let json = serde_json::to_string(&MediaType::Video).unwrap();
        assert_eq!(json, "\"video\"");
    }

    #[test]
    fn test_aspect_ratio_parse_reduces() {
        let ratio: AspectRatio = "32:18".parse().unwrap();
        assert_eq!(ratio, "16:9".parse().unwrap());
        assert_eq!(ratio.to_string(), "16:9");
    }

    #[test]
    fn test_aspect_ratio_parse_invalid() {
        assert!(matches!(
            "16x9".parse::<AspectRatio>(),
            Err(RatioParseError::Format(_))
        ));
        assert!(matches!(
            "a:b".parse::<AspectRatio>(),
            Err(RatioParseError::Format(_))
        ));
        assert!(matches!(
            "0:9".parse::<AspectRatio>(),
            Err(RatioParseError::ZeroComponent(_))
        ));
    }

    #[test]
    fn test_aspect_ratio_matches_with_tolerance() {
        let ratio: AspectRatio = "16:9".parse().unwrap();
        assert!(ratio.matches(Resolution::new(1920, 1080), 0.01));
        // 1366x768 is 0.05% off 16:9
        assert!(ratio.matches(Resolution::new(1366, 768), 0.01));
        assert!(!ratio.matches(Resolution::new(100, 200), 0.01));
        assert!(!ratio.matches(Resolution::new(0, 200), 0.01));
    }

    #[test]
    fn test_aspect_ratio_serde_as_string() {
        let ratio: AspectRatio = "4:3".parse().unwrap();
        let json = serde_json::to_string(&ratio).unwrap();
        assert_eq!(json, "\"4:3\"");
        let back: AspectRatio = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ratio);
    }

    #[test]
    fn test_resolution_meets() {
        let floor = Resolution::new(400, 400);
        assert!(Resolution::new(400, 400).meets(&floor));
        assert!(!Resolution::new(100, 100).meets(&floor));
        assert_eq!(Resolution::new(100, 200).short_edge(), 100);
    }
}
