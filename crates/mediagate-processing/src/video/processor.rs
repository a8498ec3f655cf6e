//! Video processor - ffprobe metadata extraction

use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Context, Result};

use crate::metadata::VideoMetadata;
use crate::traits::{DurationProbe, ProbeError};

/// Validate that a path doesn't contain shell metacharacters or dangerous sequences
fn validate_path(path: &str) -> Result<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow!("Path contains dangerous characters: {}", path));
    }

    if path.contains("..") {
        return Err(anyhow!("Path contains directory traversal: {}", path));
    }

    Ok(())
}

/// [`DurationProbe`] backed by the `ffprobe` executable.
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    ffprobe_path: String,
}

impl FfprobeProbe {
    pub fn new(ffprobe_path: impl Into<String>) -> Result<Self> {
        let ffprobe_path = ffprobe_path.into();
        validate_path(&ffprobe_path)
            .context("Invalid ffprobe_path: contains dangerous characters")?;

        if !ffprobe_path.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        }) {
            return Err(anyhow!("Invalid ffprobe_path: contains unsafe characters"));
        }

        Ok(Self { ffprobe_path })
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.ffprobe_path
    }

    /// Extract metadata from a video file on disk
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    pub fn extract_metadata_from_path(
        &self,
        video_path: &Path,
    ) -> std::result::Result<VideoMetadata, ProbeError> {
        let start = std::time::Instant::now();

        if !video_path.is_file() {
            return Err(ProbeError::NotFound(video_path.to_path_buf()));
        }

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(video_path)
            .output()
            .context("Failed to execute ffprobe")
            .map_err(ProbeError::Tool)?;

        if !output.status.success() {
            return Err(ProbeError::Unrecognized(format!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let metadata = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            video_duration = metadata.duration,
            codec = metadata.codec.as_deref().unwrap_or("unknown"),
            "Video probe completed"
        );

        Ok(metadata)
    }
}

impl DurationProbe for FfprobeProbe {
    fn duration(&self, path: &Path) -> std::result::Result<f64, ProbeError> {
        self.extract_metadata_from_path(path).map(|m| m.duration)
    }
}

/// Parse `ffprobe -print_format json -show_format -show_streams` output.
///
/// Duration comes from the container (`format.duration`), falling back to the
/// first video stream. Output without a video stream is not a video.
pub(crate) fn parse_probe_output(stdout: &[u8]) -> std::result::Result<VideoMetadata, ProbeError> {
    let probe_data: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| ProbeError::Unrecognized(format!("Failed to parse ffprobe output: {e}")))?;

    let stream = probe_data["streams"]
        .get(0)
        .ok_or_else(|| ProbeError::Unrecognized("No video stream found".to_string()))?;

    let format = &probe_data["format"];

    let duration = format["duration"]
        .as_str()
        .or_else(|| stream["duration"].as_str())
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| ProbeError::Unrecognized("Could not parse duration".to_string()))?;

    Ok(VideoMetadata {
        duration,
        width: stream["width"].as_u64().map(|w| w as u32),
        height: stream["height"].as_u64().map(|h| h as u32),
        codec: stream["codec_name"].as_str().map(str::to_string),
        bitrate: format["bit_rate"]
            .as_str()
            .and_then(|b| b.parse::<u64>().ok()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBE_OUTPUT: &str = r#"{
        "streams": [
            {
                "index": 0,
                "codec_name": "mpeg4",
                "width": 640,
                "height": 480,
                "r_frame_rate": "30/1",
                "duration": "5.000000"
            }
        ],
        "format": {
            "filename": "dummy_video.mp4",
            "duration": "5.000000",
            "bit_rate": "12345678"
        }
    }"#;

    #[test]
    fn test_new_rejects_dangerous_paths() {
        assert!(FfprobeProbe::new("ffprobe").is_ok());
        assert!(FfprobeProbe::new("/usr/bin/ffprobe").is_ok());
        assert!(FfprobeProbe::new("ffprobe; rm -rf /").is_err());
        assert!(FfprobeProbe::new("../ffprobe").is_err());
        assert!(FfprobeProbe::new("ff probe").is_err());
    }

    #[test]
    fn test_parse_probe_output() {
        let metadata = parse_probe_output(PROBE_OUTPUT.as_bytes()).unwrap();
        assert_eq!(metadata.duration, 5.0);
        assert_eq!(metadata.width, Some(640));
        assert_eq!(metadata.height, Some(480));
        assert_eq!(metadata.codec.as_deref(), Some("mpeg4"));
        assert_eq!(metadata.bitrate, Some(12345678));
    }

    #[test]
    fn test_parse_probe_output_stream_duration_fallback() {
        let output = r#"{"streams": [{"codec_name": "h264", "duration": "2.5"}], "format": {}}"#;
        let metadata = parse_probe_output(output.as_bytes()).unwrap();
        assert_eq!(metadata.duration, 2.5);
        assert_eq!(metadata.width, None);
    }

    #[test]
    fn test_parse_probe_output_no_video_stream() {
        let output = r#"{"streams": [], "format": {"duration": "3.0"}}"#;
        let result = parse_probe_output(output.as_bytes());
        assert!(matches!(result, Err(ProbeError::Unrecognized(_))));
    }

    #[test]
    fn test_parse_probe_output_missing_duration() {
        let output = r#"{"streams": [{"codec_name": "h264"}], "format": {"duration": "N/A"}}"#;
        let result = parse_probe_output(output.as_bytes());
        assert!(matches!(result, Err(ProbeError::Unrecognized(_))));
    }

    #[test]
    fn test_parse_probe_output_not_json() {
        let result = parse_probe_output(b"");
        assert!(matches!(result, Err(ProbeError::Unrecognized(_))));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let probe = FfprobeProbe::new("ffprobe").unwrap();
        let result = probe.duration(&dir.path().join("gone.mp4"));
        assert!(matches!(result, Err(ProbeError::NotFound(_))));
    }

    #[test]
    fn test_missing_binary_is_tool_error() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let probe = FfprobeProbe::new("/nonexistent/ffprobe-binary").unwrap();
        let result = probe.duration(temp.path());
        assert!(matches!(result, Err(ProbeError::Tool(_))));
    }
}
