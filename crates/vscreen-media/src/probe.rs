//! FFprobe container information.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::command::{check_ffprobe, stderr_tail};
use crate::error::{MediaError, MediaResult};

/// Container and stream information for a video file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Duration in seconds; `None` when neither the container nor the video
    /// stream reports one (common for streamed WebM recordings)
    pub duration: Option<f64>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
    /// Video codec
    pub codec: String,
    /// Whether the container carries at least one audio stream
    pub has_audio: bool,
    /// Codec of the first audio stream
    pub audio_codec: Option<String>,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
}

/// Probe a video file for information.
pub async fn probe_video(path: impl AsRef<Path>) -> MediaResult<VideoInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: "FFprobe failed".to_string(),
            stderr: Some(stderr_tail(&output.stderr)),
        });
    }

    parse_probe_output(&output.stdout)
}

/// Parse ffprobe `-print_format json` output.
fn parse_probe_output(stdout: &[u8]) -> MediaResult<VideoInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::decode_failed("No video stream found"))?;

    let audio_stream = probe.streams.iter().find(|s| s.codec_type == "audio");

    // Prefer the container duration; some muxers only report it per stream
    let duration = parse_duration(probe.format.duration.as_deref())
        .or_else(|| parse_duration(video_stream.duration.as_deref()));

    let fps = video_stream
        .avg_frame_rate
        .as_ref()
        .and_then(|r| parse_frame_rate(r))
        .or_else(|| {
            video_stream
                .r_frame_rate
                .as_ref()
                .and_then(|r| parse_frame_rate(r))
        })
        .unwrap_or(30.0);

    Ok(VideoInfo {
        duration,
        width: video_stream.width.unwrap_or(0),
        height: video_stream.height.unwrap_or(0),
        fps,
        codec: video_stream.codec_name.clone().unwrap_or_default(),
        has_audio: audio_stream.is_some(),
        audio_codec: audio_stream.and_then(|s| s.codec_name.clone()),
    })
}

/// Measure the duration of the first video stream from its packet timestamps.
///
/// Reads the packet index without decoding. Used when the container
/// carries no duration header. `None` when no packet has a timestamp.
pub async fn measure_duration(path: impl AsRef<Path>) -> MediaResult<Option<f64>> {
    let path = path.as_ref();

    check_ffprobe()?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "packet=pts_time",
            "-of",
            "csv=p=0",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: "FFprobe packet scan failed".to_string(),
            stderr: Some(stderr_tail(&output.stderr)),
        });
    }

    Ok(last_packet_time(&output.stdout))
}

/// Largest timestamp in `ffprobe -show_entries packet=pts_time -of csv=p=0` output.
fn last_packet_time(stdout: &[u8]) -> Option<f64> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter_map(|line| line.trim().trim_end_matches(',').parse::<f64>().ok())
        .filter(|t| t.is_finite())
        .fold(None, |max: Option<f64>, t| Some(max.map_or(t, |m| m.max(t))))
}

/// Positive, finite seconds; `N/A` and garbage are unknown.
fn parse_duration(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 && num > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
        assert!(parse_frame_rate("0/0").is_none());
    }

    #[test]
    fn test_parse_probe_with_audio() {
        let json = br#"{
            "format": {"duration": "12.480000"},
            "streams": [
                {"codec_type": "video", "codec_name": "h264", "width": 1280, "height": 720,
                 "avg_frame_rate": "30/1", "r_frame_rate": "30/1"},
                {"codec_type": "audio", "codec_name": "aac"}
            ]
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert!((info.duration.unwrap() - 12.48).abs() < 0.001);
        assert_eq!(info.width, 1280);
        assert!(info.has_audio);
        assert_eq!(info.audio_codec.as_deref(), Some("aac"));
    }

    #[test]
    fn test_parse_probe_silent_video_uses_stream_duration() {
        let json = br#"{
            "format": {},
            "streams": [
                {"codec_type": "video", "codec_name": "vp8", "avg_frame_rate": "0/0",
                 "r_frame_rate": "25/1", "duration": "10.0"}
            ]
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert!(!info.has_audio);
        assert!((info.duration.unwrap() - 10.0).abs() < 0.001);
        assert!((info.fps - 25.0).abs() < 0.001);
    }

    #[test]
    fn test_parse_probe_without_video_stream() {
        let json = br#"{"format": {"duration": "3.0"}, "streams": [{"codec_type": "audio"}]}"#;
        let err = parse_probe_output(json).unwrap_err();
        assert!(matches!(err, MediaError::DecodeFailed(_)));
    }

    #[test]
    fn test_parse_probe_without_duration() {
        // MediaRecorder WebM: no Duration element anywhere
        let json = br#"{
            "format": {"format_name": "matroska,webm", "duration": "N/A"},
            "streams": [
                {"codec_type": "video", "codec_name": "vp8", "r_frame_rate": "30/1"},
                {"codec_type": "audio", "codec_name": "opus"}
            ]
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.duration, None);
        assert!(info.has_audio);
    }

    #[test]
    fn test_stream_duration_used_when_container_reports_na() {
        let json = br#"{
            "format": {"duration": "N/A"},
            "streams": [{"codec_type": "video", "duration": "7.5"}]
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.duration, Some(7.5));
    }

    #[test]
    fn test_last_packet_time() {
        assert_eq!(last_packet_time(b"0.000000\n0.033000\n601.466000\n601.433000\n"), Some(601.466));
        assert_eq!(last_packet_time(b"N/A\n2.5,\n"), Some(2.5));
        assert_eq!(last_packet_time(b"N/A\n"), None);
        assert_eq!(last_packet_time(b""), None);
    }
}
