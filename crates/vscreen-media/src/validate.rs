//! Submission validation: existence, container extension and duration.

use std::path::Path;

use tracing::{debug, info};
use vscreen_models::VideoPolicy;

use crate::error::{MediaError, MediaResult};
use crate::probe::{measure_duration, probe_video, VideoInfo};

/// Check a submitted video against the policy.
///
/// Checks run cheapest first so a disallowed extension is rejected before
/// the container is ever opened:
/// 1. the path exists (`FileNotFound`)
/// 2. the extension is allowed (`UnsupportedFormat`)
/// 3. the container probes and its duration is within the ceiling
///    (`DurationExceeded`, any other probe failure is `DecodeFailed`)
///
/// Containers without a duration header are measured from their packet
/// timestamps; a video whose duration cannot be established at all is
/// `DecodeFailed`, never waved through. The returned info always carries a
/// duration. The file is only read.
pub async fn validate_video(path: impl AsRef<Path>, policy: &VideoPolicy) -> MediaResult<VideoInfo> {
    let path = path.as_ref();

    check_preconditions(path, policy)?;

    let mut info = probe_video(path).await.map_err(as_decode_error)?;

    debug!(
        path = %path.display(),
        duration = ?info.duration,
        codec = %info.codec,
        has_audio = info.has_audio,
        "Probed submission"
    );

    let duration = match info.duration {
        Some(duration) => duration,
        None => {
            debug!(path = %path.display(), "No duration header, measuring packets");
            measure_duration(path)
                .await
                .map_err(as_decode_error)?
                .ok_or_else(|| MediaError::decode_failed("Could not determine video duration"))?
        }
    };
    info.duration = Some(duration);

    check_duration(duration, policy)?;

    info!(path = %path.display(), duration, "Video validation passed");
    Ok(info)
}

/// Duration ceiling check (inclusive).
pub fn check_duration(duration_secs: f64, policy: &VideoPolicy) -> MediaResult<()> {
    if policy.allows_duration(duration_secs) {
        Ok(())
    } else {
        Err(MediaError::DurationExceeded {
            duration_secs,
            max_secs: policy.max_duration_secs(),
        })
    }
}

fn as_decode_error(err: MediaError) -> MediaError {
    match err {
        MediaError::FileNotFound(p) => MediaError::FileNotFound(p),
        MediaError::DecodeFailed(msg) => MediaError::DecodeFailed(msg),
        other => MediaError::decode_failed(other.to_string()),
    }
}

/// Existence and extension checks. Never opens the file.
pub fn check_preconditions(path: &Path, policy: &VideoPolicy) -> MediaResult<()> {
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    if !policy.is_allowed(path) {
        return Err(MediaError::UnsupportedFormat {
            extension: VideoPolicy::extension_of(path).unwrap_or_default(),
            allowed: policy.allowed_list(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{synth_headerless_video, synth_video};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.mp4");

        let err = validate_video(&path, &VideoPolicy::default()).await.unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_disallowed_extension_rejected_before_probe() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("answer.txt");
        std::fs::write(&path, b"not a video").unwrap();

        // Fails with a format error even where ffprobe is not installed
        let err = validate_video(&path, &VideoPolicy::default()).await.unwrap_err();
        match err {
            MediaError::UnsupportedFormat { extension, allowed } => {
                assert_eq!(extension, ".txt");
                assert!(allowed.contains(".mp4"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    #[ignore = "requires ffprobe"]
    async fn test_garbage_container_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("answer.mp4");
        std::fs::write(&path, b"definitely not an mp4").unwrap();

        let err = validate_video(&path, &VideoPolicy::default()).await.unwrap_err();
        assert!(matches!(err, MediaError::DecodeFailed(_)));
    }

    #[test]
    fn test_duration_ceiling_is_inclusive() {
        let policy = VideoPolicy::default();
        assert!(check_duration(60.0, &policy).is_ok());

        match check_duration(75.0, &policy).unwrap_err() {
            MediaError::DurationExceeded { duration_secs, max_secs } => {
                assert_eq!(duration_secs, 75.0);
                assert_eq!(max_secs, 60.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    #[ignore = "requires ffmpeg"]
    async fn test_probed_duration_within_ceiling() {
        let dir = TempDir::new().unwrap();
        let path = synth_video(dir.path(), "answer.mkv", 3, 10, true);

        let info = validate_video(&path, &VideoPolicy::default()).await.unwrap();
        let duration = info.duration.unwrap();
        assert!((duration - 3.0).abs() < 0.5, "duration {duration}");
        assert!(info.has_audio);
    }

    #[tokio::test]
    #[ignore = "requires ffmpeg"]
    async fn test_headerless_container_is_measured_against_ceiling() {
        let dir = TempDir::new().unwrap();
        let path = synth_headerless_video(dir.path(), "interview.mkv", 3, 10);
        let policy = VideoPolicy::new(2.0, [".mkv"]).unwrap();

        let err = validate_video(&path, &policy).await.unwrap_err();
        match err {
            MediaError::DurationExceeded { duration_secs, .. } => assert!(duration_secs > 2.0),
            other => panic!("unexpected error: {other}"),
        }
    }
}
