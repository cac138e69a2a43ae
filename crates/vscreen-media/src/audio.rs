//! Audio track extraction.

use std::path::Path;

use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;

/// Sample rate of extracted audio (speech services expect 16 kHz).
pub const EXTRACT_SAMPLE_RATE: u32 = 16_000;

/// Extract the first audio track of `video_path` into a mono PCM WAV at `output_path`.
///
/// Any existing file at `output_path` is removed first. Fails with
/// `NoAudioTrack` when the container carries no audio stream and with
/// `ExtractionFailed` for every other failure.
pub async fn extract_audio(
    video_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    runner: &FfmpegRunner,
) -> MediaResult<()> {
    let video_path = video_path.as_ref();
    let output_path = output_path.as_ref();

    remove_existing(output_path).await?;

    let info = probe_video(video_path)
        .await
        .map_err(|e| MediaError::extraction_failed(e.to_string()))?;

    if !info.has_audio {
        return Err(MediaError::NoAudioTrack);
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MediaError::extraction_failed(e.to_string()))?;
        }
    }

    let cmd = extraction_command(video_path, output_path);
    runner.run(&cmd).await.map_err(|e| match e {
        MediaError::FfmpegFailed {
            stderr: Some(stderr),
            ..
        } if !stderr.is_empty() => MediaError::extraction_failed(stderr),
        other => MediaError::extraction_failed(other.to_string()),
    })?;

    if !output_path.exists() {
        return Err(MediaError::extraction_failed("FFmpeg produced no output file"));
    }

    info!(
        output = %output_path.display(),
        codec = info.audio_codec.as_deref().unwrap_or("unknown"),
        "Audio extracted"
    );
    Ok(())
}

fn extraction_command(video_path: &Path, output_path: &Path) -> FfmpegCommand {
    FfmpegCommand::new(video_path, output_path)
        .no_video()
        .map("0:a:0")
        .audio_codec("pcm_s16le")
        .audio_sample_rate(EXTRACT_SAMPLE_RATE)
        .audio_channels(1)
}

async fn remove_existing(path: &Path) -> MediaResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Removed stale audio file");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(MediaError::extraction_failed(format!(
            "Cannot overwrite {}: {}",
            path.display(),
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::synth_video;
    use tempfile::TempDir;

    #[test]
    fn test_extraction_command_targets_first_audio_stream() {
        let args = extraction_command(Path::new("in.webm"), Path::new("out.wav")).build_args();
        let map_pos = args.iter().position(|a| a == "-map").unwrap();
        assert_eq!(args[map_pos + 1], "0:a:0");
        assert!(args.contains(&"pcm_s16le".to_string()));
        assert!(args.contains(&"1".to_string()));
    }

    #[tokio::test]
    async fn test_stale_output_removed_even_when_source_missing() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("stale.wav");
        std::fs::write(&output, b"old").unwrap();

        let err = extract_audio(dir.path().join("missing.mp4"), &output, &FfmpegRunner::new())
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::ExtractionFailed(_)));
        assert!(!output.exists());
    }

    #[tokio::test]
    #[ignore = "requires ffmpeg"]
    async fn test_silent_video_has_no_audio_track() {
        let dir = TempDir::new().unwrap();
        let video = synth_video(dir.path(), "mute.mp4", 3, 10, false);
        let output = dir.path().join("mute.wav");

        let err = extract_audio(&video, &output, &FfmpegRunner::new())
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::NoAudioTrack));
        assert!(!output.exists());
    }

    #[tokio::test]
    #[ignore = "requires ffmpeg"]
    async fn test_extracts_mono_16khz_wav() {
        let dir = TempDir::new().unwrap();
        let video = synth_video(dir.path(), "answer.mkv", 3, 10, true);
        let output = dir.path().join("audio").join("answer.wav");

        extract_audio(&video, &output, &FfmpegRunner::new())
            .await
            .unwrap();

        let wav = std::fs::read(&output).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        let channels = u16::from_le_bytes([wav[22], wav[23]]);
        let sample_rate = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(channels, 1);
        assert_eq!(sample_rate, EXTRACT_SAMPLE_RATE);
    }
}
