#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper and object detection for interview videos.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with timeouts
//! - ffprobe-based probing and submission validation
//! - Audio track extraction to 16 kHz mono WAV
//! - Lazy frame sampling and prohibited-object presence detection

pub mod audio;
pub mod command;
pub mod detection;
pub mod error;
pub mod frames;
pub mod probe;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use audio::{extract_audio, EXTRACT_SAMPLE_RATE};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use detection::{
    ClassScore, FrameClassifier, ObjectDetector, ObjectDetectorConfig, PresenceConfig,
    PresenceDetector,
};
pub use error::{MediaError, MediaResult};
pub use frames::{sample_frames, Frame, SampledFrames, SamplerConfig};
pub use probe::{measure_duration, probe_video, VideoInfo};
pub use validate::{check_duration, check_preconditions, validate_video};
