//! Sampled frame decoding.
//!
//! FFmpeg decodes the video sequentially and emits only every Nth frame as
//! raw RGB24, scaled to the detector input size. Frames are read lazily from
//! the pipe one at a time, so memory stays bounded by a single frame.

use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use crate::command::{check_ffmpeg, stderr_tail};
use crate::error::{MediaError, MediaResult};

/// A decoded RGB24 frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// 1-based position of the frame in the source video
    pub index: u64,
    pub width: u32,
    pub height: u32,
    /// Packed RGB bytes (width * height * 3)
    pub rgb: Vec<u8>,
}

/// Settings for frame sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Evaluate every Nth frame (frames N, 2N, 3N, ...)
    pub stride: u64,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            stride: 10,
            width: 640,
            height: 640,
        }
    }
}

impl SamplerConfig {
    fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    /// FFmpeg filter selecting frames whose 1-based counter is a multiple of the stride.
    fn filter(&self) -> String {
        let stride = self.stride.max(1);
        format!(
            "select='not(mod(n+1\\,{}))',scale={}:{}",
            stride, self.width, self.height
        )
    }
}

/// Open `path` and iterate its sampled frames.
///
/// Fails with `DecodeFailed` when FFmpeg cannot be started. A container
/// that FFmpeg cannot open surfaces as `DecodeFailed` from the first call
/// to `next()`.
pub fn sample_frames(path: &Path, config: SamplerConfig) -> MediaResult<SampledFrames> {
    if !path.exists() {
        return Err(MediaError::decode_failed(format!(
            "Could not open video: {}",
            path.display()
        )));
    }

    check_ffmpeg()?;

    let mut child = Command::new("ffmpeg")
        .args(["-hide_banner", "-nostdin", "-loglevel", "error", "-i"])
        .arg(path)
        .args([
            "-vf",
            &config.filter(),
            "-vsync",
            "0",
            "-pix_fmt",
            "rgb24",
            "-f",
            "rawvideo",
            "-",
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| MediaError::decode_failed(format!("Failed to spawn FFmpeg: {}", e)))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| MediaError::decode_failed("Failed to capture FFmpeg stdout"))?;

    // Drain stderr on its own thread so a chatty decoder never blocks stdout
    let stderr_reader = child.stderr.take().map(|mut stderr| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf);
            buf
        })
    });

    debug!(
        path = %path.display(),
        stride = config.stride,
        "Started frame sampler"
    );

    Ok(SampledFrames {
        child,
        stdout,
        stderr_reader,
        config,
        path: path.display().to_string(),
        emitted: 0,
        finished: false,
    })
}

/// Lazy iterator over sampled frames.
pub struct SampledFrames {
    child: Child,
    stdout: ChildStdout,
    stderr_reader: Option<JoinHandle<Vec<u8>>>,
    config: SamplerConfig,
    path: String,
    emitted: u64,
    finished: bool,
}

impl SampledFrames {
    /// Read exactly one frame. `Ok(None)` on a clean end of stream.
    fn read_frame(&mut self) -> MediaResult<Option<Vec<u8>>> {
        let mut buf = vec![0u8; self.config.frame_bytes()];
        let mut filled = 0;

        while filled < buf.len() {
            match self.stdout.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(MediaError::decode_failed(e.to_string())),
            }
        }

        if filled == buf.len() {
            Ok(Some(buf))
        } else {
            if filled > 0 {
                warn!(bytes = filled, "Discarding truncated trailing frame");
            }
            Ok(None)
        }
    }

    /// Reap FFmpeg after the stream ended.
    fn finish(&mut self) -> MediaResult<()> {
        self.finished = true;

        let status = self
            .child
            .wait()
            .map_err(|e| MediaError::decode_failed(format!("FFmpeg process error: {}", e)))?;
        let stderr = self
            .stderr_reader
            .take()
            .and_then(|h| h.join().ok())
            .unwrap_or_default();

        if status.success() {
            return Ok(());
        }

        if self.emitted == 0 {
            let detail = stderr_tail(&stderr);
            return Err(MediaError::decode_failed(if detail.is_empty() {
                format!("Could not open video: {}", self.path)
            } else {
                format!("Could not open video: {}: {}", self.path, detail)
            }));
        }

        // Late decode errors end iteration like an end of stream
        warn!(
            status = ?status.code(),
            frames = self.emitted,
            "FFmpeg stopped early while sampling frames"
        );
        Ok(())
    }
}

impl Iterator for SampledFrames {
    type Item = MediaResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_frame() {
            Ok(Some(rgb)) => {
                self.emitted += 1;
                Some(Ok(Frame {
                    index: self.emitted * self.config.stride.max(1),
                    width: self.config.width,
                    height: self.config.height,
                    rgb,
                }))
            }
            Ok(None) => match self.finish() {
                Ok(()) => None,
                Err(e) => Some(Err(e)),
            },
            Err(e) => {
                self.finished = true;
                let _ = self.child.kill();
                let _ = self.child.wait();
                Some(Err(e))
            }
        }
    }
}

impl Drop for SampledFrames {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
