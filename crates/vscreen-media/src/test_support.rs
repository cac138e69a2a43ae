//! Synthetic media fixtures built from FFmpeg's lavfi sources.
//!
//! Only used by tests marked `#[ignore = "requires ffmpeg"]`.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A `secs` long `testsrc` clip at `fps` frames per second, written to `dir/name`.
/// `with_audio` adds a silent stereo track (`anullsrc`).
pub fn synth_video(dir: &Path, name: &str, secs: u32, fps: u32, with_audio: bool) -> PathBuf {
    let path = dir.join(name);
    let status = lavfi_command(secs, fps, with_audio)
        .arg(&path)
        .status()
        .expect("ffmpeg must be installed");
    assert!(status.success(), "ffmpeg failed to generate {}", path.display());
    path
}

/// Same clip muxed as Matroska to a pipe, so the container carries no
/// duration header (as browser `MediaRecorder` uploads do).
pub fn synth_headerless_video(dir: &Path, name: &str, secs: u32, fps: u32) -> PathBuf {
    let path = dir.join(name);
    let out = File::create(&path).unwrap();
    let status = lavfi_command(secs, fps, false)
        .args(["-f", "matroska", "pipe:1"])
        .stdout(Stdio::from(out))
        .status()
        .expect("ffmpeg must be installed");
    assert!(status.success(), "ffmpeg failed to generate {}", path.display());
    path
}

fn lavfi_command(secs: u32, fps: u32, with_audio: bool) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-y", "-hide_banner", "-loglevel", "error", "-f", "lavfi", "-i"])
        .arg(format!("testsrc=d={}:r={}:s=160x120", secs, fps));
    if with_audio {
        cmd.args(["-f", "lavfi", "-i", "anullsrc=r=44100:cl=stereo", "-shortest"])
            .args(["-c:a", "pcm_s16le"]);
    }
    cmd.args(["-c:v", "mpeg4", "-pix_fmt", "yuv420p"]);
    cmd
}
