//! Ownership of per-run temporary files.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::metrics;

/// Temporary files owned by one run.
///
/// Every tracked path is deleted on [`cleanup`](Self::cleanup) or, at the
/// latest, when the guard is dropped. Dropping covers early returns,
/// panics and a caller abandoning the run future on its own timeout.
/// Deletion is best-effort: failures are logged, never raised.
#[derive(Debug)]
pub struct TempArtifacts {
    run_id: String,
    paths: Vec<PathBuf>,
}

impl TempArtifacts {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            paths: Vec::new(),
        }
    }

    /// Take ownership of `path` for the rest of the run.
    pub fn track(&mut self, path: impl Into<PathBuf>) -> &Path {
        self.paths.push(path.into());
        &self.paths[self.paths.len() - 1]
    }

    /// Delete every tracked file. Returns how many files were removed.
    pub fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        // Newest first
        while let Some(path) = self.paths.pop() {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    removed += 1;
                    debug!(run_id = %self.run_id, path = %path.display(), "Removed temp file");
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    metrics::record_cleanup_failure();
                    warn!(
                        run_id = %self.run_id,
                        path = %path.display(),
                        error = %e,
                        "Failed to remove temp file"
                    );
                }
            }
        }
        removed
    }
}

impl Drop for TempArtifacts {
    fn drop(&mut self) {
        if !self.paths.is_empty() {
            self.cleanup();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cleanup_removes_existing_and_ignores_missing() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("a.mp4");
        std::fs::write(&video, b"video").unwrap();

        let mut artifacts = TempArtifacts::new("run");
        artifacts.track(&video);
        artifacts.track(dir.path().join("never-created.wav"));

        assert_eq!(artifacts.cleanup(), 1);
        assert!(!video.exists());
        // Tracked list is drained
        assert_eq!(artifacts.cleanup(), 0);
    }

    #[test]
    fn test_drop_cleans_up() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("b.wav");
        std::fs::write(&audio, b"audio").unwrap();

        {
            let mut artifacts = TempArtifacts::new("run");
            artifacts.track(&audio);
        }
        assert!(!audio.exists());
    }

    #[test]
    fn test_drop_during_panic_cleans_up() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("c.mp4");
        std::fs::write(&video, b"video").unwrap();

        let path = video.clone();
        let outcome = std::panic::catch_unwind(move || {
            let mut artifacts = TempArtifacts::new("run");
            artifacts.track(path);
            panic!("stage blew up");
        });

        assert!(outcome.is_err());
        assert!(!video.exists());
    }
}
