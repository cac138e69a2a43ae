//! Submission policy for interview videos.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default duration ceiling in seconds.
pub const DEFAULT_MAX_DURATION_SECS: f64 = 60.0;

/// Default container extensions accepted for submissions.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".avi", ".mkv", ".webm"];

const MAX_DURATION_VAR: &str = "VSCREEN_MAX_DURATION_SECS";
const ALLOWED_EXTENSIONS_VAR: &str = "VSCREEN_ALLOWED_EXTENSIONS";

/// Errors raised when a policy is built from invalid values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("Maximum duration must be a positive number of seconds, got {0}")]
    InvalidDuration(f64),

    #[error("At least one allowed extension is required")]
    NoExtensions,

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Limits a submitted video must satisfy before it is analyzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoPolicy {
    /// Duration ceiling in seconds (inclusive)
    max_duration_secs: f64,
    /// Lowercase extensions with a leading dot
    allowed_extensions: Vec<String>,
}

impl Default for VideoPolicy {
    fn default() -> Self {
        Self {
            max_duration_secs: DEFAULT_MAX_DURATION_SECS,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

impl VideoPolicy {
    /// Create a policy, normalizing extensions to lowercase with a leading dot.
    pub fn new<I, S>(max_duration_secs: f64, allowed_extensions: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !(max_duration_secs > 0.0 && max_duration_secs.is_finite()) {
            return Err(PolicyError::InvalidDuration(max_duration_secs));
        }

        let mut extensions: Vec<String> = allowed_extensions
            .into_iter()
            .filter_map(|e| normalize_extension(e.as_ref()))
            .collect();
        extensions.sort();
        extensions.dedup();

        if extensions.is_empty() {
            return Err(PolicyError::NoExtensions);
        }

        Ok(Self {
            max_duration_secs,
            allowed_extensions: extensions,
        })
    }

    /// Create policy from environment variables. Unset or blank variables
    /// keep the defaults; a value that is set but invalid is an error.
    ///
    /// - `VSCREEN_MAX_DURATION_SECS`
    /// - `VSCREEN_ALLOWED_EXTENSIONS` (comma separated, e.g. `.mp4,.mov`)
    pub fn from_env() -> Result<Self, PolicyError> {
        let max_duration = std::env::var(MAX_DURATION_VAR).ok();
        let extensions = std::env::var(ALLOWED_EXTENSIONS_VAR).ok();
        Self::from_settings(max_duration.as_deref(), extensions.as_deref())
    }

    /// Build a policy from raw setting strings, as read from the environment.
    pub fn from_settings(
        max_duration: Option<&str>,
        extensions: Option<&str>,
    ) -> Result<Self, PolicyError> {
        let max_duration_secs = match max_duration.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse::<f64>().map_err(|_| PolicyError::InvalidValue {
                name: MAX_DURATION_VAR,
                value: raw.to_string(),
            })?,
            None => DEFAULT_MAX_DURATION_SECS,
        };

        match extensions.filter(|s| !s.trim().is_empty()) {
            Some(raw) => Self::new(max_duration_secs, raw.split(',')),
            None => Self::new(max_duration_secs, DEFAULT_ALLOWED_EXTENSIONS),
        }
    }

    /// Duration ceiling in seconds.
    pub fn max_duration_secs(&self) -> f64 {
        self.max_duration_secs
    }

    /// Allowed extensions (lowercase, leading dot).
    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// Lowercase extension of a path or file name, with a leading dot.
    pub fn extension_of(path: impl AsRef<Path>) -> Option<String> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
    }

    /// Check whether a path or uploaded file name carries an allowed extension.
    pub fn is_allowed(&self, path: impl AsRef<Path>) -> bool {
        Self::extension_of(path)
            .map(|ext| self.allowed_extensions.iter().any(|a| *a == ext))
            .unwrap_or(false)
    }

    /// Check whether a duration is within the ceiling.
    pub fn allows_duration(&self, duration_secs: f64) -> bool {
        duration_secs <= self.max_duration_secs
    }

    /// Human-readable list of allowed extensions, e.g. `.avi, .mkv, .mp4`.
    pub fn allowed_list(&self) -> String {
        self.allowed_extensions.join(", ")
    }
}

fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}
