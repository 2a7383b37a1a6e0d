// crates/dashview-viewer/src/config.rs
//
// Runtime tunables. Every field has a default, so a partial (or absent) JSON
// file is fine. Values are sanitised after loading rather than rejected.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use dashview_core::PlaybackSpeed;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Media file extension to scan for, compared case-insensitively.
    pub extension:              String,
    /// Period of the progress sampler.
    pub sample_interval_ms:     u64,
    /// Progress at which the next event's players are staged. ≥ 1 disables staging.
    pub read_ahead_threshold:   f64,
    /// A player must report more than this many seconds to act as reference.
    pub min_reference_duration: f64,
    /// Secondary players further than this from the reference are re-seeked.
    pub max_skew_secs:          f64,
    pub initial_speed:          PlaybackSpeed,
    /// Append logs to `<temp>/dashview.log` instead of stderr.
    pub log_to_file:            bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            extension:              "mp4".into(),
            sample_interval_ms:     500,
            read_ahead_threshold:   0.3,
            min_reference_duration: 1.0,
            max_skew_secs:          0.5,
            initial_speed:          PlaybackSpeed::X1,
            log_to_file:            false,
        }
    }
}

impl ViewerConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config.sanitized())
    }

    /// `path` if given, else the platform default; a missing default file is
    /// not an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let p = default_config_path();
                if p.is_file() { Self::load(&p) } else { Ok(Self::default()) }
            }
        }
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Clamp values a hand-edited file could get wrong.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let ext = self.extension.trim().trim_start_matches('.').to_lowercase();
        self.extension = if ext.is_empty() { defaults.extension } else { ext };
        self.sample_interval_ms = self.sample_interval_ms.clamp(10, 10_000);
        if !self.read_ahead_threshold.is_finite() || self.read_ahead_threshold < 0.0 {
            self.read_ahead_threshold = defaults.read_ahead_threshold;
        }
        if !self.min_reference_duration.is_finite() || self.min_reference_duration < 0.0 {
            self.min_reference_duration = defaults.min_reference_duration;
        }
        if !self.max_skew_secs.is_finite() || self.max_skew_secs <= 0.0 {
            self.max_skew_secs = defaults.max_skew_secs;
        }
        self
    }
}

/// `%APPDATA%\dashview\config.json` on Windows, `~/.config/dashview/config.json` elsewhere.
pub fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    let base = std::env::var("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir());
    #[cfg(not(target_os = "windows"))]
    let base = std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(".config"))
        .unwrap_or_else(|_| std::env::temp_dir());
    base.join("dashview").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_in_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{ "extension": ".MP4", "initial_speed": "X2" }"#).unwrap();

        let config = ViewerConfig::load(&path).unwrap();
        assert_eq!(config.extension, "mp4");
        assert_eq!(config.initial_speed, PlaybackSpeed::X2);
        assert_eq!(config.sample_interval_ms, 500);
    }

    #[test]
    fn garbage_values_are_clamped() {
        let config = ViewerConfig {
            extension:            "  ".into(),
            sample_interval_ms:   0,
            read_ahead_threshold: f64::NAN,
            max_skew_secs:        -1.0,
            ..ViewerConfig::default()
        }
        .sanitized();
        assert_eq!(config.extension, "mp4");
        assert_eq!(config.sample_interval_ms, 10);
        assert_eq!(config.read_ahead_threshold, 0.3);
        assert_eq!(config.max_skew_secs, 0.5);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(ViewerConfig::load(&path).is_err());
        assert!(ViewerConfig::load_or_default(Some(&tmp.path().join("absent.json"))).is_err());
    }
}
