use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_INTERVAL_SECS: f64 = 10.0;
pub const HISTORY_WINDOW_SECS: f64 = 180.0;

pub const SNAPSHOTS_DIR: &str = "Snapshots";
pub const STATS_FILE: &str = "stats.json";
pub const DISPLAYS_FILE: &str = "displays.json";
pub const SETTINGS_FILE: &str = "settings.toml";

/// Shared settings, persisted next to the snapshots so both the agent and
/// any control surface can read and write them.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub interval_secs: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            interval_secs: DEFAULT_INTERVAL_SECS,
        }
    }
}

impl Settings {
    /// The configured sampling interval, or `None` when the stored value is
    /// non-positive (callers keep their previous interval in that case).
    pub fn sample_interval(&self) -> Option<f64> {
        (self.interval_secs > 0.0).then_some(self.interval_secs)
    }
}

/// Root of the shared data directory, the single location both the agent
/// and every consumer resolve independently. `HOSTPULSE_DATA_DIR` overrides
/// the platform default.
pub fn shared_root() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("HOSTPULSE_DATA_DIR") {
        return Some(PathBuf::from(dir));
    }
    dirs::data_dir().map(|p| p.join("hostpulse"))
}

pub fn settings_path(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE)
}

/// Reads the shared settings; a missing or unparsable file falls back to
/// defaults rather than failing.
pub fn load_settings(root: &Path) -> Settings {
    match std::fs::read_to_string(settings_path(root)) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Settings::default(),
    }
}

pub fn save_settings(root: &Path, settings: &Settings) -> io::Result<()> {
    std::fs::create_dir_all(root)?;
    let contents = toml::to_string_pretty(settings)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    std::fs::write(settings_path(root), contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval() {
        let settings = Settings::default();
        assert_eq!(settings.interval_secs, 10.0);
        assert_eq!(settings.sample_interval(), Some(10.0));
    }

    #[test]
    fn non_positive_interval_is_rejected() {
        assert_eq!(Settings { interval_secs: 0.0 }.sample_interval(), None);
        assert_eq!(Settings { interval_secs: -3.0 }.sample_interval(), None);
    }

    #[test]
    fn missing_file_returns_defaults() {
        let settings = load_settings(Path::new("/nonexistent/hostpulse"));
        assert_eq!(settings.interval_secs, DEFAULT_INTERVAL_SECS);
    }

    #[test]
    fn invalid_toml_returns_defaults() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(settings_path(root.path()), "not toml {{{{").unwrap();
        let settings = load_settings(root.path());
        assert_eq!(settings.interval_secs, DEFAULT_INTERVAL_SECS);
    }

    #[test]
    fn save_then_load_round_trips() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("nested");
        save_settings(&target, &Settings { interval_secs: 2.5 }).unwrap();
        let settings = load_settings(&target);
        assert_eq!(settings.interval_secs, 2.5);
    }

    #[test]
    fn parse_partial_toml() {
        let settings: Settings = toml::from_str("interval_secs = 5.0").unwrap();
        assert_eq!(settings.sample_interval(), Some(5.0));
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.interval_secs, DEFAULT_INTERVAL_SECS);
    }
}
