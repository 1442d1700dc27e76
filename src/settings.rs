use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{PoisonError, RwLock},
    time::Duration,
};

const DEBUG_ENV: &str = "EDGELENS_DEBUG";
const DEBUG_SPEEDUP: u64 = 10;

/// Fixed delays between wizard steps, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Timings {
    pub scan_detect_ms: u64,
    pub scan_retry_ms: u64,
    pub confirm_ms: u64,
    pub analysis_ms: u64,
    pub reanalysis_ms: u64,
    pub sensor_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            scan_detect_ms: 3000,
            scan_retry_ms: 2000,
            confirm_ms: 1500,
            analysis_ms: 5000,
            reanalysis_ms: 2500,
            sensor_ms: 1500,
        }
    }
}

impl Timings {
    pub fn scan_detect(&self) -> Duration {
        Duration::from_millis(self.scan_detect_ms)
    }

    pub fn scan_retry(&self) -> Duration {
        Duration::from_millis(self.scan_retry_ms)
    }

    pub fn confirm(&self) -> Duration {
        Duration::from_millis(self.confirm_ms)
    }

    pub fn analysis(&self) -> Duration {
        Duration::from_millis(self.analysis_ms)
    }

    pub fn reanalysis(&self) -> Duration {
        Duration::from_millis(self.reanalysis_ms)
    }

    pub fn sensor(&self) -> Duration {
        Duration::from_millis(self.sensor_ms)
    }

    fn scaled_down(&self, factor: u64) -> Self {
        Self {
            scan_detect_ms: self.scan_detect_ms / factor,
            scan_retry_ms: self.scan_retry_ms / factor,
            confirm_ms: self.confirm_ms / factor,
            analysis_ms: self.analysis_ms / factor,
            reanalysis_ms: self.reanalysis_ms / factor,
            sensor_ms: self.sensor_ms / factor,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiagnosticSettings {
    pub timings: Timings,
    /// Chance that denying an issue leads to another candidate instead of a
    /// "no issue found" outcome.
    pub deny_reroll_probability: f64,
    /// `None` keeps retrying unrecognized codes until the scan is closed.
    pub max_scan_attempts: Option<u32>,
}

impl Default for DiagnosticSettings {
    fn default() -> Self {
        Self {
            timings: Timings::default(),
            deny_reroll_probability: 0.5,
            max_scan_attempts: Some(10),
        }
    }
}

impl DiagnosticSettings {
    /// Clamps values a hand-edited settings file could get wrong.
    pub fn sanitized(mut self) -> Self {
        self.deny_reroll_probability = if self.deny_reroll_probability.is_finite() {
            self.deny_reroll_probability.clamp(0.0, 1.0)
        } else {
            0.5
        };
        if self.max_scan_attempts == Some(0) {
            self.max_scan_attempts = Some(1);
        }
        self
    }

    /// Applies the `EDGELENS_DEBUG` speed-up when the variable is set.
    pub fn with_env_overrides(self) -> Self {
        let debug_mode = std::env::var(DEBUG_ENV)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        if debug_mode {
            Self {
                timings: self.timings.scaled_down(DEBUG_SPEEDUP),
                ..self
            }
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    diagnostics: DiagnosticSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring unreadable settings at {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn diagnostics(&self) -> DiagnosticSettings {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .diagnostics
            .clone()
            .sanitized()
    }

    pub fn update_diagnostics(&self, settings: DiagnosticSettings) -> Result<DiagnosticSettings> {
        let settings = settings.sanitized();
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        guard.diagnostics = settings.clone();
        self.persist(&guard)?;
        Ok(settings)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.diagnostics(), DiagnosticSettings::default());
    }

    #[test]
    fn update_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut settings = DiagnosticSettings::default();
        settings.max_scan_attempts = None;
        settings.timings.analysis_ms = 4000;
        store.update_diagnostics(settings.clone()).unwrap();

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.diagnostics(), settings);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"diagnostics":{"timings":{"confirm_ms":100}}}"#).unwrap();

        let store = SettingsStore::new(path).unwrap();
        let settings = store.diagnostics();
        assert_eq!(settings.timings.confirm_ms, 100);
        assert_eq!(settings.timings.analysis_ms, 5000);
        assert_eq!(settings.max_scan_attempts, Some(10));
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.diagnostics(), DiagnosticSettings::default());
    }

    #[test]
    fn probability_is_clamped() {
        let settings = DiagnosticSettings {
            deny_reroll_probability: 3.0,
            max_scan_attempts: Some(0),
            ..DiagnosticSettings::default()
        }
        .sanitized();
        assert_eq!(settings.deny_reroll_probability, 1.0);
        assert_eq!(settings.max_scan_attempts, Some(1));
    }
}
