//! Game settings
//!
//! Persisted separately from session state in LocalStorage. Everything else a
//! session holds is thrown away on restart.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Misconfigurations detected when settings are put to use.
///
/// These never abort a session: the caller logs them and degrades (fewer
/// options on the grid, no move timer).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid {rows}x{cols} is too small for {options} options")]
    GridTooSmall { rows: usize, cols: usize, options: usize },
    #[error("move interval must be positive, got {0}s")]
    NonPositiveInterval(f64),
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Scored rounds per run
    pub total_rounds: u32,
    /// Grid height in cells
    pub grid_rows: usize,
    /// Grid width in cells
    pub grid_cols: usize,
    /// Options per round (1 target + distractors)
    pub option_count: usize,
    /// Seconds between option relocations
    pub move_interval_secs: f64,
    /// Unscored practice rounds before play
    pub warmup_rounds_total: u32,
    pub warmup_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            total_rounds: 10,
            grid_rows: 4,
            grid_cols: 4,
            option_count: 6,
            move_interval_secs: 2.0,
            warmup_rounds_total: 3,
            warmup_enabled: true,
        }
    }
}

/// Partial settings update; `None` fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub total_rounds: Option<u32>,
    pub grid_rows: Option<usize>,
    pub grid_cols: Option<usize>,
    pub option_count: Option<usize>,
    pub move_interval_secs: Option<f64>,
    pub warmup_rounds_total: Option<u32>,
    pub warmup_enabled: Option<bool>,
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "glyph_hunt_settings";

    /// Shallow merge: every field present in the patch wins
    pub fn merge(&mut self, patch: &SettingsPatch) {
        if let Some(v) = patch.total_rounds {
            self.total_rounds = v;
        }
        if let Some(v) = patch.grid_rows {
            self.grid_rows = v;
        }
        if let Some(v) = patch.grid_cols {
            self.grid_cols = v;
        }
        if let Some(v) = patch.option_count {
            self.option_count = v;
        }
        if let Some(v) = patch.move_interval_secs {
            self.move_interval_secs = v;
        }
        if let Some(v) = patch.warmup_rounds_total {
            self.warmup_rounds_total = v;
        }
        if let Some(v) = patch.warmup_enabled {
            self.warmup_enabled = v;
        }
    }

    /// Total grid cells
    pub fn cell_count(&self) -> usize {
        self.grid_rows * self.grid_cols
    }

    /// Move interval in milliseconds, or an error if the timer can't run
    pub fn move_interval_ms(&self) -> Result<f64, ConfigError> {
        if self.move_interval_secs > 0.0 && self.move_interval_secs.is_finite() {
            Ok(self.move_interval_secs * 1000.0)
        } else {
            Err(ConfigError::NonPositiveInterval(self.move_interval_secs))
        }
    }

    /// Check the grid can hold every option
    pub fn check_grid(&self) -> Result<(), ConfigError> {
        if self.cell_count() < self.option_count {
            return Err(ConfigError::GridTooSmall {
                rows: self.grid_rows,
                cols: self.grid_cols,
                options: self.option_count,
            });
        }
        Ok(())
    }

    /// All configuration problems at once (for a settings screen)
    pub fn check(&self) -> Vec<ConfigError> {
        [self.check_grid().err(), self.move_interval_ms().err()]
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Stored settings unreadable ({e}), using defaults"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Failed to write settings to LocalStorage");
                } else {
                    log::info!("Settings saved");
                }
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_only_touches_present_fields() {
        let mut settings = Settings::default();
        let patch = SettingsPatch {
            option_count: Some(5),
            warmup_enabled: Some(false),
            ..Default::default()
        };
        settings.merge(&patch);

        assert_eq!(settings.option_count, 5);
        assert!(!settings.warmup_enabled);
        assert_eq!(settings.total_rounds, Settings::default().total_rounds);
        assert_eq!(settings.grid_rows, Settings::default().grid_rows);
    }

    #[test]
    fn test_merge_later_patch_wins() {
        let mut settings = Settings::default();
        settings.merge(&SettingsPatch {
            total_rounds: Some(3),
            ..Default::default()
        });
        settings.merge(&SettingsPatch {
            total_rounds: Some(7),
            ..Default::default()
        });
        assert_eq!(settings.total_rounds, 7);
    }

    #[test]
    fn test_patch_from_partial_json() {
        let patch: SettingsPatch = serde_json::from_str(r#"{"grid_rows": 2}"#).unwrap();
        assert_eq!(patch.grid_rows, Some(2));
        assert_eq!(patch.grid_cols, None);
    }

    #[test]
    fn test_old_blob_fills_defaults() {
        let settings = Settings::from_json(r#"{"total_rounds": 4}"#).unwrap();
        assert_eq!(settings.total_rounds, 4);
        assert_eq!(settings.warmup_rounds_total, 3);
        assert!(settings.warmup_enabled);
    }

    #[test]
    fn test_grid_too_small() {
        let settings = Settings {
            grid_rows: 2,
            grid_cols: 2,
            option_count: 5,
            ..Default::default()
        };
        assert_eq!(
            settings.check_grid(),
            Err(ConfigError::GridTooSmall { rows: 2, cols: 2, options: 5 })
        );
        assert!(Settings::default().check_grid().is_ok());
    }

    #[test]
    fn test_move_interval() {
        let mut settings = Settings::default();
        settings.move_interval_secs = 1.5;
        assert_eq!(settings.move_interval_ms(), Ok(1500.0));

        settings.move_interval_secs = 0.0;
        assert!(settings.move_interval_ms().is_err());
        settings.move_interval_secs = -2.0;
        assert_eq!(settings.check().len(), 1);
    }
}
