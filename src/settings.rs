//! Session tunables
//!
//! Multiplayer-lobby style multipliers plus session defaults, stored as JSON
//! by the host. Anything that fails to parse falls back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Multiplier on clamped elapsed time
    pub game_speed: f32,
    /// Divides the regular enemy spawn interval
    pub spawn_rate: f32,
    /// Scales the health-pack drop chance
    pub powerup_freq: f32,
    /// Lives at session start
    pub starting_lives: u32,
    /// Cadence of position broadcasts while multiplayer is enabled
    pub broadcast_interval_ms: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game_speed: 1.0,
            spawn_rate: 1.0,
            powerup_freq: 1.0,
            starting_lives: 4,
            broadcast_interval_ms: 50.0,
        }
    }
}

impl Settings {
    /// Parse settings, sanitizing out-of-range values
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, using defaults if missing or invalid
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("Using default settings ({}: {})", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Invalid settings in {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Replace non-positive or non-finite values with their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let fields = [
            ("game_speed", &mut self.game_speed, defaults.game_speed),
            ("spawn_rate", &mut self.spawn_rate, defaults.spawn_rate),
            ("powerup_freq", &mut self.powerup_freq, defaults.powerup_freq),
            (
                "broadcast_interval_ms",
                &mut self.broadcast_interval_ms,
                defaults.broadcast_interval_ms,
            ),
        ];
        for (name, value, default) in fields {
            if !value.is_finite() || *value <= 0.0 {
                log::warn!("Setting {} = {} is invalid, using {}", name, value, default);
                *value = default;
            }
        }
        if self.starting_lives == 0 {
            log::warn!("Setting starting_lives = 0 is invalid, using {}", defaults.starting_lives);
            self.starting_lives = defaults.starting_lives;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{"spawn_rate": 2.0}"#).unwrap();
        assert_eq!(settings.spawn_rate, 2.0);
        assert_eq!(settings.starting_lives, 4);
        assert_eq!(settings.game_speed, 1.0);
    }

    #[test]
    fn test_sanitize_bad_values() {
        let settings = Settings::from_json(
            r#"{"game_speed": -1.0, "powerup_freq": 0.0, "starting_lives": 0}"#,
        )
        .unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load("/nonexistent/nova-strike/settings.json");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_roundtrip() {
        let settings = Settings {
            game_speed: 1.5,
            ..Default::default()
        };
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }
}
