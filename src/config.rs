//! Configuration for the emergence detection engine
//!
//! Runtime parameters can be loaded from a JSON file to allow tuning without
//! recompilation: buffer capacity, the assumed noise floor, the description
//! length bound, and the defaults each adaptive threshold record starts from.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Ring buffer capacity in events
    pub buffer_capacity: usize,
    /// Assumed noise floor used for signal-to-noise derivation, in the
    /// absence of a real noise estimator
    pub noise_floor: f64,
    /// Maximum stored description length in characters; longer input is
    /// truncated, never rejected
    pub description_max_len: usize,
    pub thresholds: ThresholdDefaults,
}

/// Initial state for every adaptive threshold record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdDefaults {
    /// Starting threshold, within [min, max]
    pub initial: f64,
    /// Lower adaptation bound
    pub min: f64,
    /// Upper adaptation bound
    pub max: f64,
    /// Feedback step fraction in [0, 1]
    pub adaptation_rate: f64,
    /// Raw-signal multiplier in [0, 1]
    pub sensitivity: f64,
}

impl Default for ThresholdDefaults {
    fn default() -> Self {
        Self {
            initial: 0.5,
            min: 0.1,
            max: 0.9,
            adaptation_rate: 0.1,
            sensitivity: 0.5,
        }
    }
}

impl Default for DetectorConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            buffer_capacity: 256,
            noise_floor: 0.1,
            description_max_len: 256,
            thresholds: ThresholdDefaults::default(),
        }
    }
}

impl DetectorConfig {
    /// Load configuration from a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or the defaults if the file is missing or
    /// the JSON is invalid (logged as a warning, never fatal).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DetectorConfig::default();
        assert_eq!(config.buffer_capacity, 256);
        assert_eq!(config.noise_floor, 0.1);
        assert_eq!(config.description_max_len, 256);
        assert_eq!(config.thresholds.initial, 0.5);
        assert_eq!(config.thresholds.min, 0.1);
        assert_eq!(config.thresholds.max, 0.9);
        assert_eq!(config.thresholds.adaptation_rate, 0.1);
        assert_eq!(config.thresholds.sensitivity, 0.5);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = DetectorConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: DetectorConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.buffer_capacity, config.buffer_capacity);
        assert_eq!(parsed.noise_floor, config.noise_floor);
        assert_eq!(parsed.thresholds.initial, config.thresholds.initial);
        assert_eq!(
            parsed.thresholds.adaptation_rate,
            config.thresholds.adaptation_rate
        );
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = DetectorConfig::load_from_file("/nonexistent/detector_config.json");
        assert_eq!(config.buffer_capacity, DetectorConfig::default().buffer_capacity);
    }
}
