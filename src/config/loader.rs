//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config.toml structure.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::domain::controller::ThresholdConfig;

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub threshold: ThresholdSection,
    #[serde(default)]
    pub simulation: SimulationSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Threshold controller configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdSection {
    /// Fixed capacity of the spread sample window
    pub sample_capacity: usize,
    /// Samples required before thresholds are produced
    pub min_samples: usize,
    /// Starting multiplier for the mean + k*std formula
    pub initial_multiplier: f64,
    /// Floor for open + close threshold, in spread percent
    pub min_total_threshold: f64,
    /// Upper clamp for the adaptive multiplier
    pub max_multiplier: f64,
    /// Lower clamp for the adaptive multiplier
    pub min_multiplier: f64,
}

impl ThresholdSection {
    /// Convert into the domain config. Validation happens at controller
    /// construction as well; this keeps file errors and domain errors in
    /// one place at load time.
    pub fn to_threshold_config(&self) -> ThresholdConfig {
        ThresholdConfig {
            sample_capacity: self.sample_capacity,
            min_samples: self.min_samples,
            initial_multiplier: self.initial_multiplier,
            min_total_threshold: self.min_total_threshold,
            max_multiplier: self.max_multiplier,
            min_multiplier: self.min_multiplier,
        }
    }
}

/// Synthetic feed settings for the `simulate` command
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSection {
    /// Number of spread observations to feed
    pub samples: u64,
    /// Call the adjustment entry point every N samples
    pub adjust_interval: u64,
    /// Mean of the synthetic open spread, percent
    pub open_mean: f64,
    /// Standard deviation of the synthetic open spread
    pub open_std: f64,
    /// Mean of the synthetic close spread, percent
    pub close_mean: f64,
    /// Standard deviation of the synthetic close spread
    pub close_std: f64,
    /// RNG seed; omit for a random run
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            samples: 5_000,
            adjust_interval: 50,
            open_mean: 0.012,
            open_std: 0.004,
            close_mean: 0.010,
            close_std: 0.004,
            seed: None,
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Threshold section carries the domain invariants
        self.threshold
            .to_threshold_config()
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        if self.simulation.samples == 0 {
            return Err(ConfigError::ValidationError(
                "simulation.samples must be > 0".to_string(),
            ));
        }

        if self.simulation.adjust_interval == 0 {
            return Err(ConfigError::ValidationError(
                "simulation.adjust_interval must be > 0".to_string(),
            ));
        }

        if self.simulation.open_std < 0.0 || self.simulation.close_std < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "simulation stds must be >= 0, got open {} close {}",
                self.simulation.open_std, self.simulation.close_std
            )));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown logging level '{other}'"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID_TOML: &str = r#"
[threshold]
sample_capacity = 1000
min_samples = 200
initial_multiplier = 1.0
min_total_threshold = 0.02
max_multiplier = 4.0
min_multiplier = 0.25

[simulation]
samples = 2000
adjust_interval = 25
open_mean = 0.012
open_std = 0.004
close_mean = 0.010
close_std = 0.004
seed = 7

[logging]
level = "debug"
"#;

    fn write_temp_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_temp_config(VALID_TOML);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.threshold.sample_capacity, 1000);
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.logging.level, "debug");

        let threshold = config.threshold.to_threshold_config();
        assert_eq!(threshold.min_samples, 200);
        assert!(threshold.validate().is_ok());
    }

    #[test]
    fn test_optional_sections_default() {
        let file = write_temp_config(
            r#"
[threshold]
sample_capacity = 100
min_samples = 20
initial_multiplier = 1.0
min_total_threshold = 0.02
max_multiplier = 4.0
min_multiplier = 0.0
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.simulation.samples, 5_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_threshold_section_rejected() {
        let file = write_temp_config(
            r#"
[threshold]
sample_capacity = 100
min_samples = 200
initial_multiplier = 1.0
min_total_threshold = 0.02
max_multiplier = 4.0
min_multiplier = 0.0
"#,
        );
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_bad_logging_level_rejected() {
        let mut toml = VALID_TOML.replace("\"debug\"", "\"verbose\"");
        toml.push('\n');
        let file = write_temp_config(&toml);
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let file = write_temp_config("[threshold\nsample_capacity = ");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
