//! Calculation configuration
//!
//! Settings are plain values handed to the aggregates explicitly. A TOML file
//! can provide any subset of them:
//!
//! ```toml
//! [calculation]
//! np_window_seconds = 30
//! power_profile_durations = [5, 60, 300, 1200, 3600]
//! parallel_curve_threshold = 3600
//! ```
//!
//! The same file may carry a `[logging]` table, see [`crate::logging`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{PowerRsError, Result};
use crate::import::read_error;

/// Reference durations (seconds) of the power profile: 5s, 1, 5, 20 and 60 min
pub const DEFAULT_PROFILE_DURATIONS: [u32; 5] = [5, 60, 300, 1200, 3600];

/// Largest accepted normalized power window
const MAX_NP_WINDOW_SECONDS: u32 = 3600;

/// Normalized Power calculation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedPowerConfig {
    /// Window size for rolling average (seconds)
    pub window_seconds: u32,
}

impl NormalizedPowerConfig {
    /// Create with default settings (30-second window)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom window size
    pub fn with_window(window_seconds: u32) -> Self {
        Self { window_seconds }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.window_seconds == 0 {
            return Err(PowerRsError::Configuration(
                "Window size must be > 0 seconds".to_string(),
            ));
        }
        if self.window_seconds > MAX_NP_WINDOW_SECONDS {
            return Err(PowerRsError::Configuration(format!(
                "Window size must be <= {} seconds",
                MAX_NP_WINDOW_SECONDS
            )));
        }
        Ok(())
    }
}

impl Default for NormalizedPowerConfig {
    fn default() -> Self {
        Self { window_seconds: 30 }
    }
}

/// Settings for the metric pipeline of an activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationConfig {
    pub normalized_power: NormalizedPowerConfig,

    /// Durations (seconds) reported in the power profile
    pub power_profile_durations: Vec<u32>,

    /// Activities with at least this many samples compute the power-duration
    /// curve on the rayon thread pool
    pub parallel_curve_threshold: usize,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            normalized_power: NormalizedPowerConfig::default(),
            power_profile_durations: DEFAULT_PROFILE_DURATIONS.to_vec(),
            parallel_curve_threshold: default_parallel_threshold(),
        }
    }
}

impl CalculationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the normalized power window
    pub fn with_np_window(mut self, window_seconds: u32) -> Self {
        self.normalized_power = NormalizedPowerConfig::with_window(window_seconds);
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.normalized_power.validate()?;

        if self.power_profile_durations.is_empty() {
            return Err(PowerRsError::Configuration(
                "At least one power profile duration is required".to_string(),
            ));
        }
        if self.power_profile_durations.contains(&0) {
            return Err(PowerRsError::Configuration(
                "Power profile durations must be > 0 seconds".to_string(),
            ));
        }
        if self.parallel_curve_threshold == 0 {
            return Err(PowerRsError::Configuration(
                "Parallel curve threshold must be > 0 samples".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: TomlConfig = toml::from_str(content)
            .map_err(|e| PowerRsError::Configuration(format!("Invalid TOML: {}", e)))?;
        let config = file.calculation.into_config();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| read_error(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Render as a TOML document accepted by [`CalculationConfig::from_toml_str`]
    pub fn to_toml_string(&self) -> Result<String> {
        let file = TomlConfig {
            calculation: CalculationSection {
                np_window_seconds: self.normalized_power.window_seconds,
                power_profile_durations: self.power_profile_durations.clone(),
                parallel_curve_threshold: self.parallel_curve_threshold,
            },
        };
        toml::to_string_pretty(&file)
            .map_err(|e| PowerRsError::Configuration(format!("Cannot serialize config: {}", e)))
    }
}

/// Serializable configuration format for TOML files
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TomlConfig {
    #[serde(default)]
    calculation: CalculationSection,
}

/// Calculation settings section of TOML config
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CalculationSection {
    #[serde(default = "default_np_window")]
    np_window_seconds: u32,

    #[serde(default = "default_profile_durations")]
    power_profile_durations: Vec<u32>,

    #[serde(default = "default_parallel_threshold")]
    parallel_curve_threshold: usize,
}

fn default_np_window() -> u32 {
    30
}

fn default_profile_durations() -> Vec<u32> {
    DEFAULT_PROFILE_DURATIONS.to_vec()
}

fn default_parallel_threshold() -> usize {
    3600
}

impl Default for CalculationSection {
    fn default() -> Self {
        Self {
            np_window_seconds: default_np_window(),
            power_profile_durations: default_profile_durations(),
            parallel_curve_threshold: default_parallel_threshold(),
        }
    }
}

impl CalculationSection {
    fn into_config(self) -> CalculationConfig {
        CalculationConfig {
            normalized_power: NormalizedPowerConfig::with_window(self.np_window_seconds),
            power_profile_durations: self.power_profile_durations,
            parallel_curve_threshold: self.parallel_curve_threshold,
        }
    }
}
