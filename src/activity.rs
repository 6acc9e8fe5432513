//! Activity aggregate
//!
//! An [`Activity`] owns a validated timestamp series, the matching power
//! series, an optional FTP and the [`Metrics`] computed from them. Every
//! constructor validates the raw series before any metric is computed and
//! returns no activity at all when validation fails.

use std::path::Path;
use tracing::debug;

use crate::config::CalculationConfig;
use crate::curve::PowerCurveAnalyzer;
use crate::error::{Result, ValidationError};
use crate::import::ImportManager;
use crate::models::Metrics;
use crate::power::PowerAnalyzer;
use crate::synthesis;
use crate::workout::Workout;

#[derive(Debug, Clone)]
pub struct Activity {
    timestamps: Vec<u32>,
    power: Vec<u16>,
    ftp: Option<u16>,
    config: CalculationConfig,
    metrics: Metrics,
}

impl Activity {
    /// Build from raw series with the default calculation settings
    pub fn from_series(timestamps: Vec<i64>, power: Vec<i64>, ftp: Option<u16>) -> Result<Self> {
        Self::from_series_with_config(timestamps, power, ftp, CalculationConfig::default())
    }

    pub fn from_series_with_config(
        timestamps: Vec<i64>,
        power: Vec<i64>,
        ftp: Option<u16>,
        config: CalculationConfig,
    ) -> Result<Self> {
        config.validate()?;
        let (timestamps, power) = validate_series(&timestamps, &power)?;

        let mut activity = Self {
            timestamps,
            power,
            ftp,
            config,
            metrics: Metrics::default(),
        };
        activity.compute()?;
        Ok(activity)
    }

    /// Parse an activity file (`.fit`, `.csv`)
    pub fn from_file(path: &Path, ftp: Option<u16>) -> Result<Self> {
        Self::from_file_with_config(path, ftp, CalculationConfig::default())
    }

    pub fn from_file_with_config(
        path: &Path,
        ftp: Option<u16>,
        config: CalculationConfig,
    ) -> Result<Self> {
        let series = ImportManager::new().parse_activity_file(path)?;
        Self::from_series_with_config(series.timestamps, series.power, ftp, config)
    }

    /// Synthesize `workout` at `ftp`
    pub fn from_workout(workout: &Workout, ftp: u16) -> Result<Self> {
        synthesis::transform_workout_to_activity(workout, ftp)
    }

    /// Recompute every metric from the current series and FTP
    ///
    /// Runs in dependency order: duration, average power, normalized power,
    /// max power, intensity factor, training stress score, total work,
    /// variability index, power-duration curve, power profile.
    pub fn compute(&mut self) -> Result<&Metrics> {
        if self.power.is_empty() {
            debug!("empty activity, metrics left at zero");
            self.metrics = Metrics::default();
            return Ok(&self.metrics);
        }

        let power = &self.power;
        let duration = PowerAnalyzer::calculate_duration(&self.timestamps);
        let average_power = PowerAnalyzer::calculate_average_power(power);
        let normalized_power = PowerAnalyzer::calculate_normalized_power(
            power,
            self.config.normalized_power.window_seconds as usize,
        )?;
        let max_power = PowerAnalyzer::calculate_max_power(power)?;
        let intensity_factor = PowerAnalyzer::calculate_intensity_factor(normalized_power, self.ftp);
        let training_stress_score = PowerAnalyzer::calculate_training_stress_score(
            normalized_power,
            intensity_factor,
            self.ftp,
            duration.seconds,
        );
        let total_work = PowerAnalyzer::calculate_total_work(power);
        let variability_index =
            PowerAnalyzer::calculate_variability_index(normalized_power, average_power);
        let power_duration_curve = PowerCurveAnalyzer::calculate_power_duration_curve_with_threshold(
            power,
            self.config.parallel_curve_threshold,
        );
        let power_profile = PowerCurveAnalyzer::calculate_power_profile(
            &power_duration_curve,
            &self.config.power_profile_durations,
        );

        debug!(
            seconds = duration.seconds,
            average_power,
            normalized_power,
            ftp = ?self.ftp,
            "computed activity metrics"
        );

        self.metrics = Metrics {
            duration,
            average_power,
            normalized_power,
            max_power,
            intensity_factor,
            training_stress_score,
            total_work,
            variability_index,
            power_duration_curve,
            power_profile,
        };
        Ok(&self.metrics)
    }

    /// Change the FTP; metrics are stale until [`compute`](Self::compute) runs
    pub fn set_ftp(&mut self, ftp: Option<u16>) {
        self.ftp = ftp;
    }

    pub fn timestamps(&self) -> &[u32] {
        &self.timestamps
    }

    pub fn power(&self) -> &[u16] {
        &self.power
    }

    pub fn ftp(&self) -> Option<u16> {
        self.ftp
    }

    pub fn config(&self) -> &CalculationConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Check every timestamp, then every power sample, then the lengths
///
/// Timestamps must be positive, fit in 32 bits and strictly increase.
fn validate_series(
    timestamps: &[i64],
    power: &[i64],
) -> std::result::Result<(Vec<u32>, Vec<u16>), ValidationError> {
    let timestamps = timestamps
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            if value <= 0 {
                return Err(ValidationError::NonPositiveTimestamp { index, value });
            }
            u32::try_from(value).map_err(|_| ValidationError::TimestampOutOfRange { index, value })
        })
        .collect::<std::result::Result<Vec<u32>, _>>()?;

    if let Some(index) = timestamps.windows(2).position(|pair| pair[1] <= pair[0]) {
        return Err(ValidationError::NonIncreasingTimestamp {
            index: index + 1,
            previous: timestamps[index] as i64,
            value: timestamps[index + 1] as i64,
        });
    }

    let power = power
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            if value < 0 {
                return Err(ValidationError::NegativePower { index, value });
            }
            u16::try_from(value).map_err(|_| ValidationError::PowerOutOfRange { index, value })
        })
        .collect::<std::result::Result<Vec<u16>, _>>()?;

    if timestamps.len() != power.len() {
        return Err(ValidationError::LengthMismatch {
            timestamps: timestamps.len(),
            power: power.len(),
        });
    }

    Ok((timestamps, power))
}
