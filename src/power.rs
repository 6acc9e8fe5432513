//! Cycling power metric calculators
//!
//! Pure functions over a power series sampled once per second. Each metric
//! whose preconditions are not met (missing FTP, too few samples for the
//! normalized power window, zero denominators) yields a neutral `0` rather
//! than an error. The one exception is [`PowerAnalyzer::calculate_max_power`]:
//! a maximum over nothing is undefined and reported as
//! [`CalculationError::EmptySeries`].

use crate::error::CalculationError;
use crate::models::SessionDuration;

/// Seconds in an hour, the TSS normalization period
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Main power analyzer struct
pub struct PowerAnalyzer;

impl PowerAnalyzer {
    /// Mean of the series, `0.0` for an empty series
    pub fn calculate_average_power(power_data: &[u16]) -> f64 {
        if power_data.is_empty() {
            return 0.0;
        }
        Self::calculate_total_work(power_data) as f64 / power_data.len() as f64
    }

    /// Calculate Normalized Power
    ///
    /// 1. rolling mean over every complete window of `window_size` samples
    /// 2. mean of the 4th powers of those rolling means
    /// 3. 4th root, rounded to whole watts
    ///
    /// Returns `0.0` when the series is shorter than one window.
    pub fn calculate_normalized_power(
        power_data: &[u16],
        window_size: usize,
    ) -> Result<f64, CalculationError> {
        if window_size == 0 {
            return Err(CalculationError::InvalidParameter {
                calculation: "normalized power".to_string(),
                parameter: "window_size".to_string(),
                value: window_size.to_string(),
            });
        }
        if power_data.len() < window_size {
            return Ok(0.0);
        }

        let window_count = power_data.len() - window_size + 1;
        let mut window_sum: u64 = power_data[..window_size].iter().map(|&p| p as u64).sum();
        let mut fourth_power_sum = 0.0f64;

        for start in 0..window_count {
            if start > 0 {
                window_sum += power_data[start + window_size - 1] as u64;
                window_sum -= power_data[start - 1] as u64;
            }
            let rolling_mean = window_sum as f64 / window_size as f64;
            fourth_power_sum += rolling_mean.powf(4.0);
        }

        let avg_fourth_power = fourth_power_sum / window_count as f64;
        Ok(avg_fourth_power.powf(0.25).round_ties_even())
    }

    /// IF = NP / FTP, `0.0` unless both are present and non-zero
    pub fn calculate_intensity_factor(normalized_power: f64, ftp: Option<u16>) -> f64 {
        match ftp {
            Some(ftp) if ftp > 0 && normalized_power > 0.0 => normalized_power / ftp as f64,
            _ => 0.0,
        }
    }

    /// TSS = (NP × IF × duration) / (FTP × 3600) × 100
    ///
    /// `0.0` unless all four inputs are present and non-zero.
    pub fn calculate_training_stress_score(
        normalized_power: f64,
        intensity_factor: f64,
        ftp: Option<u16>,
        duration_seconds: u32,
    ) -> f64 {
        let ftp = match ftp {
            Some(ftp) if ftp > 0 => ftp as f64,
            _ => return 0.0,
        };
        if normalized_power <= 0.0 || intensity_factor <= 0.0 || duration_seconds == 0 {
            return 0.0;
        }

        (normalized_power * intensity_factor * duration_seconds as f64) / (ftp * SECONDS_PER_HOUR)
            * 100.0
    }

    /// Sum of all samples
    pub fn calculate_total_work(power_data: &[u16]) -> u64 {
        power_data.iter().map(|&p| p as u64).sum()
    }

    /// Highest sample; an empty series has no maximum
    pub fn calculate_max_power(power_data: &[u16]) -> Result<u16, CalculationError> {
        power_data
            .iter()
            .copied()
            .max()
            .ok_or_else(|| CalculationError::EmptySeries {
                calculation: "max power".to_string(),
            })
    }

    /// One second per sample; accepts either the timestamp or the power series
    pub fn calculate_duration<T>(samples: &[T]) -> SessionDuration {
        let seconds = u32::try_from(samples.len()).unwrap_or(u32::MAX);
        SessionDuration::from_seconds(seconds)
    }

    /// VI = NP / average power, `0.0` when either is zero
    pub fn calculate_variability_index(normalized_power: f64, average_power: f64) -> f64 {
        if normalized_power <= 0.0 || average_power <= 0.0 {
            return 0.0;
        }
        normalized_power / average_power
    }
}
