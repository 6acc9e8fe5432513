//! Power-duration curve computation
//!
//! For every effort length from one second up to the whole activity, the
//! curve holds the best average power sustained over any window of that
//! length. Window sums come from a single prefix-sum table, so each length is
//! one linear scan and lengths are independent of each other. Long activities
//! spread the lengths across the rayon thread pool; the result is identical
//! either way.

use rayon::prelude::*;
use tracing::debug;

use crate::models::PowerProfile;

/// Power-duration curve and power profile calculations
pub struct PowerCurveAnalyzer;

impl PowerCurveAnalyzer {
    /// Best average power for every duration of the activity
    ///
    /// `curve[0]` is the max power and `curve[d]` the best rounded average
    /// over `d + 1` consecutive samples. Empty input gives an empty curve.
    pub fn calculate_power_duration_curve(power_data: &[u16]) -> Vec<u16> {
        let prefix = Self::prefix_sums(power_data);
        (1..=power_data.len())
            .map(|window| Self::best_average(&prefix, window))
            .collect()
    }

    /// Same as [`calculate_power_duration_curve`](Self::calculate_power_duration_curve),
    /// computed on the rayon thread pool once the series reaches `threshold` samples
    pub fn calculate_power_duration_curve_with_threshold(
        power_data: &[u16],
        threshold: usize,
    ) -> Vec<u16> {
        if power_data.len() < threshold {
            return Self::calculate_power_duration_curve(power_data);
        }

        debug!(samples = power_data.len(), "computing power-duration curve in parallel");
        let prefix = Self::prefix_sums(power_data);
        (1..=power_data.len())
            .into_par_iter()
            .map(|window| Self::best_average(&prefix, window))
            .collect()
    }

    /// Sample the curve at fixed reference durations (seconds)
    ///
    /// Durations longer than the activity are left out.
    pub fn calculate_power_profile(curve: &[u16], durations: &[u32]) -> PowerProfile {
        durations
            .iter()
            .filter(|&&duration| duration > 0 && duration as usize <= curve.len())
            .map(|&duration| (duration, curve[duration as usize - 1]))
            .collect()
    }

    fn prefix_sums(power_data: &[u16]) -> Vec<u64> {
        let mut prefix = Vec::with_capacity(power_data.len() + 1);
        prefix.push(0u64);
        let mut running = 0u64;
        for &power in power_data {
            running += power as u64;
            prefix.push(running);
        }
        prefix
    }

    fn best_average(prefix: &[u64], window: usize) -> u16 {
        let samples = prefix.len() - 1;
        let best_sum = (0..=samples - window)
            .map(|start| prefix[start + window] - prefix[start])
            .max()
            .unwrap_or(0);
        (best_sum as f64 / window as f64).round_ties_even() as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Double loop over every window; the reference the prefix-sum version must match
    fn naive_curve(power_data: &[u16]) -> Vec<u16> {
        let n = power_data.len();
        let mut curve = Vec::with_capacity(n);
        for window in 1..=n {
            let mut best = 0u64;
            for start in 0..=n - window {
                let sum: u64 = power_data[start..start + window].iter().map(|&p| p as u64).sum();
                best = best.max(sum);
            }
            curve.push((best as f64 / window as f64).round_ties_even() as u16);
        }
        curve
    }

    #[test]
    fn test_curve_on_pyramid() {
        let power = vec![100, 200, 300, 400, 500, 400, 300, 200, 100];
        let curve = PowerCurveAnalyzer::calculate_power_duration_curve(&power);
        assert_eq!(curve, vec![500, 450, 433, 400, 380, 350, 329, 300, 278]);
    }

    #[test]
    fn test_curve_after_hard_start() {
        let mut power = vec![250u16; 10];
        power.extend([0u16; 5]);
        let curve = PowerCurveAnalyzer::calculate_power_duration_curve(&power);
        assert_eq!(&curve[..10], &[250; 10]);
        assert_eq!(&curve[10..], &[227, 208, 192, 179, 167]);
    }

    #[test]
    fn test_empty_curve() {
        assert!(PowerCurveAnalyzer::calculate_power_duration_curve(&[]).is_empty());
        assert!(PowerCurveAnalyzer::calculate_power_profile(&[], &[5, 60]).is_empty());
    }

    #[test]
    fn test_power_profile_only_includes_reachable_durations() {
        let curve: Vec<u16> = (0..400u16).rev().collect();
        let profile = PowerCurveAnalyzer::calculate_power_profile(&curve, &[5, 60, 300, 1200, 3600]);

        assert_eq!(profile.len(), 3);
        assert_eq!(profile[&5], curve[4]);
        assert_eq!(profile[&60], curve[59]);
        assert_eq!(profile[&300], curve[299]);
        assert!(!profile.contains_key(&1200));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let power: Vec<u16> = (0..1500u32).map(|i| ((i * 37) % 450) as u16).collect();
        let sequential = PowerCurveAnalyzer::calculate_power_duration_curve(&power);
        let parallel = PowerCurveAnalyzer::calculate_power_duration_curve_with_threshold(&power, 1);
        assert_eq!(sequential, parallel);
    }

    proptest! {
        #[test]
        fn test_curve_matches_naive_reference(
            power in prop::collection::vec(0u16..1500u16, 0..120)
        ) {
            let curve = PowerCurveAnalyzer::calculate_power_duration_curve(&power);
            prop_assert_eq!(curve, naive_curve(&power));
        }

        #[test]
        fn test_curve_bounded_by_max_power(
            power in prop::collection::vec(0u16..1500u16, 1..200)
        ) {
            let curve = PowerCurveAnalyzer::calculate_power_duration_curve(&power);
            let max = *power.iter().max().unwrap();
            prop_assert_eq!(curve.len(), power.len());
            prop_assert_eq!(curve[0], max);
            prop_assert!(curve.iter().all(|&value| value <= max));
        }
    }
}
