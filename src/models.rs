use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Best average power (watts) keyed by effort duration in seconds
pub type PowerProfile = BTreeMap<u32, u16>;

/// Length of a session, one sample per second
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDuration {
    /// Number of samples
    pub seconds: u32,

    /// `H:MM:SS`, hours are not wrapped at 24
    #[serde(rename = "hh:mm:ss")]
    pub hh_mm_ss: String,
}

impl SessionDuration {
    pub fn from_seconds(seconds: u32) -> Self {
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        let secs = seconds % 60;
        Self {
            seconds,
            hh_mm_ss: format!("{}:{:02}:{:02}", hours, minutes, secs),
        }
    }
}

impl Default for SessionDuration {
    fn default() -> Self {
        Self::from_seconds(0)
    }
}

impl fmt::Display for SessionDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hh_mm_ss)
    }
}

/// Summary metrics calculated from a power series
///
/// Metrics whose inputs are missing (no FTP, fewer samples than the
/// normalized power window, empty series) stay at zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub duration: SessionDuration,

    /// Mean power in watts
    pub average_power: f64,

    /// 30-second rolling 4th-power mean, rounded to whole watts
    pub normalized_power: f64,

    pub max_power: u16,

    /// Ratio of normalized power to functional threshold power
    pub intensity_factor: f64,

    pub training_stress_score: f64,

    /// Sum of all samples (joules at one sample per second)
    pub total_work: u64,

    /// Ratio of normalized power to average power
    pub variability_index: f64,

    /// `power_duration_curve[d]` is the best average power held for `d + 1` seconds
    pub power_duration_curve: Vec<u16>,

    pub power_profile: PowerProfile,
}

impl Metrics {
    /// Whether any sample contributed to these metrics
    pub fn is_empty(&self) -> bool {
        self.duration.seconds == 0
    }
}
