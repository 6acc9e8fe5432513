//! Workout synthesis
//!
//! Expands workout blocks into one power sample per second at a given FTP.
//! Timestamps start at 1 and increase by one per emitted sample. Free rides
//! have no target power and emit nothing, so they are absent from the
//! synthesized series.

use tracing::{debug, trace};

use crate::activity::Activity;
use crate::config::CalculationConfig;
use crate::error::Result;
use crate::workout::{Block, Workout};

/// Second-by-second series produced from workout blocks, not yet validated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesizedSeries {
    pub timestamps: Vec<i64>,
    pub power: Vec<i64>,
}

impl SynthesizedSeries {
    fn push(&mut self, power: i64) {
        let timestamp = self.timestamps.len() as i64 + 1;
        self.timestamps.push(timestamp);
        self.power.push(power);
    }

    pub fn len(&self) -> usize {
        self.power.len()
    }

    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }
}

/// Expands workout blocks into power samples
pub struct WorkoutSynthesizer;

impl WorkoutSynthesizer {
    pub fn synthesize(blocks: &[Block], ftp: u16) -> SynthesizedSeries {
        let capacity = blocks
            .iter()
            .filter(|block| !matches!(block, Block::FreeRide { .. }))
            .map(|block| block.duration() as usize)
            .sum();
        let mut series = SynthesizedSeries {
            timestamps: Vec::with_capacity(capacity),
            power: Vec::with_capacity(capacity),
        };

        for block in blocks {
            trace!(
                kind = block.kind(),
                offset = series.len(),
                seconds = block.duration(),
                "expanding block"
            );
            match *block {
                Block::Ramp {
                    duration,
                    start_power,
                    end_power,
                }
                | Block::Warmup {
                    duration,
                    start_power,
                    end_power,
                }
                | Block::Cooldown {
                    duration,
                    start_power,
                    end_power,
                } => Self::emit_ramp(&mut series, duration, start_power, end_power, ftp),
                Block::SteadyState { duration, power } => {
                    Self::emit_steady(&mut series, duration, power, ftp)
                }
                Block::Interval {
                    repeat,
                    on_duration,
                    on_power,
                    off_duration,
                    off_power,
                } => {
                    for _ in 0..repeat {
                        Self::emit_steady(&mut series, on_duration, on_power, ftp);
                        Self::emit_steady(&mut series, off_duration, off_power, ftp);
                    }
                }
                Block::FreeRide { .. } => {}
            }
        }

        debug!(
            blocks = blocks.len(),
            samples = series.len(),
            ftp,
            "synthesized workout"
        );
        series
    }

    fn emit_steady(series: &mut SynthesizedSeries, duration: u32, fraction: f64, ftp: u16) {
        let watts = to_watts(fraction, ftp);
        for _ in 0..duration {
            series.push(watts);
        }
    }

    /// Sample `i` sits at `start + i * (end - start) / duration`, so the end
    /// fraction itself is never reached
    fn emit_ramp(
        series: &mut SynthesizedSeries,
        duration: u32,
        start: f64,
        end: f64,
        ftp: u16,
    ) {
        if duration == 0 {
            return;
        }
        let increment = (end - start) / duration as f64;
        for i in 0..duration {
            let fraction = start + i as f64 * increment;
            let watts = if fraction > 0.0 { to_watts(fraction, ftp) } else { 0 };
            series.push(watts);
        }
    }
}

/// Rounds half to even
fn to_watts(fraction: f64, ftp: u16) -> i64 {
    (fraction * ftp as f64).round_ties_even() as i64
}

/// Synthesize blocks and build a validated activity with computed metrics
pub(crate) fn synthesize_activity(
    blocks: &[Block],
    ftp: u16,
    config: CalculationConfig,
) -> Result<Activity> {
    let series = WorkoutSynthesizer::synthesize(blocks, ftp);
    Activity::from_series_with_config(series.timestamps, series.power, Some(ftp), config)
}

/// Build an activity from `workout` at `ftp` without touching the workout
pub fn transform_workout_to_activity(workout: &Workout, ftp: u16) -> Result<Activity> {
    synthesize_activity(workout.blocks(), ftp, workout.config().clone())
}
