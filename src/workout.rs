//! Structured workouts
//!
//! A [`Workout`] is an ordered list of [`Block`]s whose powers are fractions
//! of FTP. Given an FTP it is synthesized into a second-by-second
//! [`Activity`] and carries that activity's metrics.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::activity::Activity;
use crate::config::CalculationConfig;
use crate::error::Result;
use crate::import::ImportManager;
use crate::models::Metrics;
use crate::synthesis;

/// One segment of a structured workout
///
/// Power values are fractions of FTP (`1.0` = threshold), durations are
/// whole seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Constant power
    SteadyState { duration: u32, power: f64 },

    /// Linear change from `start_power` to `end_power`
    Ramp {
        duration: u32,
        start_power: f64,
        end_power: f64,
    },

    /// A ramp opening the workout
    Warmup {
        duration: u32,
        start_power: f64,
        end_power: f64,
    },

    /// A ramp closing the workout
    Cooldown {
        duration: u32,
        start_power: f64,
        end_power: f64,
    },

    /// `repeat` cycles of an "on" effort followed by an "off" recovery
    Interval {
        repeat: u32,
        on_duration: u32,
        on_power: f64,
        off_duration: u32,
        off_power: f64,
    },

    /// Unstructured riding; has a duration but no target power
    FreeRide { duration: u32 },
}

impl Block {
    pub fn steady_state(duration: u32, power: f64) -> Self {
        Block::SteadyState { duration, power }
    }

    pub fn ramp(duration: u32, start_power: f64, end_power: f64) -> Self {
        Block::Ramp {
            duration,
            start_power,
            end_power,
        }
    }

    pub fn warmup(duration: u32, start_power: f64, end_power: f64) -> Self {
        Block::Warmup {
            duration,
            start_power,
            end_power,
        }
    }

    pub fn cooldown(duration: u32, start_power: f64, end_power: f64) -> Self {
        Block::Cooldown {
            duration,
            start_power,
            end_power,
        }
    }

    pub fn interval(
        repeat: u32,
        on_duration: u32,
        on_power: f64,
        off_duration: u32,
        off_power: f64,
    ) -> Self {
        Block::Interval {
            repeat,
            on_duration,
            on_power,
            off_duration,
            off_power,
        }
    }

    pub fn free_ride(duration: u32) -> Self {
        Block::FreeRide { duration }
    }

    /// Length of the block in seconds; intervals are `repeat * (on + off)`
    pub fn duration(&self) -> u32 {
        match *self {
            Block::SteadyState { duration, .. }
            | Block::Ramp { duration, .. }
            | Block::Warmup { duration, .. }
            | Block::Cooldown { duration, .. }
            | Block::FreeRide { duration } => duration,
            Block::Interval {
                repeat,
                on_duration,
                off_duration,
                ..
            } => repeat.saturating_mul(on_duration.saturating_add(off_duration)),
        }
    }

    /// Element name used by the ZWO format
    pub fn kind(&self) -> &'static str {
        match self {
            Block::SteadyState { .. } => "SteadyState",
            Block::Ramp { .. } => "Ramp",
            Block::Warmup { .. } => "Warmup",
            Block::Cooldown { .. } => "Cooldown",
            Block::Interval { .. } => "IntervalsT",
            Block::FreeRide { .. } => "FreeRide",
        }
    }
}

/// Structured workout, optionally synthesized at a given FTP
#[derive(Debug, Clone)]
pub struct Workout {
    pub name: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    blocks: Vec<Block>,
    config: CalculationConfig,
    activity: Option<Activity>,
}

impl Workout {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            name: None,
            author: None,
            description: None,
            blocks,
            config: CalculationConfig::default(),
            activity: None,
        }
    }

    /// Read the blocks from a workout file (`.zwo`)
    pub fn from_file(path: &Path) -> Result<Self> {
        ImportManager::new().parse_workout_file(path)
    }

    /// Use `config` for metrics of any later synthesis
    pub fn with_config(mut self, config: CalculationConfig) -> Self {
        self.config = config;
        self
    }

    /// Synthesize at `ftp` and compute the metrics
    pub fn with_ftp(mut self, ftp: u16) -> Result<Self> {
        self.synthesize(ftp)?;
        Ok(self)
    }

    /// Expand the blocks at `ftp` into an activity owned by this workout,
    /// replacing any earlier synthesis
    pub fn synthesize(&mut self, ftp: u16) -> Result<&Activity> {
        let activity = synthesis::synthesize_activity(&self.blocks, ftp, self.config.clone())?;
        let activity: &Activity = self.activity.insert(activity);
        Ok(activity)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn config(&self) -> &CalculationConfig {
        &self.config
    }

    /// Sum of all block durations, free rides included
    pub fn planned_duration(&self) -> u32 {
        self.blocks
            .iter()
            .fold(0u32, |total, block| total.saturating_add(block.duration()))
    }

    /// The synthesized activity, once an FTP has been applied
    pub fn activity(&self) -> Option<&Activity> {
        self.activity.as_ref()
    }

    pub fn ftp(&self) -> Option<u16> {
        self.activity.as_ref().and_then(Activity::ftp)
    }

    pub fn metrics(&self) -> Option<&Metrics> {
        self.activity.as_ref().map(Activity::metrics)
    }
}
