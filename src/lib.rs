// Library interface for powerrs: cycling power metrics, power-duration
// curves and structured workout synthesis

pub mod activity;
pub mod athlete;
pub mod config;
pub mod curve;
pub mod error;
pub mod import;
pub mod logging;
pub mod models;
pub mod power;
pub mod synthesis;
pub mod workout;

// Re-export commonly used types for convenience
pub use activity::Activity;
pub use athlete::Athlete;
pub use config::{CalculationConfig, NormalizedPowerConfig};
pub use curve::PowerCurveAnalyzer;
pub use error::{CalculationError, ParseError, PowerRsError, Result, ValidationError};
pub use import::{ImportManager, RawSeries};
pub use logging::{init_logging, LogFormat, LogSettings};
pub use models::{Metrics, PowerProfile, SessionDuration};
pub use power::PowerAnalyzer;
pub use synthesis::{transform_workout_to_activity, WorkoutSynthesizer};
pub use workout::{Block, Workout};
