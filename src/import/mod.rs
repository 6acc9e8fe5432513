//! File import for activities and workouts
//!
//! Activity parsers turn a recorded file into raw timestamp and power series,
//! which the [`Activity`](crate::Activity) constructors validate. Workout
//! parsers turn a structured workout file into a [`Workout`]. The
//! [`ImportManager`] picks the parser from the file extension.

use std::io;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ParseError, Result};
use crate::workout::Workout;

pub mod csv;
pub mod fit;
pub mod zwo;

/// Timestamp and power series as read from a file, not yet validated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSeries {
    pub timestamps: Vec<i64>,
    pub power: Vec<i64>,
}

impl RawSeries {
    pub fn len(&self) -> usize {
        self.power.len()
    }

    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }
}

/// Reads recorded activity files
pub trait ActivityParser {
    /// Check if this parser can handle the given file
    fn can_parse(&self, file_path: &Path) -> bool;

    /// Read the timestamp and power series
    fn parse_file(&self, file_path: &Path) -> Result<RawSeries>;

    fn format_name(&self) -> &'static str;
}

/// Reads structured workout files
pub trait WorkoutParser {
    fn can_parse(&self, file_path: &Path) -> bool;

    /// Read the workout blocks
    fn parse_file(&self, file_path: &Path) -> Result<Workout>;

    fn format_name(&self) -> &'static str;
}

/// Manager for coordinating the activity and workout parsers
pub struct ImportManager {
    activity_parsers: Vec<Box<dyn ActivityParser>>,
    workout_parsers: Vec<Box<dyn WorkoutParser>>,
}

impl ImportManager {
    /// Create a new import manager with all available parsers
    pub fn new() -> Self {
        let activity_parsers: Vec<Box<dyn ActivityParser>> = vec![
            Box::new(fit::FitParser::new()),
            Box::new(csv::CsvParser::new()),
        ];
        let workout_parsers: Vec<Box<dyn WorkoutParser>> = vec![Box::new(zwo::ZwoParser::new())];

        Self {
            activity_parsers,
            workout_parsers,
        }
    }

    /// Parse an activity file, picking the parser from the extension
    pub fn parse_activity_file(&self, file_path: &Path) -> Result<RawSeries> {
        let parser = self
            .activity_parsers
            .iter()
            .find(|parser| parser.can_parse(file_path))
            .ok_or_else(|| unsupported(file_path))?;
        ensure_exists(file_path)?;

        info!(
            path = %file_path.display(),
            format = parser.format_name(),
            "parsing activity file"
        );
        let series = parser.parse_file(file_path)?;
        debug!(samples = series.len(), "activity file parsed");
        Ok(series)
    }

    /// Parse a workout file, picking the parser from the extension
    pub fn parse_workout_file(&self, file_path: &Path) -> Result<Workout> {
        let parser = self
            .workout_parsers
            .iter()
            .find(|parser| parser.can_parse(file_path))
            .ok_or_else(|| unsupported(file_path))?;
        ensure_exists(file_path)?;

        info!(
            path = %file_path.display(),
            format = parser.format_name(),
            "parsing workout file"
        );
        let workout = parser.parse_file(file_path)?;
        debug!(blocks = workout.blocks().len(), "workout file parsed");
        Ok(workout)
    }

    /// Check if any parser handles the given file
    pub fn can_import_file(&self, file_path: &Path) -> bool {
        self.activity_parsers.iter().any(|parser| parser.can_parse(file_path))
            || self.workout_parsers.iter().any(|parser| parser.can_parse(file_path))
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower-cased extension of `file_path`, empty when there is none
pub(crate) fn extension(file_path: &Path) -> String {
    file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default()
}

pub(crate) fn has_extension(file_path: &Path, wanted: &str) -> bool {
    extension(file_path) == wanted
}

fn unsupported(file_path: &Path) -> ParseError {
    ParseError::UnsupportedFormat {
        format: extension(file_path),
    }
}

pub(crate) fn ensure_exists(file_path: &Path) -> std::result::Result<(), ParseError> {
    if file_path.is_file() {
        Ok(())
    } else {
        Err(ParseError::FileNotFound {
            path: file_path.to_path_buf(),
        })
    }
}

/// Map a failure to open or read `file_path`
///
/// Only a missing file is `FileNotFound`. Anything else on a file that
/// exists (permissions, a directory, undecodable bytes) is malformed input.
pub(crate) fn read_error(file_path: &Path, err: io::Error) -> ParseError {
    match err.kind() {
        io::ErrorKind::NotFound => ParseError::FileNotFound {
            path: file_path.to_path_buf(),
        },
        _ => ParseError::malformed(file_path, format!("Failed to read file: {}", err)),
    }
}
