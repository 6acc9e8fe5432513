//! FIT activity parser
//!
//! Reads the `record` messages of a Garmin FIT file and keeps the timestamp
//! and power fields. Timestamps are expressed in FIT epoch seconds (seconds
//! since 1989-12-31T00:00:00Z), which keeps them well inside 32 bits.

use fitparser::profile::MesgNum;
use fitparser::{FitDataRecord, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{ParseError, Result};
use crate::import::{has_extension, read_error, ActivityParser, RawSeries};

/// Offset between the Unix epoch and the FIT epoch
pub const FIT_EPOCH_OFFSET: i64 = 631_065_600;

/// One `record` message reduced to the two fields an activity needs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordSample {
    /// Unix seconds
    pub timestamp: Option<i64>,
    pub power: Option<i64>,
}

/// FIT file parser
pub struct FitParser;

impl FitParser {
    pub fn new() -> Self {
        Self
    }

    fn read_records(file_path: &Path) -> Result<Vec<FitDataRecord>> {
        let file = File::open(file_path).map_err(|e| read_error(file_path, e))?;
        let mut reader = BufReader::new(file);

        let records = fitparser::from_reader(&mut reader).map_err(|e| {
            ParseError::malformed(file_path, format!("Failed to parse FIT records: {}", e))
        })?;
        Ok(records)
    }

    fn to_sample(record: &FitDataRecord) -> RecordSample {
        let mut sample = RecordSample::default();
        for field in record.fields() {
            match field.name() {
                "timestamp" => {
                    if let Value::Timestamp(ts) = field.value() {
                        sample.timestamp = Some(ts.timestamp());
                    }
                }
                "power" => sample.power = fit_value_to_i64(field.value()),
                _ => {}
            }
        }
        sample
    }

    /// Keep the samples carrying both fields, converted to FIT epoch seconds
    ///
    /// Records missing either field are skipped. A file without a single
    /// usable record is malformed.
    pub fn assemble_series(file_path: &Path, samples: &[RecordSample]) -> Result<RawSeries> {
        let mut series = RawSeries::default();
        let mut skipped = 0usize;

        for sample in samples {
            match (sample.timestamp, sample.power) {
                (Some(timestamp), Some(power)) => {
                    series.timestamps.push(timestamp - FIT_EPOCH_OFFSET);
                    series.power.push(power);
                }
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(
                path = %file_path.display(),
                skipped,
                "skipped FIT records without timestamp or power"
            );
        }
        if series.is_empty() {
            return Err(ParseError::malformed(
                file_path,
                "No records with both timestamp and power",
            )
            .into());
        }
        Ok(series)
    }
}

impl Default for FitParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityParser for FitParser {
    fn can_parse(&self, file_path: &Path) -> bool {
        has_extension(file_path, "fit")
    }

    fn parse_file(&self, file_path: &Path) -> Result<RawSeries> {
        let records = Self::read_records(file_path)?;
        debug!(messages = records.len(), "decoded FIT messages");

        let samples: Vec<RecordSample> = records
            .iter()
            .filter(|record| record.kind() == MesgNum::Record)
            .map(Self::to_sample)
            .collect();

        Self::assemble_series(file_path, &samples)
    }

    fn format_name(&self) -> &'static str {
        "FIT"
    }
}

/// Integer view of a numeric FIT field; arrays yield their first number
fn fit_value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::UInt8(v) => Some(*v as i64),
        Value::UInt8z(v) => Some(*v as i64),
        Value::SInt8(v) => Some(*v as i64),
        Value::UInt16(v) => Some(*v as i64),
        Value::UInt16z(v) => Some(*v as i64),
        Value::SInt16(v) => Some(*v as i64),
        Value::UInt32(v) => Some(*v as i64),
        Value::UInt32z(v) => Some(*v as i64),
        Value::SInt32(v) => Some(*v as i64),
        Value::SInt64(v) => Some(*v),
        Value::Float32(v) => Some(v.round() as i64),
        Value::Float64(v) => Some(v.round() as i64),
        Value::Array(values) => values.iter().find_map(fit_value_to_i64),
        _ => None,
    }
}
