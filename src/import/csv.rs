use chrono::{DateTime, NaiveDateTime};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use crate::error::{ParseError, Result};
use crate::import::{has_extension, read_error, ActivityParser, RawSeries};

/// CSV activity parser with flexible column naming
///
/// Needs a header row with one timestamp column and one power column. The
/// timestamp may be whole or fractional seconds or a date-time, which is
/// converted to Unix seconds.
pub struct CsvParser {
    column_mapping: HashMap<String, &'static str>,
}

impl CsvParser {
    pub fn new() -> Self {
        let mut column_mapping = HashMap::new();

        Self::add_mapping(
            &mut column_mapping,
            "timestamp",
            &["timestamp", "time", "elapsed_time"],
        );
        Self::add_mapping(&mut column_mapping, "power", &["power", "watts"]);

        Self { column_mapping }
    }

    fn add_mapping(
        mapping: &mut HashMap<String, &'static str>,
        standard: &'static str,
        variations: &[&str],
    ) {
        for variation in variations {
            mapping.insert(variation.to_lowercase(), standard);
        }
    }

    fn normalize_column_name(&self, name: &str) -> Option<&'static str> {
        let normalized = name.trim().to_lowercase().replace([' ', '-'], "_");
        self.column_mapping.get(&normalized).copied()
    }

    fn parse_timestamp(value: &str) -> Option<i64> {
        let value = value.trim();
        if let Ok(seconds) = value.parse::<i64>() {
            return Some(seconds);
        }
        if let Ok(seconds) = value.parse::<f64>() {
            return Some(seconds.round_ties_even() as i64);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.timestamp());
        }

        let formats = [
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S%.f",
        ];
        formats.iter().find_map(|format| {
            NaiveDateTime::parse_from_str(value, format)
                .ok()
                .map(|naive| naive.and_utc().timestamp())
        })
    }

    fn parse_power(value: &str) -> Option<i64> {
        let value = value.trim();
        value
            .parse::<i64>()
            .ok()
            .or_else(|| value.parse::<f64>().ok().map(|watts| watts.round_ties_even() as i64))
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityParser for CsvParser {
    fn can_parse(&self, file_path: &Path) -> bool {
        has_extension(file_path, "csv")
    }

    fn parse_file(&self, file_path: &Path) -> Result<RawSeries> {
        let file = File::open(file_path).map_err(|e| read_error(file_path, e))?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| ParseError::malformed(file_path, e.to_string()))?
            .clone();

        let mut timestamp_column = None;
        let mut power_column = None;
        for (i, header) in headers.iter().enumerate() {
            match self.normalize_column_name(header) {
                Some("timestamp") if timestamp_column.is_none() => timestamp_column = Some(i),
                Some("power") if power_column.is_none() => power_column = Some(i),
                _ => {}
            }
        }
        let (timestamp_column, power_column) = match (timestamp_column, power_column) {
            (Some(ts), Some(power)) => (ts, power),
            _ => {
                return Err(ParseError::malformed(
                    file_path,
                    "CSV needs a timestamp column and a power column",
                )
                .into())
            }
        };

        let mut series = RawSeries::default();
        for (row, result) in reader.records().enumerate() {
            let record = result.map_err(|e| ParseError::malformed(file_path, e.to_string()))?;
            // Header is line 1
            let line = row + 2;

            let raw_timestamp = record.get(timestamp_column).unwrap_or_default();
            let timestamp = Self::parse_timestamp(raw_timestamp).ok_or_else(|| {
                ParseError::malformed(
                    file_path,
                    format!("Invalid timestamp '{}' on line {}", raw_timestamp, line),
                )
            })?;

            let raw_power = record.get(power_column).unwrap_or_default();
            let power = Self::parse_power(raw_power).ok_or_else(|| {
                ParseError::malformed(
                    file_path,
                    format!("Invalid power '{}' on line {}", raw_power, line),
                )
            })?;

            series.timestamps.push(timestamp);
            series.power.push(power);
        }

        if series.is_empty() {
            return Err(
                ParseError::malformed(file_path, "No rows with timestamp and power").into(),
            );
        }
        Ok(series)
    }

    fn format_name(&self) -> &'static str {
        "CSV"
    }
}
