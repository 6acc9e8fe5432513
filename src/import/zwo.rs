//! Zwift workout (.zwo) parser
//!
//! Only direct children of `<workout>` are blocks; anything nested inside a
//! block (text events, cadence hints) is ignored. Durations may be written as
//! decimals and are rounded to whole seconds, half to even.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{ParseError, Result};
use crate::import::{has_extension, read_error, WorkoutParser};
use crate::workout::{Block, Workout};

/// Zwift workout file parser
pub struct ZwoParser;

impl ZwoParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ZwoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkoutParser for ZwoParser {
    fn can_parse(&self, file_path: &Path) -> bool {
        has_extension(file_path, "zwo")
    }

    fn parse_file(&self, file_path: &Path) -> Result<Workout> {
        let bytes = fs::read(file_path).map_err(|e| read_error(file_path, e))?;
        let content = String::from_utf8(bytes).map_err(|e| {
            ParseError::malformed(file_path, format!("File is not valid UTF-8: {}", e))
        })?;
        parse_zwo(file_path, &content)
    }

    fn format_name(&self) -> &'static str {
        "ZWO"
    }
}

/// Parse ZWO XML; `file_path` is only used in error reports
///
/// The document needs a single root element with a `<workout>` child, and
/// every element must be closed.
pub fn parse_zwo(file_path: &Path, content: &str) -> Result<Workout> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    // Names of the currently open elements, root first
    let mut open: Vec<String> = Vec::new();
    let mut name: Option<String> = None;
    let mut author: Option<String> = None;
    let mut description: Option<String> = None;
    let mut blocks = Vec::new();
    let mut seen_root = false;
    let mut seen_workout = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let tag = tag_name(e);
                check_element(file_path, &open, &tag, &mut seen_root, &mut seen_workout)?;
                if is_workout_child(&open) {
                    blocks.push(parse_block(file_path, &tag, e)?);
                }
                open.push(tag);
            }
            Ok(Event::Empty(ref e)) => {
                let tag = tag_name(e);
                check_element(file_path, &open, &tag, &mut seen_root, &mut seen_workout)?;
                if is_workout_child(&open) {
                    blocks.push(parse_block(file_path, &tag, e)?);
                }
            }
            Ok(Event::Text(e)) if open.len() == 2 => {
                let text = e
                    .unescape()
                    .map_err(|e| ParseError::malformed(file_path, e.to_string()))?
                    .to_string();
                match open[1].as_str() {
                    "name" => name = Some(text),
                    "author" => author = Some(text),
                    "description" => description = Some(text),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => {
                open.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ParseError::malformed(
                    file_path,
                    format!("XML parsing error at position {}: {}", reader.buffer_position(), e),
                )
                .into())
            }
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(ParseError::malformed(file_path, "No root element").into());
    }
    if let Some(tag) = open.last() {
        return Err(
            ParseError::malformed(file_path, format!("Unclosed element <{}>", tag)).into(),
        );
    }
    if !seen_workout {
        return Err(ParseError::malformed(file_path, "Missing <workout> element").into());
    }

    let mut workout = Workout::new(blocks);
    workout.name = name;
    workout.author = author;
    workout.description = description;
    Ok(workout)
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

/// Track the root and `<workout>` elements, rejecting a second root
fn check_element(
    file_path: &Path,
    open: &[String],
    tag: &str,
    seen_root: &mut bool,
    seen_workout: &mut bool,
) -> Result<()> {
    match open.len() {
        0 if *seen_root => Err(ParseError::malformed(
            file_path,
            format!("Unexpected second root element <{}>", tag),
        )
        .into()),
        0 => {
            *seen_root = true;
            Ok(())
        }
        1 => {
            *seen_workout |= tag == "workout";
            Ok(())
        }
        _ => Ok(()),
    }
}

fn is_workout_child(open: &[String]) -> bool {
    open.len() == 2 && open[1] == "workout"
}

fn parse_block(file_path: &Path, tag: &str, e: &BytesStart<'_>) -> Result<Block> {
    let attrs = BlockAttributes::read(file_path, tag, e)?;

    let block = match tag {
        "SteadyState" => Block::steady_state(attrs.duration("Duration")?, attrs.power("Power")?),
        "Warmup" => Block::warmup(
            attrs.duration("Duration")?,
            attrs.power("PowerLow")?,
            attrs.power("PowerHigh")?,
        ),
        "Cooldown" => Block::cooldown(
            attrs.duration("Duration")?,
            attrs.power("PowerLow")?,
            attrs.power("PowerHigh")?,
        ),
        "Ramp" => Block::ramp(
            attrs.duration("Duration")?,
            attrs.power("PowerLow")?,
            attrs.power("PowerHigh")?,
        ),
        "IntervalsT" => Block::interval(
            attrs.count("Repeat")?,
            attrs.duration("OnDuration")?,
            attrs.power("OnPower")?,
            attrs.duration("OffDuration")?,
            attrs.power("OffPower")?,
        ),
        "FreeRide" => Block::free_ride(attrs.duration("Duration")?),
        _ => {
            return Err(
                ParseError::malformed(file_path, format!("Unknown block type: {}", tag)).into(),
            )
        }
    };
    Ok(block)
}

/// Attributes of one block element
struct BlockAttributes<'a> {
    file_path: &'a Path,
    tag: &'a str,
    values: HashMap<String, String>,
}

impl<'a> BlockAttributes<'a> {
    fn read(file_path: &'a Path, tag: &'a str, e: &BytesStart<'_>) -> Result<Self> {
        let mut values = HashMap::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| {
                ParseError::malformed(file_path, format!("Bad attribute on {}: {}", tag, err))
            })?;
            values.insert(
                String::from_utf8_lossy(attr.key.as_ref()).to_string(),
                String::from_utf8_lossy(&attr.value).to_string(),
            );
        }
        Ok(Self {
            file_path,
            tag,
            values,
        })
    }

    fn raw(&self, key: &str) -> Result<&str> {
        self.values.get(key).map(String::as_str).ok_or_else(|| {
            ParseError::malformed(
                self.file_path,
                format!("{} is missing the {} attribute", self.tag, key),
            )
            .into()
        })
    }

    fn invalid(&self, key: &str, value: &str) -> ParseError {
        ParseError::malformed(
            self.file_path,
            format!("Invalid {} '{}' on {}", key, value, self.tag),
        )
    }

    /// Seconds, rounded half to even
    fn duration(&self, key: &str) -> Result<u32> {
        let value = self.raw(key)?;
        let seconds = value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|seconds| seconds.is_finite() && *seconds >= 0.0 && *seconds <= u32::MAX as f64)
            .ok_or_else(|| self.invalid(key, value))?;
        Ok(seconds.round_ties_even() as u32)
    }

    /// Fraction of FTP
    fn power(&self, key: &str) -> Result<f64> {
        let value = self.raw(key)?;
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|fraction| fraction.is_finite())
            .ok_or_else(|| self.invalid(key, value).into())
    }

    fn count(&self, key: &str) -> Result<u32> {
        let value = self.raw(key)?;
        value
            .trim()
            .parse::<u32>()
            .map_err(|_| self.invalid(key, value).into())
    }
}
