use crate::error::{BookingError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandOp {
    Reserve,
    Cancel,
    Proof,
    Sweep,
}

/// One row of a booking script.
///
/// `start` is required for `reserve`; `image`/`note` feed `proof`
/// submissions. Empty trailing fields deserialize as `None`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Command {
    pub op: CommandOp,
    pub requester: String,
    #[serde(default, deserialize_with = "optional_datetime")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub note: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn optional_datetime<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<DateTime<Utc>>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Reads booking commands from a CSV source.
///
/// Wraps `csv::Reader` and provides an iterator over `Result<Command>`,
/// trimming whitespace and accepting flexible record lengths so scripts can
/// omit trailing fields.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes commands, so
    /// large scripts stream without loading everything into memory.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(BookingError::from))
    }
}
