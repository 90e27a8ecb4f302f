//! Field values.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// A single field value.
///
/// Everything travels as a string on the wire. Timestamps are the one type
/// hint the codec understands; a timestamp that fails to parse keeps its
/// raw text and says so, rather than silently turning into plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Plain text.
    Text(String),
    /// A parsed UTC timestamp.
    Timestamp(DateTime<Utc>),
    /// A timestamp field whose text could not be parsed.
    UnparsedTimestamp(String),
}

impl Value {
    /// Parse a timestamp, keeping the raw text on failure.
    pub fn parse_timestamp(raw: &str) -> Self {
        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(ts) => Value::Timestamp(ts.with_timezone(&Utc)),
            Err(_) => Value::UnparsedTimestamp(raw.to_string()),
        }
    }

    /// The text that goes on the wire.
    pub fn to_wire_string(&self) -> Cow<'_, str> {
        match self {
            Value::Text(s) | Value::UnparsedTimestamp(s) => Cow::Borrowed(s),
            Value::Timestamp(ts) => Cow::Owned(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }

    /// Returns the text if this is a plain text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the timestamp if this value parsed as one.
    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire_string())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_wire_string())
    }
}
