//! Entity key type.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::TableName;
use crate::error::{Error, InvalidInputError};

/// Maximum size of a partition or row key in bytes.
const MAX_KEY_BYTES: usize = 1024;

/// Key characters escaped in the resource path. `%` must be escaped so a
/// literal `%20` in a key is not read back as a space.
const KEY_PATH_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// The two-part primary key of an entity.
///
/// The partition key groups entities for scale-out; the row key is unique
/// within a partition. Either may be empty, but neither may contain `/`,
/// `\`, `#`, `?` or control characters, since those break the resource path.
///
/// # Example
///
/// ```
/// use aztable_core::{EntityKey, TableName};
///
/// let key = EntityKey::new("P1", "1").unwrap();
/// let table = TableName::new("Orders").unwrap();
/// assert_eq!(key.resource_path(&table), "Orders(PartitionKey='P1',RowKey='1')");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    partition: String,
    row: String,
}

impl EntityKey {
    /// Create a new key, validating both parts.
    pub fn new(partition: impl Into<String>, row: impl Into<String>) -> Result<Self, Error> {
        let partition = partition.into();
        let row = row.into();
        Self::validate("partition key", &partition)?;
        Self::validate("row key", &row)?;
        Ok(Self { partition, row })
    }

    /// Returns the partition key.
    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// Returns the row key.
    pub fn row(&self) -> &str {
        &self.row
    }

    /// Resource path addressing this entity in `table`.
    ///
    /// Single quotes inside a key are doubled, as OData string literals
    /// require, and the result is percent-encoded for the URL path.
    pub fn resource_path(&self, table: &TableName) -> String {
        format!(
            "{}(PartitionKey='{}',RowKey='{}')",
            table,
            path_literal(&self.partition),
            path_literal(&self.row)
        )
    }

    fn validate(which: &'static str, s: &str) -> Result<(), Error> {
        let invalid = |reason: String| -> Error {
            InvalidInputError::Key {
                which,
                value: s.to_string(),
                reason,
            }
            .into()
        };

        if s.len() > MAX_KEY_BYTES {
            return Err(invalid(format!(
                "exceeds maximum size of {} bytes",
                MAX_KEY_BYTES
            )));
        }

        if let Some(c) = s
            .chars()
            .find(|c| matches!(c, '/' | '\\' | '#' | '?') || c.is_control())
        {
            return Err(invalid(format!("contains invalid character {:?}", c)));
        }

        Ok(())
    }
}

fn path_literal(part: &str) -> String {
    utf8_percent_encode(&part.replace('\'', "''"), KEY_PATH_ESCAPE).to_string()
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.partition, self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_key() {
        let key = EntityKey::new("P1", "1").unwrap();
        assert_eq!(key.partition(), "P1");
        assert_eq!(key.row(), "1");
        assert_eq!(key.to_string(), "P1/1");
    }

    #[test]
    fn empty_parts_allowed() {
        assert!(EntityKey::new("", "").is_ok());
    }

    #[test]
    fn invalid_characters() {
        assert!(EntityKey::new("a/b", "1").is_err());
        assert!(EntityKey::new("P1", "a?b").is_err());
        assert!(EntityKey::new("P1", "a#b").is_err());
        assert!(EntityKey::new("a\\b", "1").is_err());
        assert!(EntityKey::new("P1", "line\nbreak").is_err());
    }

    #[test]
    fn too_long() {
        assert!(EntityKey::new("x".repeat(1025), "1").is_err());
    }

    #[test]
    fn resource_path_doubles_quotes() {
        let table = TableName::new("Orders").unwrap();
        let key = EntityKey::new("O'Brien", "1").unwrap();
        assert_eq!(
            key.resource_path(&table),
            "Orders(PartitionKey='O''Brien',RowKey='1')"
        );
    }

    #[test]
    fn resource_path_escapes_percent_and_spaces() {
        let table = TableName::new("Orders").unwrap();
        let key = EntityKey::new("P 1", "a%20b").unwrap();
        assert_eq!(
            key.resource_path(&table),
            "Orders(PartitionKey='P%201',RowKey='a%2520b')"
        );
    }

    #[test]
    fn resource_path_keeps_non_ascii_distinct() {
        let table = TableName::new("Orders").unwrap();
        let key = EntityKey::new("Zürich", "1").unwrap();
        assert_eq!(
            key.resource_path(&table),
            "Orders(PartitionKey='Z%C3%BCrich',RowKey='1')"
        );
    }
}
