//! Table name type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated table name.
///
/// Table names are 3 to 63 ASCII alphanumerics and must start with a
/// letter. `tables` is reserved by the service. The service compares names
/// case-insensitively but preserves the case they were created with.
///
/// # Example
///
/// ```
/// use aztable_core::TableName;
///
/// let table = TableName::new("Orders").unwrap();
/// assert_eq!(table.as_str(), "Orders");
/// assert!(TableName::new("1Orders").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    /// Create a new table name, validating the format.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the table name string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison, the way the service matches names.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }

    fn validate(s: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::TableName {
                value: s.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if s.len() < 3 || s.len() > 63 {
            return Err(invalid("must be between 3 and 63 characters"));
        }

        if !s.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(invalid("must start with a letter"));
        }

        if let Some(c) = s.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(invalid(&format!("contains invalid character '{}'", c)));
        }

        if s.eq_ignore_ascii_case("tables") {
            return Err(invalid("'tables' is reserved"));
        }

        Ok(())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TableName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TableName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<TableName> for String {
    fn from(name: TableName) -> Self {
        name.0
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
