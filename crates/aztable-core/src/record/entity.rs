//! The schema-less entity record.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::Value;
use crate::error::{Error, InvalidInputError};

/// Partition key system field.
pub const PARTITION_KEY: &str = "PartitionKey";
/// Row key system field.
pub const ROW_KEY: &str = "RowKey";
/// Server-maintained modification time.
pub const TIMESTAMP: &str = "Timestamp";
/// Table name, injected on decode when table info is requested.
pub const TABLE_NAME: &str = "TableName";
/// Element name carrying type-tag metadata.
pub const TYPE_TAG: &str = "psTypeName";

/// Longest property name the service accepts.
const MAX_FIELD_NAME_LEN: usize = 255;

/// Returns true for fields the codec manages rather than the caller.
pub fn is_system_field(name: &str) -> bool {
    matches!(name, PARTITION_KEY | ROW_KEY | TIMESTAMP | TABLE_NAME)
}

/// Check that `name` can be written as a property element.
pub fn validate_field_name(name: &str) -> Result<(), Error> {
    let invalid = |reason: &str| -> Error {
        InvalidInputError::FieldName {
            value: name.to_string(),
            reason: reason.to_string(),
        }
        .into()
    };

    if name.is_empty() {
        return Err(invalid("cannot be empty"));
    }
    if name.len() > MAX_FIELD_NAME_LEN {
        return Err(invalid("exceeds maximum length of 255 characters"));
    }
    if !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return Err(invalid("must start with a letter or underscore"));
    }
    if let Some(c) = name.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
        return Err(invalid(&format!("contains invalid character '{}'", c)));
    }
    Ok(())
}

/// An entity: ordered named values plus optional type names.
///
/// Field names are unique; inserting an existing name replaces the value
/// in place and keeps its position.
///
/// # Example
///
/// ```
/// use aztable_core::Record;
///
/// let mut record = Record::new();
/// record.insert("Amount", "9.99");
/// record.insert("Customer", "Contoso");
/// record.insert("Amount", "10.49");
///
/// assert_eq!(record.get_str("Amount"), Some("10.49"));
/// assert_eq!(record.field_names().collect::<Vec<_>>(), ["Amount", "Customer"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    type_names: Vec<String>,
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Get a field's value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get a plain text field.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(index).1)
    }

    /// Returns true if the field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The record's type names, most specific first.
    pub fn type_names(&self) -> &[String] {
        &self.type_names
    }

    /// Replace the type names.
    pub fn set_type_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_names = names
            .into_iter()
            .map(Into::into)
            .filter(|n: &String| !n.is_empty())
            .collect();
    }

    /// The partition key field, if present.
    pub fn partition_key(&self) -> Option<&str> {
        self.get_str(PARTITION_KEY)
    }

    /// The row key field, if present.
    pub fn row_key(&self) -> Option<&str> {
        self.get_str(ROW_KEY)
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl TryFrom<serde_json::Value> for Record {
    type Error = Error;

    /// Convert a JSON object into a record.
    ///
    /// Scalars are stored as their JSON text, `null` fields are skipped,
    /// nested arrays and objects are stored as compact JSON, and a
    /// `psTypeName` (or `$type`) member becomes the type names.
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value as Json;

        let Json::Object(map) = value else {
            return Err(InvalidInputError::Other {
                message: "record must be a JSON object".to_string(),
            }
            .into());
        };

        let mut record = Record::new();
        for (name, value) in map {
            if name == TYPE_TAG || name == "$type" {
                match value {
                    Json::String(s) => record.set_type_names(s.split(',')),
                    Json::Array(items) => {
                        record.set_type_names(items.iter().filter_map(|i| i.as_str()))
                    }
                    _ => {}
                }
                continue;
            }

            let text = match value {
                Json::Null => continue,
                Json::String(s) => s,
                Json::Bool(b) => b.to_string(),
                Json::Number(n) => n.to_string(),
                nested => nested.to_string(),
            };
            record.insert(name, text);
        }
        Ok(record)
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let tagged = !self.type_names.is_empty();
        let mut map = serializer.serialize_map(Some(self.fields.len() + tagged as usize))?;
        if tagged {
            map.serialize_entry(TYPE_TAG, &self.type_names.join(","))?;
        }
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
