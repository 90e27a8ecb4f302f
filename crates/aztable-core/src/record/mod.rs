//! Entity records and table descriptors.
//!
//! A [`Record`] is schema-less: an ordered list of named [`Value`]s plus
//! optional type-tag metadata. Interpretation of the fields is left to the
//! caller.

mod entity;
mod table;
mod value;

pub use entity::{
    PARTITION_KEY, ROW_KEY, Record, TABLE_NAME, TIMESTAMP, TYPE_TAG, is_system_field,
    validate_field_name,
};
pub use table::{Author, TableDescriptor};
pub use value::Value;
