//! Atom/XML entity codec.
//!
//! Writes are Atom `entry` documents whose `m:properties` block carries the
//! record's fields. Reads accept a single `entry` or a `feed` of them.

mod atom;

pub use atom::{
    ServiceError, decode_entities, decode_error, decode_tables, encode_entity, encode_table,
};

/// Atom syndication namespace.
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
/// Data services namespace (`d:` property elements).
pub const DATA_NS: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices";
/// Data services metadata namespace (`m:properties`).
pub const METADATA_NS: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices/metadata";
