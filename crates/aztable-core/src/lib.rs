//! aztable-core - Core types and traits for the aztable table storage client.
//!
//! This crate holds everything that does not touch the network: validated
//! names and keys, the schema-less [`Record`] type, the continuation
//! [`Cursor`], the [`Filter`] compiler and the [`TableService`] trait that
//! transport crates implement.

pub mod credentials;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod record;
pub mod traits;
pub mod types;

pub use credentials::StorageCredentials;
pub use error::Error;
pub use filter::{Filter, Join};
pub use pagination::{QueryOutput, collect_query, query_pages};
pub use record::{Author, Record, TableDescriptor, Value};
pub use traits::{PageStream, TableService};
pub use types::{
    AccountName, Cursor, EntityKey, PageState, Query, QueryPage, ServiceEndpoint, TableName,
    WriteMode,
};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
