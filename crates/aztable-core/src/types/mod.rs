//! Core table storage types.
//!
//! These types enforce protocol invariants at construction time,
//! ensuring invalid names and keys never reach the wire.

mod account;
mod cursor;
mod endpoint;
mod entity_key;
mod query;
mod table_name;

pub use account::AccountName;
pub use cursor::{Cursor, PageState, QueryPage};
pub use endpoint::ServiceEndpoint;
pub use entity_key::EntityKey;
pub use query::{DEFAULT_BATCH_SIZE, Query, WriteMode};
pub use table_name::TableName;
