//! aztable-rest - SharedKey-signed REST transport for table storage.
//!
//! [`TableClient`] implements [`aztable_core::TableService`] over HTTP:
//! each call is lowered into a [`TableRequest`], signed, sent through the
//! [`RetryPolicy`] and decoded from Atom XML.

pub mod auth;
pub mod codec;
mod client;
mod continuation;
mod error;
mod request;
mod retry;

pub use client::{ClientConfig, TableClient};
pub use continuation::{
    NEXT_PARTITION_HEADER, NEXT_ROW_HEADER, NEXT_TABLE_HEADER, cursor_from_headers,
};
pub use request::{RequestBuilder, TableRequest};
pub use retry::RetryPolicy;
