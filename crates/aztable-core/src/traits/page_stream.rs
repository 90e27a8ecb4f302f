//! Page stream trait.

use futures_core::Stream;

use crate::Result;
use crate::types::QueryPage;

/// Stream of query pages, ending after the page that exhausts the query.
pub trait PageStream: Stream<Item = Result<QueryPage>> + Send {}

impl<T> PageStream for T where T: Stream<Item = Result<QueryPage>> + Send {}
