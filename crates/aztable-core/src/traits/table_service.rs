//! Table service trait.

use async_trait::async_trait;

use crate::Result;
use crate::record::{Author, Record, TableDescriptor};
use crate::types::{Cursor, EntityKey, Query, QueryPage, ServiceEndpoint, TableName, WriteMode};

/// A table storage service.
///
/// Expected rejections come back as sentinel values rather than errors:
/// creating an existing table yields `None`, deleting a missing table or
/// entity yields `false` and reading a missing entity yields `None`.
#[async_trait]
pub trait TableService: Send + Sync {
    /// Returns the service endpoint for this instance.
    fn endpoint(&self) -> &ServiceEndpoint;

    /// Create a table. Returns `None` if it already exists.
    async fn create_table(
        &self,
        table: &TableName,
        author: Option<&Author>,
    ) -> Result<Option<TableDescriptor>>;

    /// List every table in the account.
    async fn list_tables(&self) -> Result<Vec<TableDescriptor>>;

    /// Delete a table. Returns `false` if it did not exist.
    async fn delete_table(&self, table: &TableName) -> Result<bool>;

    /// Read one entity by key. Returns `None` if it does not exist.
    async fn get_entity(
        &self,
        table: &TableName,
        key: &EntityKey,
        include_table_info: bool,
    ) -> Result<Option<Record>>;

    /// Fetch one page of a query, continuing from `cursor`.
    ///
    /// The page size is the query's effective batch size; the overall
    /// limit is the caller's concern (see [`crate::collect_query`]).
    async fn query_entities(&self, query: &Query, cursor: &Cursor) -> Result<QueryPage>;

    /// Insert a new entity, returning the stored entity when the service
    /// echoes it back.
    async fn insert_entity(
        &self,
        table: &TableName,
        key: &EntityKey,
        record: &Record,
        author: Option<&Author>,
    ) -> Result<Option<Record>>;

    /// Replace ([`WriteMode::Update`]) or merge into ([`WriteMode::Merge`])
    /// an existing entity.
    async fn update_or_merge_entity(
        &self,
        table: &TableName,
        key: &EntityKey,
        record: &Record,
        mode: WriteMode,
        author: Option<&Author>,
    ) -> Result<()>;

    /// Delete an entity. Returns `false` if it did not exist or changed
    /// underneath the request.
    async fn delete_entity(&self, table: &TableName, key: &EntityKey) -> Result<bool>;
}
