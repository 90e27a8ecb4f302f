//! Query and write descriptions.

use super::{EntityKey, TableName};
use crate::filter::Filter;

/// Page size requested when the caller does not choose one.
pub const DEFAULT_BATCH_SIZE: u32 = 640;

/// How an entity body is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// `POST {table}`: create a new entity.
    Insert,
    /// `PUT {table}(..)`: replace an existing entity.
    Update,
    /// `MERGE {table}(..)`: merge properties into an existing entity.
    Merge,
}

impl WriteMode {
    /// HTTP verb used for this mode.
    pub fn verb(&self) -> &'static str {
        match self {
            WriteMode::Insert => "POST",
            WriteMode::Update => "PUT",
            WriteMode::Merge => "MERGE",
        }
    }

    /// Whether the entry body should carry the entity's id.
    pub fn addresses_entity(&self) -> bool {
        !matches!(self, WriteMode::Insert)
    }
}

/// A description of one entity query.
///
/// # Example
///
/// ```
/// use aztable_core::{Filter, Join, Query, TableName};
///
/// let query = Query::new(TableName::new("Orders").unwrap())
///     .filter(Filter::compile(&["$_.Amount -gt 5"], Join::And).unwrap())
///     .select(["Amount", "Customer"])
///     .batch_size(100)
///     .limit(250);
/// assert_eq!(query.effective_batch_size(), 100);
/// ```
#[derive(Clone, Debug)]
pub struct Query {
    pub table: TableName,
    pub key: Option<EntityKey>,
    pub filter: Option<Filter>,
    pub select: Vec<String>,
    pub order_by: Vec<String>,
    pub batch_size: Option<u32>,
    pub limit: Option<u32>,
    pub include_table_info: bool,
}

impl Query {
    /// Query every entity in `table`.
    pub fn new(table: TableName) -> Self {
        Self {
            table,
            key: None,
            filter: None,
            select: Vec::new(),
            order_by: Vec::new(),
            batch_size: None,
            limit: None,
            include_table_info: true,
        }
    }

    /// Address a single entity by key.
    pub fn key(mut self, key: EntityKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Restrict results with a compiled filter.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Project onto the given properties.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Sort by the given properties.
    pub fn order_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Records requested per page (`$top`).
    pub fn batch_size(mut self, size: u32) -> Self {
        self.batch_size = Some(size);
        self
    }

    /// Stop after this many records in total.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Include `PartitionKey`, `RowKey`, `Timestamp` and `TableName`.
    pub fn include_table_info(mut self, include: bool) -> Self {
        self.include_table_info = include;
        self
    }

    /// Page size after applying the default and the overall limit.
    pub fn effective_batch_size(&self) -> u32 {
        let batch = self.batch_size.filter(|b| *b > 0).unwrap_or(DEFAULT_BATCH_SIZE);
        match self.limit {
            Some(limit) if limit > 0 => batch.min(limit),
            _ => batch,
        }
    }
}
