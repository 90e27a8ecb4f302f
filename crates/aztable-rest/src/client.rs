//! HTTP table service client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::HeaderMap;
use tracing::{debug, instrument, trace};

use aztable_core::error::{ConfigurationError, StatusError};
use aztable_core::types::{PageState, QueryPage, ServiceEndpoint};
use aztable_core::{
    Author, Cursor, EntityKey, Query, Record, Result, StorageCredentials, TableDescriptor,
    TableName, TableService, WriteMode,
};

use crate::auth::SharedKeySigner;
use crate::codec::{decode_entities, decode_error, decode_tables, encode_entity, encode_table};
use crate::continuation::{cursor_from_headers, cursor_query_pairs};
use crate::error::transport_error;
use crate::request::{RequestBuilder, TableRequest};
use crate::retry::RetryPolicy;

/// Resource listing and creating tables.
const TABLES_RESOURCE: &str = "Tables";

/// Configuration for [`TableClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service endpoint; defaults to the account's public endpoint.
    pub endpoint: Option<ServiceEndpoint>,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("aztable/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// A response the caller asked to see, success or an expected rejection.
struct Reply {
    status: u16,
    headers: HeaderMap,
    body: String,
}

/// Table service client speaking the Atom/XML REST protocol.
///
/// Cheap to clone; clones share the HTTP connection pool and signing key.
/// The client keeps no per-query state, so concurrent queries are safe as
/// long as each owns its cursor.
///
/// # Example
///
/// ```no_run
/// use aztable_core::{EntityKey, Record, StorageCredentials, TableName, TableService};
/// use aztable_rest::TableClient;
///
/// # async fn example() -> aztable_core::Result<()> {
/// let creds = StorageCredentials::new("myaccount", "c2VjcmV0")?;
/// let client = TableClient::new(&creds)?;
///
/// let orders = TableName::new("Orders")?;
/// client.create_table(&orders, None).await?;
///
/// let key = EntityKey::new("P1", "1")?;
/// let record = Record::new().with("Amount", "9.99");
/// client.insert_entity(&orders, &key, &record, None).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TableClient {
    http: reqwest::Client,
    builder: Arc<RequestBuilder>,
    retry: RetryPolicy,
}

impl TableClient {
    /// Create a client with the default configuration.
    pub fn new(credentials: &StorageCredentials) -> Result<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the key is not valid base64 or the
    /// HTTP client cannot be built. No request is sent.
    pub fn with_config(credentials: &StorageCredentials, config: ClientConfig) -> Result<Self> {
        let signer = SharedKeySigner::new(credentials)?;
        let endpoint = match config.endpoint {
            Some(endpoint) => endpoint,
            None => ServiceEndpoint::for_account(credentials.account())?,
        };

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigurationError::HttpClient {
                message: e.to_string(),
            })?;

        debug!(endpoint = %endpoint, account = %credentials.account(), "table client ready");

        Ok(Self {
            http,
            builder: Arc::new(RequestBuilder::new(endpoint, signer)),
            retry: config.retry,
        })
    }

    /// Send a request under the retry policy.
    ///
    /// Statuses in `expected` come back as a [`Reply`] rather than an error,
    /// so they are never retried.
    async fn execute(&self, request: &TableRequest, expected: &[u16], context: &str) -> Result<Reply> {
        let what = format!("{} {}", request.verb(), request.resource());
        self.retry
            .run(&what, || self.attempt(request, expected, context))
            .await
    }

    async fn attempt(&self, request: &TableRequest, expected: &[u16], context: &str) -> Result<Reply> {
        let http_request = self.builder.build(&self.http, request, Utc::now())?;
        debug!(verb = request.verb(), url = %http_request.url(), "sending request");

        let response = self
            .http
            .execute(http_request)
            .await
            .map_err(transport_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(transport_error)?;
        trace!(status = %status, body = %body, "response");

        if status.is_success() || expected.contains(&status.as_u16()) {
            return Ok(Reply {
                status: status.as_u16(),
                headers,
                body,
            });
        }

        Err(status_error(status.as_u16(), &body, context))
    }
}

#[async_trait]
impl TableService for TableClient {
    fn endpoint(&self) -> &ServiceEndpoint {
        self.builder.endpoint()
    }

    #[instrument(skip_all, fields(table = %table))]
    async fn create_table(
        &self,
        table: &TableName,
        author: Option<&Author>,
    ) -> Result<Option<TableDescriptor>> {
        let body = encode_table(table, author, Utc::now())?;
        let request = TableRequest::table("POST", TABLES_RESOURCE).body(body);
        let reply = self
            .execute(&request, &[409], &format!("Table: {}", table))
            .await?;

        if reply.status == 409 {
            debug!("table already exists");
            return Ok(None);
        }

        let created = decode_tables(&reply.body)?.into_iter().next();
        Ok(Some(created.unwrap_or_else(|| TableDescriptor {
            name: table.to_string(),
            id: self
                .endpoint()
                .resource_url(&format!("{}('{}')", TABLES_RESOURCE, table)),
            updated: None,
        })))
    }

    #[instrument(skip(self))]
    async fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        let mut tables = Vec::new();
        let mut cursor = Cursor::default();

        loop {
            let mut request = TableRequest::table("GET", TABLES_RESOURCE);
            for (name, value) in cursor_query_pairs(&cursor) {
                request = request.query(name, value);
            }

            let reply = self.execute(&request, &[404], "Tables").await?;
            if reply.status == 404 {
                debug!("no tables");
                break;
            }

            tables.extend(decode_tables(&reply.body)?);
            cursor = cursor_from_headers(&reply.headers);
            if cursor.is_empty() {
                break;
            }
            trace!(?cursor, "listing more tables");
        }

        debug!(count = tables.len(), "listed tables");
        Ok(tables)
    }

    #[instrument(skip_all, fields(table = %table))]
    async fn delete_table(&self, table: &TableName) -> Result<bool> {
        let request = TableRequest::table("DELETE", format!("{}('{}')", TABLES_RESOURCE, table));
        let reply = self
            .execute(&request, &[404, 409], &format!("Table: {}", table))
            .await?;

        let deleted = !matches!(reply.status, 404 | 409);
        debug!(deleted, "delete table");
        Ok(deleted)
    }

    #[instrument(skip_all, fields(table = %table, key = %key))]
    async fn get_entity(
        &self,
        table: &TableName,
        key: &EntityKey,
        include_table_info: bool,
    ) -> Result<Option<Record>> {
        let request = TableRequest::entity("GET", key.resource_path(table));
        let reply = self
            .execute(&request, &[404], &entity_context(table, key))
            .await?;

        if reply.status == 404 {
            debug!("entity not found");
            return Ok(None);
        }
        Ok(decode_entities(&reply.body, table, include_table_info)?
            .into_iter()
            .next())
    }

    #[instrument(skip_all, fields(table = %query.table))]
    async fn query_entities(&self, query: &Query, cursor: &Cursor) -> Result<QueryPage> {
        let resource = match query.key {
            Some(ref key) => key.resource_path(&query.table),
            None => format!("{}()", query.table),
        };

        let mut request = TableRequest::entity("GET", resource);
        if let Some(ref filter) = query.filter {
            request = request.query("$filter", filter.as_str());
        }
        if !query.select.is_empty() {
            request = request.query("$select", query.select.join(","));
        }
        if query.key.is_none() {
            request = request.query("$top", query.effective_batch_size().to_string());
        }
        if !query.order_by.is_empty() {
            request = request.query("$OrderBy", query.order_by.join(","));
        }
        for (name, value) in cursor_query_pairs(cursor) {
            request = request.query(name, value);
        }

        // A missing keyed entity is an empty result, a missing table is not.
        let expected: &[u16] = if query.key.is_some() { &[404] } else { &[] };
        let reply = self
            .execute(&request, expected, &format!("Table: {}", query.table))
            .await?;

        if reply.status == 404 {
            return Ok(QueryPage {
                records: Vec::new(),
                next: PageState::Exhausted,
            });
        }

        let records = decode_entities(&reply.body, &query.table, query.include_table_info)?;
        let next = PageState::after_response(cursor_from_headers(&reply.headers));
        debug!(count = records.len(), exhausted = next.is_exhausted(), "query page");

        Ok(QueryPage { records, next })
    }

    #[instrument(skip_all, fields(table = %table, key = %key))]
    async fn insert_entity(
        &self,
        table: &TableName,
        key: &EntityKey,
        record: &Record,
        author: Option<&Author>,
    ) -> Result<Option<Record>> {
        let body = encode_entity(key, record, None, author, Utc::now())?;
        let request = TableRequest::entity("POST", table.as_str()).body(body);
        let context = entity_context(table, key);
        let reply = self.execute(&request, &[409], &context).await?;

        // The entity already exists; sending it again cannot succeed.
        if reply.status == 409 {
            return Err(status_error(reply.status, &reply.body, &context));
        }

        Ok(decode_entities(&reply.body, table, true)?.into_iter().next())
    }

    #[instrument(skip_all, fields(table = %table, key = %key, mode = ?mode))]
    async fn update_or_merge_entity(
        &self,
        table: &TableName,
        key: &EntityKey,
        record: &Record,
        mode: WriteMode,
        author: Option<&Author>,
    ) -> Result<()> {
        if !mode.addresses_entity() {
            return self
                .insert_entity(table, key, record, author)
                .await
                .map(|_| ());
        }

        let resource = key.resource_path(table);
        let id = self.endpoint().resource_url(&resource);
        let body = encode_entity(key, record, Some(&id), author, Utc::now())?;
        let request = TableRequest::entity(mode.verb(), resource)
            .body(body)
            .if_match("*");
        self.execute(&request, &[], &entity_context(table, key))
            .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(table = %table, key = %key))]
    async fn delete_entity(&self, table: &TableName, key: &EntityKey) -> Result<bool> {
        let request = TableRequest::entity("DELETE", key.resource_path(table)).if_match("*");
        let reply = self
            .execute(&request, &[404, 412], &entity_context(table, key))
            .await?;

        let deleted = !matches!(reply.status, 404 | 412);
        debug!(deleted, "delete entity");
        Ok(deleted)
    }
}

fn status_error(status: u16, body: &str, context: &str) -> aztable_core::Error {
    let detail = decode_error(body);
    StatusError::new(status, detail.code, detail.message, context).into()
}

fn entity_context(table: &TableName, key: &EntityKey) -> String {
    format!("Table: {}, Entity: {}", table, key)
}
