//! Query pagination driver.
//!
//! A [`TableService`] answers one page per call. These helpers walk the
//! continuation cursor until the service reports no more data or the
//! query's limit is reached, and hand back the residual cursor so the
//! caller can resume later.

use tracing::{debug, trace};

use crate::Result;
use crate::record::Record;
use crate::traits::{PageStream, TableService};
use crate::types::{Cursor, PageState, Query, QueryPage};

/// Records gathered by [`collect_query`].
#[derive(Debug, Clone)]
pub struct QueryOutput {
    /// Records in service order.
    pub records: Vec<Record>,
    /// Where the query stands; resume from `next.cursor()` if not exhausted.
    pub next: PageState,
}

/// Run a query to completion or to its limit.
///
/// Each request asks for at most `min(batch, remaining)` records. Records
/// beyond the limit in an over-full page are dropped.
pub async fn collect_query<S>(service: &S, query: &Query, resume: Option<Cursor>) -> Result<QueryOutput>
where
    S: TableService + ?Sized,
{
    let mut pager = Pager::new(query, resume);
    let mut records = Vec::new();

    while let Some((page_query, cursor)) = pager.next_request() {
        let page = service.query_entities(&page_query, &cursor).await?;
        records.extend(pager.accept(page).records);
    }

    debug!(
        table = %query.table,
        count = records.len(),
        exhausted = pager.state.is_exhausted(),
        "query collected"
    );

    Ok(QueryOutput {
        records,
        next: pager.state,
    })
}

/// Stream a query page by page.
///
/// Pages follow the same limit rules as [`collect_query`]. The stream
/// ends after the final page, or after yielding the first error.
pub fn query_pages<'a, S>(
    service: &'a S,
    query: &'a Query,
    resume: Option<Cursor>,
) -> impl PageStream + 'a
where
    S: TableService + ?Sized,
{
    async_stream::stream! {
        let mut pager = Pager::new(query, resume);

        while let Some((page_query, cursor)) = pager.next_request() {
            match service.query_entities(&page_query, &cursor).await {
                Ok(page) => yield Ok(pager.accept(page)),
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    }
}

/// Cursor and limit bookkeeping shared by both drivers.
struct Pager<'a> {
    query: &'a Query,
    state: PageState,
    remaining: Option<u32>,
}

impl<'a> Pager<'a> {
    fn new(query: &'a Query, resume: Option<Cursor>) -> Self {
        Self {
            query,
            state: PageState::start(resume),
            remaining: query.limit.filter(|l| *l > 0),
        }
    }

    /// The next page request, or `None` once exhausted or at the limit.
    fn next_request(&self) -> Option<(Query, Cursor)> {
        if self.remaining == Some(0) {
            return None;
        }
        let PageState::Active(cursor) = &self.state else {
            return None;
        };

        let mut page_query = self.query.clone();
        page_query.limit = self.remaining;
        trace!(
            top = page_query.effective_batch_size(),
            cursor = ?cursor,
            "requesting page"
        );
        Some((page_query, cursor.clone()))
    }

    /// Record a page response, trimming it to the remaining limit.
    fn accept(&mut self, mut page: QueryPage) -> QueryPage {
        if let Some(remaining) = self.remaining.as_mut() {
            let take = (*remaining as usize).min(page.records.len());
            page.records.truncate(take);
            *remaining -= take as u32;
        }
        self.state = page.next.clone();
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use futures_util::StreamExt;
    use std::sync::Mutex;

    use crate::error::{Error, TransportError};
    use crate::record::{Author, TableDescriptor};
    use crate::types::{EntityKey, ServiceEndpoint, TableName, WriteMode};

    /// Serves `rows` in pages, using the row index as the next-row token.
    struct FakeService {
        endpoint: ServiceEndpoint,
        rows: Vec<String>,
        requests: Mutex<Vec<(u32, Cursor)>>,
        fail_at: Option<usize>,
    }

    impl FakeService {
        fn new(count: usize) -> Self {
            Self {
                endpoint: ServiceEndpoint::new("http://localhost:10002/").unwrap(),
                rows: (0..count).map(|i| format!("{:04}", i)).collect(),
                requests: Mutex::new(Vec::new()),
                fail_at: None,
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TableService for FakeService {
        fn endpoint(&self) -> &ServiceEndpoint {
            &self.endpoint
        }

        async fn create_table(
            &self,
            _table: &TableName,
            _author: Option<&Author>,
        ) -> crate::Result<Option<TableDescriptor>> {
            unimplemented!()
        }

        async fn list_tables(&self) -> crate::Result<Vec<TableDescriptor>> {
            unimplemented!()
        }

        async fn delete_table(&self, _table: &TableName) -> crate::Result<bool> {
            unimplemented!()
        }

        async fn get_entity(
            &self,
            _table: &TableName,
            _key: &EntityKey,
            _include_table_info: bool,
        ) -> crate::Result<Option<Record>> {
            unimplemented!()
        }

        async fn query_entities(&self, query: &Query, cursor: &Cursor) -> crate::Result<QueryPage> {
            let top = query.effective_batch_size();
            let index = {
                let mut requests = self.requests.lock().unwrap();
                requests.push((top, cursor.clone()));
                requests.len() - 1
            };
            if self.fail_at == Some(index) {
                return Err(Error::Transport(TransportError::Connection {
                    message: "reset".to_string(),
                }));
            }

            let start = cursor
                .next_row
                .as_deref()
                .map(|r| r.parse::<usize>().unwrap())
                .unwrap_or(0);
            let end = (start + top as usize).min(self.rows.len());
            let records = self.rows[start..end]
                .iter()
                .map(|r| Record::new().with("RowKey", r.as_str()))
                .collect();
            let next = if end < self.rows.len() {
                Cursor::new(None, Some("P".to_string()), Some(end.to_string()))
            } else {
                Cursor::default()
            };
            Ok(QueryPage {
                records,
                next: PageState::after_response(next),
            })
        }

        async fn insert_entity(
            &self,
            _table: &TableName,
            _key: &EntityKey,
            _record: &Record,
            _author: Option<&Author>,
        ) -> crate::Result<Option<Record>> {
            unimplemented!()
        }

        async fn update_or_merge_entity(
            &self,
            _table: &TableName,
            _key: &EntityKey,
            _record: &Record,
            _mode: WriteMode,
            _author: Option<&Author>,
        ) -> crate::Result<()> {
            unimplemented!()
        }

        async fn delete_entity(&self, _table: &TableName, _key: &EntityKey) -> crate::Result<bool> {
            unimplemented!()
        }
    }

    fn query() -> Query {
        Query::new(TableName::new("Orders").unwrap())
    }

    fn row_keys(records: &[Record]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.row_key().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn batch_size_does_not_change_result_set() {
        let service = FakeService::new(25);

        let small = collect_query(&service, &query().batch_size(1), None)
            .await
            .unwrap();
        assert_eq!(service.request_count(), 25);

        let large = collect_query(&service, &query().batch_size(1000), None)
            .await
            .unwrap();

        assert_eq!(small.records.len(), 25);
        assert_eq!(row_keys(&small.records), row_keys(&large.records));
        assert!(small.next.is_exhausted());
        assert!(large.next.is_exhausted());
    }

    #[tokio::test]
    async fn first_request_has_empty_cursor_and_default_top() {
        let service = FakeService::new(3);
        collect_query(&service, &query(), None).await.unwrap();

        let requests = service.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0], (640, Cursor::default()));
    }

    #[tokio::test]
    async fn limit_bounds_requests_and_returns_residual_cursor() {
        let service = FakeService::new(25);
        let output = collect_query(&service, &query().batch_size(10).limit(15), None)
            .await
            .unwrap();

        assert_eq!(output.records.len(), 15);
        let tops: Vec<u32> = service
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|(top, _)| *top)
            .collect();
        assert_eq!(tops, [10, 5]);

        let residual = output.next.into_cursor().unwrap();
        assert_eq!(residual.next_row.as_deref(), Some("15"));
        assert_eq!(residual.next_partition.as_deref(), Some("P"));
    }

    #[tokio::test]
    async fn resume_from_residual_cursor_completes_the_set() {
        let service = FakeService::new(12);
        let first = collect_query(&service, &query().batch_size(5).limit(7), None)
            .await
            .unwrap();
        let rest = collect_query(&service, &query().batch_size(5), first.next.into_cursor())
            .await
            .unwrap();

        let mut all = row_keys(&first.records);
        all.extend(row_keys(&rest.records));
        assert_eq!(all, row_keys(&collect_query(&service, &query(), None).await.unwrap().records));
    }

    #[tokio::test]
    async fn limit_at_exact_end_is_exhausted() {
        let service = FakeService::new(10);
        let output = collect_query(&service, &query().limit(10), None)
            .await
            .unwrap();
        assert_eq!(output.records.len(), 10);
        assert!(output.next.is_exhausted());
    }

    #[tokio::test]
    async fn error_aborts_collection() {
        let mut service = FakeService::new(10);
        service.fail_at = Some(1);
        let err = collect_query(&service, &query().batch_size(3), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn stream_yields_each_page() {
        let service = FakeService::new(7);
        let q = query().batch_size(3);
        let pages: Vec<_> = query_pages(&service, &q, None).collect().await;

        let sizes: Vec<usize> = pages
            .iter()
            .map(|p| p.as_ref().unwrap().records.len())
            .collect();
        assert_eq!(sizes, [3, 3, 1]);
        assert!(pages.last().unwrap().as_ref().unwrap().next.is_exhausted());
    }

    #[tokio::test]
    async fn stream_stops_after_error() {
        let mut service = FakeService::new(10);
        service.fail_at = Some(1);
        let q = query().batch_size(3);
        let pages: Vec<_> = query_pages(&service, &q, None).collect().await;

        assert_eq!(pages.len(), 2);
        assert!(pages[0].is_ok());
        assert!(pages[1].is_err());
    }
}
