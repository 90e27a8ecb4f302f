//! Continuation tokens on the wire.
//!
//! Each cursor field travels in its own response header and comes back as
//! its own query parameter. The fields are never mixed up with each other.

use reqwest::header::HeaderMap;

use aztable_core::Cursor;

/// Response header carrying the next table name.
pub const NEXT_TABLE_HEADER: &str = "x-ms-continuation-NextTableName";
/// Response header carrying the next partition key.
pub const NEXT_PARTITION_HEADER: &str = "x-ms-continuation-NextPartitionKey";
/// Response header carrying the next row key.
pub const NEXT_ROW_HEADER: &str = "x-ms-continuation-NextRowKey";

const NEXT_TABLE_PARAM: &str = "NextTableName";
const NEXT_PARTITION_PARAM: &str = "NextPartitionKey";
const NEXT_ROW_PARAM: &str = "NextRowKey";

/// Read the continuation cursor from response headers.
///
/// Missing, blank and non-text headers all count as absent.
pub fn cursor_from_headers(headers: &HeaderMap) -> Cursor {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Cursor::new(
        read(NEXT_TABLE_HEADER),
        read(NEXT_PARTITION_HEADER),
        read(NEXT_ROW_HEADER),
    )
}

/// Query parameters that resume from `cursor`.
pub(crate) fn cursor_query_pairs(cursor: &Cursor) -> Vec<(&'static str, String)> {
    [
        (NEXT_TABLE_PARAM, &cursor.next_table),
        (NEXT_PARTITION_PARAM, &cursor.next_partition),
        (NEXT_ROW_PARAM, &cursor.next_row),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.clone().map(|v| (name, v)))
    .collect()
}
