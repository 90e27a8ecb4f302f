//! Continuation cursor and page state.

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Continuation tokens for a truncated query.
///
/// The three fields are independent: each one comes from its own response
/// header and is echoed back as its own query parameter. A cursor is opaque
/// to callers, who should only hand it back unchanged to resume a query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_partition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_row: Option<String>,
}

impl Cursor {
    /// Build a cursor from raw token values; blank values count as absent.
    pub fn new(
        next_table: Option<String>,
        next_partition: Option<String>,
        next_row: Option<String>,
    ) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self {
            next_table: keep(next_table),
            next_partition: keep(next_partition),
            next_row: keep(next_row),
        }
    }

    /// Returns true when no continuation token is set.
    pub fn is_empty(&self) -> bool {
        self.next_table.is_none() && self.next_partition.is_none() && self.next_row.is_none()
    }
}

/// Where a paged query stands after a response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageState {
    /// More data may follow; send this cursor with the next request.
    Active(Cursor),
    /// The server reported no further data.
    Exhausted,
}

impl PageState {
    /// Initial state for a query, optionally resuming from a cursor.
    pub fn start(resume: Option<Cursor>) -> Self {
        PageState::Active(resume.unwrap_or_default())
    }

    /// State after a response carrying `cursor`.
    pub fn after_response(cursor: Cursor) -> Self {
        if cursor.is_empty() {
            PageState::Exhausted
        } else {
            PageState::Active(cursor)
        }
    }

    /// Returns true once the query is finished.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, PageState::Exhausted)
    }

    /// The cursor to resume from, if any.
    ///
    /// Returns `None` both when exhausted and for an empty initial cursor.
    pub fn cursor(&self) -> Option<&Cursor> {
        match self {
            PageState::Active(cursor) if !cursor.is_empty() => Some(cursor),
            _ => None,
        }
    }

    /// Consume into the resumable cursor, if any.
    pub fn into_cursor(self) -> Option<Cursor> {
        match self {
            PageState::Active(cursor) if !cursor.is_empty() => Some(cursor),
            _ => None,
        }
    }
}

/// One page of query results.
#[derive(Clone, Debug)]
pub struct QueryPage {
    /// The records in this page.
    pub records: Vec<Record>,
    /// State to continue from.
    pub next: PageState,
}
