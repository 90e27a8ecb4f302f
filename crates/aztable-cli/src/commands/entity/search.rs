//! Search entities command implementation.

use anyhow::{Context, Result};
use clap::Args;
use futures_util::{StreamExt, pin_mut};

use aztable_core::{Cursor, Filter, Join, PageState, Query, TableName, query_pages};
use aztable_rest::TableClient;

use crate::output;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Table name
    pub table: String,

    /// Filter clause such as `$_.Age -gt 5` (repeatable)
    #[arg(long = "where", value_name = "CLAUSE", conflicts_with = "filter")]
    pub clauses: Vec<String>,

    /// Join clauses with `or` instead of `and`
    #[arg(long)]
    pub or: bool,

    /// Filter expression sent to the service unchanged
    #[arg(long)]
    pub filter: Option<String>,

    /// Properties to return (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// Properties to sort by (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub sort: Vec<String>,

    /// Records requested per page
    #[arg(long)]
    pub batch_size: Option<u32>,

    /// Stop after this many records
    #[arg(long)]
    pub first: Option<u32>,

    /// Resume token: next table name
    #[arg(long)]
    pub next_table: Option<String>,

    /// Resume token: next partition key
    #[arg(long)]
    pub next_partition: Option<String>,

    /// Resume token: next row key
    #[arg(long)]
    pub next_row: Option<String>,

    /// Leave out PartitionKey, RowKey, Timestamp and TableName
    #[arg(long)]
    pub exclude_table_info: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl SearchArgs {
    fn query(&self) -> Result<Query> {
        let table = TableName::new(&self.table).context("Invalid table name")?;
        let mut query = Query::new(table)
            .select(self.select.iter().cloned())
            .order_by(self.sort.iter().cloned())
            .include_table_info(!self.exclude_table_info);

        if !self.clauses.is_empty() {
            let join = if self.or { Join::Or } else { Join::And };
            query = query.filter(Filter::compile(&self.clauses, join).context("Invalid filter clause")?);
        } else if let Some(ref raw) = self.filter {
            query = query.filter(Filter::raw(raw.as_str()));
        }
        if let Some(size) = self.batch_size {
            query = query.batch_size(size);
        }
        if let Some(first) = self.first {
            query = query.limit(first);
        }
        Ok(query)
    }

    fn resume(&self) -> Option<Cursor> {
        let cursor = Cursor::new(
            self.next_table.clone(),
            self.next_partition.clone(),
            self.next_row.clone(),
        );
        (!cursor.is_empty()).then_some(cursor)
    }
}

pub async fn run(args: SearchArgs, client: &TableClient) -> Result<()> {
    let query = args.query()?;

    let pages = query_pages(client, &query, args.resume());
    pin_mut!(pages);

    let mut count = 0usize;
    let mut state = PageState::Exhausted;
    while let Some(page) = pages.next().await {
        let page = page.context("Failed to query entities")?;
        for record in &page.records {
            output::record(record, args.pretty)?;
        }
        count += page.records.len();
        state = page.next;
    }

    if count == 0 {
        output::note("No entities found.");
    }

    if let Some(cursor) = state.into_cursor() {
        eprintln!();
        output::field("Next cursor", &serde_json::to_string(&cursor)?);
    }

    Ok(())
}
