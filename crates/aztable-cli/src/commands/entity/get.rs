//! Get entity command implementation.

use anyhow::{Context, Result};
use clap::Args;

use aztable_core::TableService;
use aztable_rest::TableClient;

use super::EntityAddress;
use crate::output;

#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub address: EntityAddress,

    /// Leave out PartitionKey, RowKey, Timestamp and TableName
    #[arg(long)]
    pub exclude_table_info: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: GetArgs, client: &TableClient) -> Result<()> {
    let (table, key) = args.address.resolve()?;

    let record = client
        .get_entity(&table, &key, !args.exclude_table_info)
        .await
        .context("Failed to get entity")?;

    match record {
        Some(record) => output::record(&record, args.pretty)?,
        None => output::note(&format!("No entity {} in table {}.", key, table)),
    }

    Ok(())
}
