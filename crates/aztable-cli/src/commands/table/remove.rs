//! Remove table command implementation.

use anyhow::{Context, Result};
use clap::Args;

use aztable_core::{TableName, TableService};
use aztable_rest::TableClient;

use crate::output;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Name of the table to delete
    pub name: String,

    /// Skip confirmation prompt
    #[arg(long, short = 'f')]
    pub force: bool,
}

pub async fn run(args: RemoveArgs, client: &TableClient) -> Result<()> {
    let table = TableName::new(&args.name).context("Invalid table name")?;

    if !args.force
        && !output::confirm(&format!("This will delete table {} and all its entities. Continue?", table))?
    {
        eprintln!("Aborted.");
        return Ok(());
    }

    let removed = client
        .delete_table(&table)
        .await
        .context("Failed to delete table")?;

    if removed {
        output::success(&format!("Table {} removed", table));
    } else {
        output::note(&format!("Table {} not found or already being deleted.", table));
    }

    Ok(())
}
