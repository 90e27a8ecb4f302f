//! Add table command implementation.

use anyhow::{Context, Result};
use clap::Args;

use aztable_core::{TableName, TableService};
use aztable_rest::TableClient;

use crate::commands::AuthorArgs;
use crate::output;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Name of the table to create
    pub name: String,

    #[command(flatten)]
    pub author: AuthorArgs,

    /// Print the created table as JSON
    #[arg(long)]
    pub pass_thru: bool,
}

pub async fn run(args: AddArgs, client: &TableClient) -> Result<()> {
    let table = TableName::new(&args.name).context("Invalid table name")?;

    let created = client
        .create_table(&table, args.author.to_author().as_ref())
        .await
        .context("Failed to create table")?;

    let Some(descriptor) = created else {
        output::note(&format!("Table {} already exists.", table));
        return Ok(());
    };

    output::success(&format!("Created table {}", descriptor.name));
    output::field("Id", &descriptor.id);

    if args.pass_thru {
        output::json(&descriptor)?;
    }

    Ok(())
}
