//! Update entity command implementation.

use anyhow::{Context, Result};
use clap::Args;

use aztable_core::{Record, TableService, WriteMode};
use aztable_rest::TableClient;

use super::EntityAddress;
use crate::commands::{AuthorArgs, read_json};
use crate::output;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub address: EntityAddress,

    /// JSON file with the new properties (use - for stdin)
    #[arg(long, default_value = "-")]
    pub json: String,

    /// Merge into the stored entity instead of replacing it
    #[arg(long)]
    pub merge: bool,

    #[command(flatten)]
    pub author: AuthorArgs,
}

pub async fn run(args: UpdateArgs, client: &TableClient) -> Result<()> {
    let (table, key) = args.address.resolve()?;

    let record = Record::try_from(read_json(&args.json)?).context("Invalid entity JSON")?;
    let mode = if args.merge { WriteMode::Merge } else { WriteMode::Update };

    client
        .update_or_merge_entity(&table, &key, &record, mode, args.author.to_author().as_ref())
        .await
        .context("Failed to update entity")?;

    let verb = if args.merge { "Merged" } else { "Updated" };
    output::success(&format!("{} entity {}", verb, key));

    Ok(())
}
