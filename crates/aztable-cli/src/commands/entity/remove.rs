//! Remove entity command implementation.

use anyhow::{Context, Result};
use clap::Args;

use aztable_core::TableService;
use aztable_rest::TableClient;

use super::EntityAddress;
use crate::output;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub address: EntityAddress,

    /// Skip confirmation prompt
    #[arg(long, short = 'f')]
    pub force: bool,
}

pub async fn run(args: RemoveArgs, client: &TableClient) -> Result<()> {
    let (table, key) = args.address.resolve()?;

    if !args.force && !output::confirm(&format!("This will delete entity {} from {}. Continue?", key, table))? {
        eprintln!("Aborted.");
        return Ok(());
    }

    let removed = client
        .delete_entity(&table, &key)
        .await
        .context("Failed to delete entity")?;

    if removed {
        output::success(&format!("Entity {} removed", key));
    } else {
        output::note(&format!("Entity {} not found.", key));
    }

    Ok(())
}
