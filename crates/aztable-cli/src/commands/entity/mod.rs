//! Entity subcommand implementations.

mod get;
mod remove;
mod search;
mod set;
mod update;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use aztable_core::{EntityKey, TableName};

use crate::cli::ConnectionArgs;

#[derive(Args, Debug)]
pub struct EntityCommand {
    #[command(subcommand)]
    pub command: EntitySubcommand,
}

#[derive(Subcommand, Debug)]
pub enum EntitySubcommand {
    /// Fetch a single entity by key
    Get(get::GetArgs),

    /// Query entities with filters, projection and paging
    Search(search::SearchArgs),

    /// Insert entities from JSON
    Set(set::SetArgs),

    /// Replace or merge an existing entity
    Update(update::UpdateArgs),

    /// Delete an entity
    Remove(remove::RemoveArgs),
}

pub async fn handle(cmd: EntityCommand, connection: &ConnectionArgs) -> Result<()> {
    let client = connection.client()?;
    match cmd.command {
        EntitySubcommand::Get(args) => get::run(args, &client).await,
        EntitySubcommand::Search(args) => search::run(args, &client).await,
        EntitySubcommand::Set(args) => set::run(args, &client).await,
        EntitySubcommand::Update(args) => update::run(args, &client).await,
        EntitySubcommand::Remove(args) => remove::run(args, &client).await,
    }
}

/// Table and key of a single entity.
#[derive(Args, Debug)]
pub struct EntityAddress {
    /// Table name
    pub table: String,

    /// Partition key
    pub partition: String,

    /// Row key
    pub row: String,
}

impl EntityAddress {
    fn resolve(&self) -> Result<(TableName, EntityKey)> {
        let table = TableName::new(&self.table).context("Invalid table name")?;
        let key = EntityKey::new(&self.partition, &self.row).context("Invalid entity key")?;
        Ok((table, key))
    }
}
