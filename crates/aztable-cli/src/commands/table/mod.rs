//! Table subcommand implementations.

mod add;
mod list;
mod remove;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::ConnectionArgs;

#[derive(Args, Debug)]
pub struct TableCommand {
    #[command(subcommand)]
    pub command: TableSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TableSubcommand {
    /// Create a table
    Add(add::AddArgs),

    /// List tables, optionally matching a name or wildcard pattern
    List(list::ListArgs),

    /// Delete a table
    Remove(remove::RemoveArgs),
}

pub async fn handle(cmd: TableCommand, connection: &ConnectionArgs) -> Result<()> {
    let client = connection.client()?;
    match cmd.command {
        TableSubcommand::Add(args) => add::run(args, &client).await,
        TableSubcommand::List(args) => list::run(args, &client).await,
        TableSubcommand::Remove(args) => remove::run(args, &client).await,
    }
}
