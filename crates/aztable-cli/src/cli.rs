//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

use crate::commands::entity::EntityCommand;
use crate::commands::table::TableCommand;

/// Table storage CLI tool.
#[derive(Parser, Debug)]
#[command(name = "aztable")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to connect and how to sign.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Storage account name
    #[arg(short, long, env = "AZTABLE_ACCOUNT", global = true)]
    pub account: Option<String>,

    /// Base64 account key
    #[arg(short, long, env = "AZTABLE_KEY", hide_env_values = true, global = true)]
    pub key: Option<String>,

    /// Service endpoint (defaults to the account's public endpoint)
    #[arg(long, env = "AZTABLE_ENDPOINT", global = true)]
    pub endpoint: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Table operations
    Table(TableCommand),

    /// Entity operations
    Entity(EntityCommand),
}
