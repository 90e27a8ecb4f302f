//! Subcommand implementations.

pub mod entity;
pub mod table;

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use aztable_core::Author;

/// Author annotation for written entries.
#[derive(Args, Debug, Default)]
pub struct AuthorArgs {
    /// Author name to record on the entry
    #[arg(long)]
    pub author: Option<String>,

    /// Author email
    #[arg(long, requires = "author")]
    pub email: Option<String>,
}

impl AuthorArgs {
    pub fn to_author(&self) -> Option<Author> {
        Author::from_parts(self.author.as_deref(), self.email.as_deref())
    }
}

/// Read JSON from a file, or from stdin when `path` is `-`.
pub fn read_json(path: &str) -> Result<Value> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        serde_json::from_str(&buf).context("Invalid JSON from stdin")
    } else {
        let content = std::fs::read_to_string(path).context("Failed to read JSON file")?;
        serde_json::from_str(&content).context("Invalid JSON in file")
    }
}
