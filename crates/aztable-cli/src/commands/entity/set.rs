//! Set (insert) entities command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::Value;

use aztable_core::record::{PARTITION_KEY, ROW_KEY};
use aztable_core::{EntityKey, Record, TableName, TableService};
use aztable_rest::TableClient;

use crate::commands::{AuthorArgs, read_json};
use crate::output;

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Table name
    pub table: String,

    /// Partition key for entities that carry none
    #[arg(long, default_value = "Default")]
    pub partition: String,

    /// Row key (single entity only)
    #[arg(long, conflicts_with = "start_at_row")]
    pub row: Option<String>,

    /// First row number when numbering rows automatically
    #[arg(long, default_value_t = 0)]
    pub start_at_row: u64,

    /// JSON file with an object or an array of objects (use - for stdin)
    #[arg(long, default_value = "-")]
    pub json: String,

    /// Type name to record on each entity
    #[arg(long)]
    pub type_name: Option<String>,

    #[command(flatten)]
    pub author: AuthorArgs,

    /// Print each stored entity as JSON
    #[arg(long)]
    pub pass_thru: bool,
}

pub async fn run(args: SetArgs, client: &TableClient) -> Result<()> {
    let table = TableName::new(&args.table).context("Invalid table name")?;

    let objects = match read_json(&args.json)? {
        Value::Array(items) => items,
        single => vec![single],
    };
    if args.row.is_some() && objects.len() > 1 {
        bail!("--row can only be used with a single entity; omit it to number rows automatically");
    }

    let author = args.author.to_author();
    let mut next_row = args.start_at_row;

    for object in objects {
        let mut record = Record::try_from(object).context("Invalid entity JSON")?;
        if let Some(ref type_name) = args.type_name {
            record.set_type_names([type_name.as_str()]);
        }

        let partition = record
            .remove(PARTITION_KEY)
            .map(|v| v.to_string())
            .unwrap_or_else(|| args.partition.clone());
        let row = match (record.remove(ROW_KEY), &args.row) {
            (Some(row), _) => row.to_string(),
            (None, Some(row)) => row.clone(),
            (None, None) => {
                let row = next_row.to_string();
                next_row += 1;
                row
            }
        };
        let key = EntityKey::new(partition, row).context("Invalid entity key")?;

        let stored = client
            .insert_entity(&table, &key, &record, author.as_ref())
            .await
            .with_context(|| format!("Failed to insert entity {}", key))?;

        output::success(&format!("Inserted entity {}", key));
        if args.pass_thru {
            output::json(&stored.unwrap_or(record))?;
        }
    }

    Ok(())
}
