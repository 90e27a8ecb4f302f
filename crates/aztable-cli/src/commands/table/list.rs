//! List tables command implementation.

use anyhow::{Context, Result};
use clap::Args;

use aztable_core::TableService;
use aztable_rest::TableClient;

use crate::output;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Table name or wildcard pattern (`*` and `?`), matched case-insensitively
    pub pattern: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: ListArgs, client: &TableClient) -> Result<()> {
    let tables = client.list_tables().await.context("Failed to list tables")?;

    let mut found = false;
    for table in tables
        .iter()
        .filter(|t| args.pattern.as_deref().is_none_or(|p| matches_pattern(p, &t.name)))
    {
        output::record(table, args.pretty)?;
        found = true;
    }

    if !found {
        output::note("No tables found.");
    }

    Ok(())
}

/// Case-insensitive match where `*` is any run and `?` any one character.
fn matches_pattern(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    let name: Vec<char> = name.to_lowercase().chars().collect();

    let (mut p, mut n) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, n));
                p += 1;
            }
            Some(&c) if c == '?' || c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match backtrack {
                Some((star, consumed)) => {
                    p = star + 1;
                    n = consumed + 1;
                    backtrack = Some((star, consumed + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_ignores_case() {
        assert!(matches_pattern("orders", "Orders"));
        assert!(!matches_pattern("orders", "Orders2"));
    }

    #[test]
    fn star_matches_any_run() {
        assert!(matches_pattern("Ord*", "Orders"));
        assert!(matches_pattern("*ers", "Orders"));
        assert!(matches_pattern("O*r*s", "Orders"));
        assert!(matches_pattern("*", "Customers"));
        assert!(!matches_pattern("Cust*", "Orders"));
    }

    #[test]
    fn question_mark_matches_one_character() {
        assert!(matches_pattern("Order?", "Orders"));
        assert!(!matches_pattern("Order?", "Order"));
        assert!(!matches_pattern("Orde?", "Orders"));
    }
}
