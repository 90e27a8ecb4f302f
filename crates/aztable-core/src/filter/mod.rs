//! Filter expression compiler.
//!
//! Turns shell-style comparison clauses such as `$_.Age -gt 5` into the
//! service's `$filter` syntax (`Age gt '5'`). The accepted grammar is
//! deliberately tiny:
//!
//! ```text
//! clause   := [ "$_" "." ] property operator literal
//! operator := -eq | -ne | -gt | -ge | -lt | -le
//! literal  := number | 'single quoted' | "double quoted, no $"
//! ```
//!
//! Several clauses are combined with one [`Join`]. Any clause outside the
//! grammar fails the whole compilation.

mod lexer;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::CompileError;
use lexer::{Token, tokenize};

/// Longest clause the compiler will tokenize.
pub const MAX_CLAUSE_LEN: usize = 512;

/// Boolean join between clauses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Join {
    #[default]
    And,
    Or,
}

impl Join {
    fn keyword(&self) -> &'static str {
        match self {
            Join::And => "and",
            Join::Or => "or",
        }
    }
}

/// A filter ready to send as `$filter`.
///
/// # Example
///
/// ```
/// use aztable_core::{Filter, Join};
///
/// let filter = Filter::compile(&["$_.Age -gt 5"], Join::And).unwrap();
/// assert_eq!(filter.as_str(), "Age gt '5'");
///
/// let filter = Filter::compile(&["Age -ge 18", "City -eq 'Paris'"], Join::Or).unwrap();
/// assert_eq!(filter.as_str(), "(Age ge '18') or (City eq 'Paris')");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter(String);

impl Filter {
    /// Compile clauses and join them.
    pub fn compile<S: AsRef<str>>(clauses: &[S], join: Join) -> Result<Self, CompileError> {
        if clauses.is_empty() {
            return Err(CompileError::NoClauses);
        }

        let compiled = clauses
            .iter()
            .map(|c| compile_clause(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let filter = if compiled.len() == 1 {
            compiled.into_iter().next().unwrap_or_default()
        } else {
            compiled
                .iter()
                .map(|c| format!("({})", c))
                .collect::<Vec<_>>()
                .join(&format!(" {} ", join.keyword()))
        };

        trace!(%filter, "compiled filter");
        Ok(Self(filter))
    }

    /// Use a filter string written directly in the service syntax.
    pub fn raw(filter: impl Into<String>) -> Self {
        Self(filter.into())
    }

    /// Returns the filter text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map a dash operator to the service keyword.
fn operator_keyword(op: &str) -> Option<&'static str> {
    match op.to_ascii_lowercase().as_str() {
        "-eq" => Some("eq"),
        "-ne" => Some("ne"),
        "-gt" => Some("gt"),
        "-ge" => Some("ge"),
        "-lt" => Some("lt"),
        "-le" => Some("le"),
        _ => None,
    }
}

fn compile_clause(clause: &str) -> Result<String, CompileError> {
    let len = clause.chars().count();
    if len > MAX_CLAUSE_LEN {
        return Err(CompileError::TooLong {
            len,
            max: MAX_CLAUSE_LEN,
        });
    }
    if clause.trim().is_empty() {
        return Err(CompileError::EmptyClause);
    }

    let mut tokens = tokenize(clause)?.into_iter().peekable();

    // Property, optionally written as a member of $_
    let property = match tokens.next() {
        Some(Token::Subject) => {
            match tokens.next() {
                Some(Token::Dot) => {}
                other => return Err(expected_property(other)),
            }
            match tokens.next() {
                Some(Token::Ident(name)) => name,
                other => return Err(expected_property(other)),
            }
        }
        Some(Token::Ident(name)) => name,
        other => return Err(expected_property(other)),
    };

    let keyword = match tokens.next() {
        Some(Token::Operator(op)) => {
            operator_keyword(&op).ok_or(CompileError::InvalidOperator { op })?
        }
        _ => return Err(CompileError::MissingOperator { property }),
    };

    let literal = match tokens.next() {
        Some(Token::Number(n)) => n,
        Some(Token::Literal(s)) => s,
        Some(Token::Expandable(s)) => {
            if s.contains('$') {
                return Err(CompileError::Interpolation { literal: s });
            }
            s
        }
        other => {
            return Err(CompileError::ExpectedLiteral {
                found: describe(other.as_ref()),
            });
        }
    };

    if let Some(extra) = tokens.next() {
        return Err(CompileError::TrailingTokens {
            found: extra.describe(),
        });
    }

    Ok(format!(
        "{} {} '{}'",
        property,
        keyword,
        literal.replace('\'', "''")
    ))
}

fn describe(token: Option<&Token>) -> String {
    token
        .map(Token::describe)
        .unwrap_or_else(|| "end of clause".to_string())
}

fn expected_property(token: Option<Token>) -> CompileError {
    CompileError::ExpectedProperty {
        found: describe(token.as_ref()),
    }
}
