//! Tokenizer for filter clauses.

use crate::error::CompileError;

/// A lexical token in a filter clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// The pipeline subject `$_`.
    Subject,
    /// Any other `$name` variable reference.
    Variable(String),
    /// Member access `.`.
    Dot,
    /// A bare identifier.
    Ident(String),
    /// A dash operator such as `-eq`.
    Operator(String),
    /// A numeric literal, kept as written.
    Number(String),
    /// A single-quoted string; contents are literal.
    Literal(String),
    /// A double-quoted string; contents would be expanded by a shell.
    Expandable(String),
    /// Anything else.
    Other(char),
}

impl Token {
    /// How the token looked in the source, for error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Subject => "$_".to_string(),
            Token::Variable(name) => format!("${}", name),
            Token::Dot => ".".to_string(),
            Token::Ident(s) | Token::Operator(s) | Token::Number(s) => s.clone(),
            Token::Literal(s) => format!("'{}'", s),
            Token::Expandable(s) => format!("\"{}\"", s),
            Token::Other(c) => c.to_string(),
        }
    }
}

/// Split a clause into tokens.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, CompileError> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match c {
            '$' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && is_ident_char(chars[end].1) {
                    end += 1;
                }
                let name: String = chars[start..end].iter().map(|(_, c)| c).collect();
                tokens.push(if name == "_" {
                    Token::Subject
                } else {
                    Token::Variable(name)
                });
                i = end;
            }
            '.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            '-' if peek(&chars, i + 1).is_some_and(|c| c.is_ascii_alphabetic()) => {
                let mut end = i + 1;
                while end < chars.len() && chars[end].1.is_ascii_alphabetic() {
                    end += 1;
                }
                tokens.push(Token::Operator(
                    chars[i..end].iter().map(|(_, c)| c).collect(),
                ));
                i = end;
            }
            '0'..='9' => {
                let (number, end) = scan_number(&chars, i);
                tokens.push(Token::Number(number));
                i = end;
            }
            '-' if peek(&chars, i + 1).is_some_and(|c| c.is_ascii_digit()) => {
                let (number, end) = scan_number(&chars, i);
                tokens.push(Token::Number(number));
                i = end;
            }
            '\'' | '"' => {
                let (text, end) = scan_string(&chars, i, c).ok_or(
                    CompileError::UnterminatedString { offset },
                )?;
                tokens.push(if c == '\'' {
                    Token::Literal(text)
                } else {
                    Token::Expandable(text)
                });
                i = end;
            }
            c if is_ident_start(c) => {
                let mut end = i + 1;
                while end < chars.len() && is_ident_char(chars[end].1) {
                    end += 1;
                }
                tokens.push(Token::Ident(chars[i..end].iter().map(|(_, c)| c).collect()));
                i = end;
            }
            other => {
                tokens.push(Token::Other(other));
                i += 1;
            }
        }
    }

    Ok(tokens)
}

fn peek(chars: &[(usize, char)], i: usize) -> Option<char> {
    chars.get(i).map(|(_, c)| *c)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Scan `-?digits(.digits)?` starting at `start`.
fn scan_number(chars: &[(usize, char)], start: usize) -> (String, usize) {
    let mut end = start;
    if chars[end].1 == '-' {
        end += 1;
    }
    while end < chars.len() && chars[end].1.is_ascii_digit() {
        end += 1;
    }
    if peek(chars, end) == Some('.') && peek(chars, end + 1).is_some_and(|c| c.is_ascii_digit()) {
        end += 1;
        while end < chars.len() && chars[end].1.is_ascii_digit() {
            end += 1;
        }
    }
    (chars[start..end].iter().map(|(_, c)| c).collect(), end)
}

/// Scan a quoted string; a doubled quote inside stands for one quote.
fn scan_string(chars: &[(usize, char)], start: usize, quote: char) -> Option<(String, usize)> {
    let mut text = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i].1;
        if c == quote {
            if peek(chars, i + 1) == Some(quote) {
                text.push(quote);
                i += 2;
                continue;
            }
            return Some((text, i + 1));
        }
        text.push(c);
        i += 1;
    }
    None
}
