//! Error types for the aztable client.
//!
//! This module provides a unified error type with explicit variants for
//! configuration, transport, protocol, filter compilation and input
//! validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for aztable operations.
///
/// Callers can match on the variant to decide whether a failure is worth
/// retrying, was caused by bad input, or came back from the service.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed account, key or endpoint.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Network transport errors (connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-success responses and undecodable bodies.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Filter expression rejected by the compiler.
    #[error("filter compile error: {0}")]
    Compile(#[from] CompileError),

    /// Input validation errors (table names, keys, field names).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns the HTTP status code if this is a status error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Protocol(ProtocolError::Status(status)) => Some(status.status),
            _ => None,
        }
    }

    /// Returns true if the status code is one of `codes`.
    pub fn has_status(&self, codes: &[u16]) -> bool {
        self.status().is_some_and(|s| codes.contains(&s))
    }

    /// Whether the retry executor may try the request again.
    ///
    /// Only transport failures and status errors qualify. Everything else is
    /// deterministic and would fail the same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::Protocol(ProtocolError::Status(_))
        )
    }
}

/// Configuration errors, always raised before any request is sent.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No storage account was provided.
    #[error("a storage account name is required")]
    MissingAccount,

    /// No storage key was provided.
    #[error("a storage key is required")]
    MissingKey,

    /// The storage key is not valid base64.
    #[error("storage key is not valid base64: {reason}")]
    MalformedKey { reason: String },

    /// The service endpoint could not be used.
    #[error("invalid endpoint '{value}': {reason}")]
    Endpoint { value: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {message}")]
    HttpClient { message: String },
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP stack error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Protocol-level errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The service answered with a non-success status.
    #[error("{0}")]
    Status(StatusError),

    /// The response body could not be decoded.
    #[error("malformed response body: {reason}")]
    Decode { reason: String },
}

/// A non-success HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusError {
    /// HTTP status code.
    pub status: u16,
    /// Service error code (if present).
    pub code: Option<String>,
    /// Error message from the service.
    pub message: Option<String>,
    /// What the client was doing, e.g. `Table: Orders`.
    pub context: String,
}

impl StatusError {
    /// Create a new status error.
    pub fn new(
        status: u16,
        code: Option<String>,
        message: Option<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            context: context.into(),
        }
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        if !self.context.is_empty() {
            write!(f, " ({})", self.context)?;
        }
        Ok(())
    }
}

impl From<StatusError> for Error {
    fn from(err: StatusError) -> Self {
        Error::Protocol(ProtocolError::Status(err))
    }
}

/// Filter compilation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// No clauses were given.
    #[error("at least one filter clause is required")]
    NoClauses,

    /// A clause was blank.
    #[error("filter clause is empty")]
    EmptyClause,

    /// A clause exceeded the length bound.
    #[error("will not tokenize filter clauses longer than {max} characters (got {len})")]
    TooLong { len: usize, max: usize },

    /// The clause did not start with a property reference.
    #[error("expected a property name, found '{found}'")]
    ExpectedProperty { found: String },

    /// The property was not followed by a comparison operator.
    #[error("'{property}' must be followed by an operator")]
    MissingOperator { property: String },

    /// The operator is outside the supported set.
    #[error(
        "{op} is not a valid operator. Please use \"-gt\", \"-lt\", \"-ge\", \"-le\", \"-ne\", \"-eq\""
    )]
    InvalidOperator { op: String },

    /// The operator was not followed by a string or number.
    #[error("the operator must be followed by a string or a number, found '{found}'")]
    ExpectedLiteral { found: String },

    /// A double-quoted string tried to expand a variable.
    #[error("variable expansion not allowed in filter clause: {literal}")]
    Interpolation { literal: String },

    /// A string literal was never closed.
    #[error("unterminated string literal starting at offset {offset}")]
    UnterminatedString { offset: usize },

    /// Extra tokens followed a complete comparison.
    #[error("unexpected '{found}' after comparison")]
    TrailingTokens { found: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid account name.
    #[error("invalid account name '{value}': {reason}")]
    AccountName { value: String, reason: String },

    /// Invalid table name.
    #[error("invalid table name '{value}': {reason}")]
    TableName { value: String, reason: String },

    /// Invalid partition or row key.
    #[error("invalid {which} '{value}': {reason}")]
    Key {
        which: &'static str,
        value: String,
        reason: String,
    },

    /// Invalid record field name.
    #[error("invalid field name '{value}': {reason}")]
    FieldName { value: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display_includes_all_parts() {
        let err = StatusError::new(
            409,
            Some("TableAlreadyExists".to_string()),
            Some("The table specified already exists.".to_string()),
            "Table: Orders",
        );
        assert_eq!(
            err.to_string(),
            "HTTP 409 [TableAlreadyExists]: The table specified already exists. (Table: Orders)"
        );
    }

    #[test]
    fn retryable_classification() {
        let status: Error = StatusError::new(500, None, None, "").into();
        assert!(status.is_retryable());
        assert_eq!(status.status(), Some(500));

        let transport: Error = TransportError::Connection {
            message: "refused".to_string(),
        }
        .into();
        assert!(transport.is_retryable());

        let decode: Error = ProtocolError::Decode {
            reason: "bad xml".to_string(),
        }
        .into();
        assert!(!decode.is_retryable());

        let compile: Error = CompileError::NoClauses.into();
        assert!(!compile.is_retryable());

        let config: Error = ConfigurationError::MissingKey.into();
        assert!(!config.is_retryable());
    }

    #[test]
    fn has_status_matches_any_listed_code() {
        let err: Error = StatusError::new(412, None, None, "").into();
        assert!(err.has_status(&[404, 412]));
        assert!(!err.has_status(&[409]));
    }
}
