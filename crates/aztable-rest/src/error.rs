//! Mapping from HTTP stack errors into the core error taxonomy.

use aztable_core::Error;
use aztable_core::error::TransportError;

/// Classify a reqwest failure as a transport error.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let message = err.to_string();
    let err = if err.is_timeout() {
        TransportError::Timeout { message }
    } else if err.is_connect() {
        TransportError::Connection { message }
    } else {
        TransportError::Http { message }
    };
    Error::Transport(err)
}
