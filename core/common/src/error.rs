//! Common error types for cblite.

use serde_json::Value;
use thiserror::Error;

/// Top-level error type for cblite operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A document payload was not a JSON object.
    ///
    /// Raised before any request is issued; never retried.
    #[error("{}", invalid_kind_message(.kind))]
    InvalidPayloadKind {
        /// Name of the rejected kind (`undefined`, `null`, `number`, ...).
        kind: &'static str,
    },

    /// The server answered with a non-2xx status.
    #[error("Remote error: {status} - {body}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Response body as returned by the server.
        body: Value,
    },

    /// The server locator has not resolved yet.
    #[error("Client is not ready: server location unresolved")]
    NotReady,

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn invalid_kind_message(kind: &str) -> String {
    if kind == "null" {
        "You can't save a null document".to_string()
    } else {
        format!("You can't save this type: {}", kind)
    }
}

impl Error {
    /// HTTP status of a remote error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server body of a remote error, untouched.
    pub fn remote_body(&self) -> Option<&Value> {
        match self {
            Error::Remote { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The `error` code reported by the server (e.g. `not_found`).
    pub fn remote_error_code(&self) -> Option<&str> {
        self.remote_body()
            .and_then(|body| body.get("error"))
            .and_then(Value::as_str)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
