//! Error types for the core library.

use thiserror::Error;

/// Core library error type.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The request never produced an HTTP response (connect, TLS, timeout).
    #[error("HTTP transport error: {0}")]
    Http(String),

    /// Graph answered with a non-success status.
    ///
    /// The message is the bare reason phrase so callers matching on text see
    /// exactly what the server reported.
    #[error("{reason}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// Reason phrase of the status code.
        reason: String,
    },

    /// A response that was successful but not shaped as expected.
    #[error("API error: {0}")]
    Api(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;
