//! CalDAV errors

use thiserror::Error;

/// CalDAV client errors
#[derive(Debug, Error)]
pub enum CalDavError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed for {0}")]
    AuthenticationFailed(String),

    #[error("Calendar endpoint not found for {0}.")]
    NotFound(String),

    #[error("Precondition failed for {0}: the event was changed on the server")]
    PreconditionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Request timed out")]
    Timeout,
}

impl CalDavError {
    /// Whether the server reported the resource or collection as missing
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
