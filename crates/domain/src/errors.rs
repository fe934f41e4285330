//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Calendar id is not a lowercase slug
    #[error("Calendar IDs must match ^[a-z0-9_]+$ (got '{0}')")]
    InvalidCalendarId(String),

    /// Calendar base URL failed validation
    #[error("Calendar URL is invalid: {0}")]
    InvalidCalendarUrl(String),

    /// Event id token does not have the `<calendar>:<token>` shape
    #[error("Event ID must match <calendar>:<token>")]
    MalformedEventId,

    /// Event id token or the href it carries is unusable
    #[error("Event ID is invalid: {0}")]
    InvalidEventId(String),

    /// Unknown IANA timezone name
    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    /// Date/time parsing error
    #[error("Datetime must be ISO-like (YYYY-MM-DDTHH:MM): {0}")]
    InvalidDateTime(String),

    /// Date parsing error
    #[error("Date must be ISO-like (YYYY-MM-DD): {0}")]
    InvalidDate(String),

    /// Recurrence parameters are inconsistent
    #[error("{0}")]
    InvalidRecurrence(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// A resource lies outside the calendar it was addressed through
    #[error("Access denied: {0}")]
    AccessDenied(String),
}

impl DomainError {
    /// Whether this error denies access rather than rejecting input
    #[must_use]
    pub const fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied(_))
    }
}
