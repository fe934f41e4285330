//! Calendar identifier value object
//!
//! Calendar ids are the keys of the configured calendar map and the prefix of
//! every event id, so they are restricted to a lowercase slug.
//!
//! # Examples
//!
//! ```
//! use domain::CalendarId;
//!
//! let id = CalendarId::new("family").unwrap();
//! assert_eq!(id.as_str(), "family");
//!
//! assert!(CalendarId::new("Family").is_err());
//! assert!(CalendarId::new("work-calendar").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A validated calendar identifier matching `^[a-z0-9_]+$`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarId(String);

impl CalendarId {
    /// Create a new calendar id, validating the slug format
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if Self::is_valid(&id) {
            Ok(Self(id))
        } else {
            Err(DomainError::InvalidCalendarId(id))
        }
    }

    /// Check whether a string is an acceptable calendar id
    #[must_use]
    pub fn is_valid(candidate: &str) -> bool {
        !candidate.is_empty()
            && candidate
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CalendarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CalendarId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for CalendarId {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CalendarId> for String {
    fn from(id: CalendarId) -> Self {
        id.0
    }
}
