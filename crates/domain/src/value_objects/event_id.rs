//! Opaque event identifier
//!
//! An event id is `<calendar_id>:<base64url(href)>`. It is opaque to callers
//! but reversible, so a later `edit` or `delete` can find the resource again
//! without any local state.
//!
//! # Examples
//!
//! ```
//! use domain::{CalendarId, EventId};
//!
//! let calendar = CalendarId::new("family").unwrap();
//! let id = EventId::new(calendar, "/dav/cal/family/event-1.ics").unwrap();
//!
//! let parsed = EventId::parse(&id.to_string()).unwrap();
//! assert_eq!(parsed.calendar_id().as_str(), "family");
//! assert_eq!(parsed.href(), "/dav/cal/family/event-1.ics");
//! ```

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use url::Url;

use crate::errors::DomainError;
use crate::value_objects::CalendarId;

/// Identifier of a stored event: owning calendar plus resource href
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventId {
    calendar_id: CalendarId,
    href: String,
}

impl EventId {
    /// Build an event id from a calendar and a resource href
    pub fn new(calendar_id: CalendarId, href: impl Into<String>) -> Result<Self, DomainError> {
        let href = href.into();
        if href.is_empty() {
            return Err(DomainError::InvalidEventId("href is empty".to_string()));
        }
        if href.contains('\0') {
            return Err(DomainError::InvalidEventId(
                "href contains a null byte".to_string(),
            ));
        }
        Ok(Self { calendar_id, href })
    }

    /// Parse an event id token
    ///
    /// The href segment may be padded or unpadded and may use either the
    /// URL-safe or the standard base64 alphabet.
    pub fn parse(token: &str) -> Result<Self, DomainError> {
        let (calendar, encoded) = token
            .trim()
            .split_once(':')
            .ok_or(DomainError::MalformedEventId)?;
        if encoded.is_empty() {
            return Err(DomainError::MalformedEventId);
        }
        let calendar_id = CalendarId::new(calendar).map_err(|_| DomainError::MalformedEventId)?;

        let canonical: String = encoded
            .trim_end_matches('=')
            .chars()
            .map(|c| match c {
                '+' => '-',
                '/' => '_',
                other => other,
            })
            .collect();
        let bytes = URL_SAFE_NO_PAD
            .decode(canonical.as_bytes())
            .map_err(|e| DomainError::InvalidEventId(e.to_string()))?;
        let href = String::from_utf8(bytes)
            .map_err(|_| DomainError::InvalidEventId("href is not UTF-8".to_string()))?;

        Self::new(calendar_id, href)
    }

    /// The owning calendar
    pub const fn calendar_id(&self) -> &CalendarId {
        &self.calendar_id
    }

    /// The resource href this id points at
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Encode as the `<calendar>:<token>` wire form
    #[must_use]
    pub fn token(&self) -> String {
        format!(
            "{}:{}",
            self.calendar_id,
            URL_SAFE_NO_PAD.encode(self.href.as_bytes())
        )
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

impl std::str::FromStr for EventId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Reduce a server-provided href to its path when it is an absolute http(s) URL
///
/// # Examples
///
/// ```
/// use domain::normalize_event_href;
///
/// assert_eq!(
///     normalize_event_href("https://caldav.example.test/family/event-1.ics"),
///     "/family/event-1.ics"
/// );
/// assert_eq!(normalize_event_href("/family/event-1.ics"), "/family/event-1.ics");
/// ```
#[must_use]
pub fn normalize_event_href(href: &str) -> String {
    let trimmed = href.trim();
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url.path().to_string(),
        _ => trimmed.to_string(),
    }
}
