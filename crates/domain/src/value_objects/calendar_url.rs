//! Calendar collection URL value object
//!
//! A calendar URL is the base of every resource a calendar may touch. Event
//! hrefs coming back from the server or from an event id are resolved against
//! it and rejected when they leave the collection.

use std::fmt;

use url::Url;

use crate::errors::DomainError;
use crate::value_objects::CalendarId;

/// A normalized http(s) calendar collection URL without query or fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarUrl {
    url: Url,
    normalized: String,
}

impl CalendarUrl {
    /// Parse and normalize a calendar URL
    ///
    /// Trailing slashes are stripped. Query strings, fragments, embedded
    /// credentials and non-http(s) schemes are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use domain::CalendarUrl;
    ///
    /// let url = CalendarUrl::parse("https://dav.example.com/cal/family/").unwrap();
    /// assert_eq!(url.as_str(), "https://dav.example.com/cal/family");
    /// assert_eq!(url.base_path(), "/cal/family");
    ///
    /// assert!(CalendarUrl::parse("https://dav.example.com/cal?x=1").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidCalendarUrl("URL is empty".to_string()));
        }
        if trimmed.contains(['?', '#']) {
            return Err(DomainError::InvalidCalendarUrl(format!(
                "query strings and fragments are not allowed: {trimmed}"
            )));
        }

        let url = Url::parse(trimmed)
            .map_err(|e| DomainError::InvalidCalendarUrl(format!("{trimmed}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::InvalidCalendarUrl(format!(
                "scheme must be http or https: {trimmed}"
            )));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(DomainError::InvalidCalendarUrl(format!(
                "host is missing: {trimmed}"
            )));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(DomainError::InvalidCalendarUrl(
                "credentials must not be embedded in the URL".to_string(),
            ));
        }

        let normalized = url.as_str().trim_end_matches('/').to_string();
        Ok(Self { url, normalized })
    }

    /// The normalized URL string (no trailing slash)
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// The parsed URL
    pub const fn as_url(&self) -> &Url {
        &self.url
    }

    /// Collection path without a trailing slash (empty for the server root)
    pub fn base_path(&self) -> &str {
        self.url.path().trim_end_matches('/')
    }

    /// Resolve an event href to an absolute resource URL inside this calendar
    ///
    /// Absolute hrefs must share scheme, host and port with the calendar.
    /// Relative hrefs without a leading slash are taken relative to the
    /// collection. Any `..` segment, raw or percent-encoded, and any path
    /// outside the collection is refused.
    pub fn resolve_event(&self, calendar: &CalendarId, href: &str) -> Result<Url, DomainError> {
        let href = href.trim();
        if href.is_empty() || href.contains('\0') {
            return Err(DomainError::InvalidEventId("href is empty".to_string()));
        }

        let path = match Url::parse(href) {
            Ok(absolute) => {
                if !matches!(absolute.scheme(), "http" | "https") {
                    return Err(DomainError::InvalidEventId(format!(
                        "unsupported scheme '{}'",
                        absolute.scheme()
                    )));
                }
                if absolute.scheme() != self.url.scheme()
                    || absolute.host_str() != self.url.host_str()
                    || absolute.port_or_known_default() != self.url.port_or_known_default()
                {
                    return Err(DomainError::InvalidEventId(
                        "href points to a different server".to_string(),
                    ));
                }
                if absolute.query().is_some() || absolute.fragment().is_some() {
                    return Err(DomainError::InvalidEventId(
                        "href must not carry a query or fragment".to_string(),
                    ));
                }
                absolute.path().to_string()
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                if href.contains(['?', '#', '\\']) {
                    return Err(DomainError::InvalidEventId(
                        "href contains reserved characters".to_string(),
                    ));
                }
                if href.starts_with("//") {
                    return Err(DomainError::InvalidEventId(
                        "href points to a different server".to_string(),
                    ));
                }
                if href.starts_with('/') {
                    href.to_string()
                } else {
                    format!("{}/{href}", self.base_path())
                }
            },
            Err(e) => return Err(DomainError::InvalidEventId(e.to_string())),
        };

        let not_owned = || {
            DomainError::AccessDenied(format!("Event does not belong to calendar '{calendar}'"))
        };

        if path.split('/').any(is_dot_segment) {
            return Err(not_owned());
        }

        let base = self.base_path();
        let inside = path
            .strip_prefix(base)
            .is_some_and(|rest| rest.len() > 1 && rest.starts_with('/'));
        if !inside {
            return Err(not_owned());
        }

        let mut resolved = self.url.clone();
        resolved.set_path(&path);
        Ok(resolved)
    }
}

fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == ".." || decoded == "."
}

impl fmt::Display for CalendarUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

impl TryFrom<&str> for CalendarUrl {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
