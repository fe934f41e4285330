//! Calendar port for application layer
//!
//! Defines the interface for reading and writing events on one calendar
//! collection. Implemented by the CalDAV adapter in the infrastructure layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{CalendarEvent, CalendarProfile, EventPatch, StoredEvent};
use thiserror::Error;
use url::Url;

/// Calendar port errors
#[derive(Debug, Error)]
pub enum CalendarError {
    /// The resource or collection does not exist
    #[error("{0}")]
    NotFound(String),

    /// The server rejected the configured credentials
    #[error("{0}")]
    AuthenticationFailed(String),

    /// A conditional write lost against a concurrent change
    #[error("{0}")]
    Conflict(String),

    /// Connection problems, timeouts and unexpected statuses
    #[error("{0}")]
    Unavailable(String),

    /// The server answered with data that could not be read
    #[error("{0}")]
    InvalidResponse(String),

    /// The addressed resource holds no usable event
    #[error("{0}")]
    InvalidEvent(String),
}

/// Precondition attached to an event write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WritePrecondition {
    /// Only succeed if no resource exists yet
    CreateOnly,
    /// Only succeed if the stored resource still has this entity tag
    IfMatch(String),
    /// Overwrite whatever is stored
    Unconditional,
}

/// Calendar port trait
///
/// All operations address a single calendar profile; resource URLs have
/// already been resolved and checked against the profile's collection.
#[async_trait]
pub trait CalendarPort: Send + Sync {
    /// Events overlapping `[start, end)`, recurring events expanded
    async fn query_events(
        &self,
        profile: &CalendarProfile,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError>;

    /// The resource at `url` with its master event and entity tag
    async fn fetch_event(
        &self,
        profile: &CalendarProfile,
        url: &Url,
    ) -> Result<StoredEvent, CalendarError>;

    /// Store a new `event` at `url`
    ///
    /// `stamp` becomes the event's DTSTAMP. Returns the new entity tag when
    /// the server reports one.
    async fn put_event(
        &self,
        profile: &CalendarProfile,
        url: &Url,
        event: &CalendarEvent,
        precondition: WritePrecondition,
        stamp: DateTime<Utc>,
    ) -> Result<Option<String>, CalendarError>;

    /// Rewrite the fetched resource with `patch` applied and store it at `url`
    ///
    /// Properties and components the patch does not name are kept as
    /// stored. Returns the new entity tag when the server reports one.
    async fn update_event(
        &self,
        profile: &CalendarProfile,
        url: &Url,
        stored: &StoredEvent,
        patch: &EventPatch,
        precondition: WritePrecondition,
        stamp: DateTime<Utc>,
    ) -> Result<Option<String>, CalendarError>;

    /// Remove the resource at `url`
    async fn delete_event(&self, profile: &CalendarProfile, url: &Url)
    -> Result<(), CalendarError>;
}
