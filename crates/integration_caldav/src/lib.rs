//! CalDAV integration
//!
//! iCalendar reading and writing, calendar-query bodies and a CalDAV client
//! for servers such as Baïkal, Radicale and Nextcloud.

pub mod client;
pub mod error;
pub mod ics;
pub mod query;
pub mod transport;

pub use client::{CalDavClient, WriteCondition};
pub use error::CalDavError;
pub use ics::{EventSource, IcsOptions};
pub use query::{DavResource, build_calendar_query_xml, parse_multistatus};
pub use transport::{CalDavTransport, DavRequest, HttpResult, ReqwestTransport};
