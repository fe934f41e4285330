//! Value Objects - Immutable, identity-less domain primitives

mod calendar_id;
mod calendar_url;
mod event_id;
mod recurrence;
mod timezone;

pub use calendar_id::CalendarId;
pub use calendar_url::CalendarUrl;
pub use event_id::{EventId, normalize_event_href};
pub use recurrence::{Frequency, RecurrenceEnd, RecurrenceRule};
pub use timezone::Timezone;
