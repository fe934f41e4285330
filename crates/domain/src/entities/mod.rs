//! Domain entities - Objects with identity and lifecycle

mod calendar_event;
mod calendar_profile;
mod skill_config;

pub use calendar_event::{
    CalendarEvent, EventChanges, EventPatch, MIN_EVENT_DURATION, StoredEvent, intervals_overlap,
    sanitize_text,
};
pub use calendar_profile::{CalendarCredentials, CalendarProfile};
pub use skill_config::{SkillConfig, SkillSettings, bounded_limit};
