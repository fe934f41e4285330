//! iCalendar (RFC 5545) reading, writing and in-place editing

mod generate;
mod parse;
mod patch;

pub use generate::{
    MAX_LINE_OCTETS, build_event_body, build_rrule, escape_text, fold_line, format_utc,
};
pub use parse::{
    DateProperty, EventSource, IcsOptions, UNTITLED, extract_events, extract_master_event,
    parse_duration, parse_ical_datetime, unescape_text, unfold_document,
};
pub use patch::patch_event_body;
