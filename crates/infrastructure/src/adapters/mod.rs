//! Adapters implementing application ports

mod caldav_calendar_adapter;

pub use caldav_calendar_adapter::CalDavCalendarAdapter;
