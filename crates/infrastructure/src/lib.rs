//! Infrastructure layer - Adapters for external systems
//!
//! Loads the calendar account file and implements the application's
//! calendar port on top of the CalDAV integration.

pub mod adapters;
pub mod config;

pub use adapters::CalDavCalendarAdapter;
pub use config::{CONFIG_PATH_ENV, ConfigError, DEFAULT_CONFIG_PATH, load};
