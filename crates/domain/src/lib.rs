//! Domain layer for the calendar skill
//!
//! Contains the calendar data model: identifiers, calendar profiles, events,
//! recurrence rules and the commands a caller can issue. This layer performs
//! no I/O.

pub mod commands;
pub mod entities;
pub mod errors;
pub mod value_objects;

pub use commands::SkillCommand;
pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
