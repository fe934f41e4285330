//! Skill commands - Strongly typed representations of the verbs a caller can run
//!
//! Arguments stay as the caller typed them. Dates depend on the configured
//! timezone and checks run in a fixed order, so interpretation happens in
//! the application layer.

use serde::{Deserialize, Serialize};

/// All commands the calendar skill can execute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SkillCommand {
    /// List today's events
    Today {
        /// Maximum number of events to show
        limit: Option<i64>,
    },

    /// List events on a given date
    On {
        /// ISO date (`YYYY-MM-DD`)
        date: String,
        limit: Option<i64>,
    },

    /// List tomorrow's events
    Tomorrow { limit: Option<i64> },

    /// List seven days of events
    Week {
        /// First day of the week; defaults to this week's Monday
        start: Option<String>,
        limit: Option<i64>,
    },

    /// Check whether a slot is free across all readable calendars
    Free {
        /// ISO datetime of the slot start
        at: String,
        /// Slot length in minutes (defaults to the configured duration)
        duration_minutes: Option<i64>,
    },

    /// Create an event
    Create {
        /// Target calendar id
        calendar: String,
        title: String,
        /// ISO datetime
        start: String,
        duration_minutes: Option<i64>,
        location: Option<String>,
        /// `daily`, `weekly`, `monthly` or `yearly`
        repeat: Option<String>,
        count: Option<u32>,
        /// ISO date of the last occurrence day
        until: Option<String>,
    },

    /// Edit an existing event
    Edit {
        /// Opaque event id
        event_id: String,
        title: Option<String>,
        start: Option<String>,
        duration_minutes: Option<i64>,
    },

    /// Delete an event
    Delete {
        /// Opaque event id
        event_id: String,
        /// Explicit confirmation flag
        confirm: bool,
    },
}

impl SkillCommand {
    /// Short verb name, used for logging
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Today { .. } => "today",
            Self::On { .. } => "on",
            Self::Tomorrow { .. } => "tomorrow",
            Self::Week { .. } => "week",
            Self::Free { .. } => "free",
            Self::Create { .. } => "create",
            Self::Edit { .. } => "edit",
            Self::Delete { .. } => "delete",
        }
    }

    /// Whether the command modifies a calendar
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Create { .. } | Self::Edit { .. } | Self::Delete { .. }
        )
    }
}

impl std::fmt::Display for SkillCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.verb())
    }
}
