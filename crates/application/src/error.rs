//! Application-level errors

use domain::DomainError;
use thiserror::Error;

use crate::ports::CalendarError;

/// Errors a skill command can end with
///
/// Every variant carries the message shown to the caller.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Invalid input, bad configuration or unreadable calendar data
    #[error("{0}")]
    Skill(String),

    /// The calendar's permissions forbid the operation
    #[error("{0}")]
    AccessDenied(String),

    /// The addressed event or calendar endpoint does not exist
    #[error("{0}")]
    NotFound(String),

    /// The CalDAV server could not be reached or answered unexpectedly
    #[error("{0}")]
    Transport(String),
}

impl ApplicationError {
    /// Process exit code for this error
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::AccessDenied(_) => 2,
            Self::Skill(_) | Self::NotFound(_) | Self::Transport(_) => 1,
        }
    }
}

impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        if err.is_access_denied() {
            Self::AccessDenied(err.to_string())
        } else {
            Self::Skill(err.to_string())
        }
    }
}

impl From<CalendarError> for ApplicationError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::NotFound(_) => Self::NotFound(err.to_string()),
            CalendarError::InvalidEvent(_) | CalendarError::InvalidResponse(_) => {
                Self::Skill(err.to_string())
            },
            CalendarError::Unavailable(_)
            | CalendarError::AuthenticationFailed(_)
            | CalendarError::Conflict(_) => Self::Transport(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_exits_with_two() {
        let err = ApplicationError::AccessDenied("Write access denied".to_string());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn other_errors_exit_with_one() {
        for err in [
            ApplicationError::Skill("bad".to_string()),
            ApplicationError::NotFound("gone".to_string()),
            ApplicationError::Transport("down".to_string()),
        ] {
            assert_eq!(err.exit_code(), 1);
        }
    }

    #[test]
    fn display_is_the_bare_message() {
        let err = ApplicationError::Skill("Delete requires --confirm".to_string());
        assert_eq!(err.to_string(), "Delete requires --confirm");
    }

    #[test]
    fn domain_access_denied_keeps_its_kind() {
        let err: ApplicationError =
            DomainError::AccessDenied("Event does not belong to calendar 'family'".to_string())
                .into();
        assert!(matches!(err, ApplicationError::AccessDenied(_)));
        assert!(err.to_string().contains("does not belong"));
    }

    #[test]
    fn other_domain_errors_are_skill_errors() {
        let err: ApplicationError = DomainError::MalformedEventId.into();
        assert!(matches!(err, ApplicationError::Skill(_)));
    }

    #[test]
    fn calendar_errors_map_to_taxonomy() {
        let not_found: ApplicationError =
            CalendarError::NotFound("Calendar endpoint not found for delete.".to_string()).into();
        assert!(matches!(not_found, ApplicationError::NotFound(_)));
        assert_eq!(not_found.to_string(), "Calendar endpoint not found for delete.");

        let down: ApplicationError = CalendarError::Unavailable("Request timed out".to_string()).into();
        assert!(matches!(down, ApplicationError::Transport(_)));
    }

    #[test]
    fn unreadable_server_data_is_a_skill_error() {
        let err: ApplicationError = CalendarError::InvalidResponse(
            "Parse error: calendar-query response is not valid XML".to_string(),
        )
        .into();
        assert!(matches!(err, ApplicationError::Skill(_)));
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("not valid XML"));
    }
}
