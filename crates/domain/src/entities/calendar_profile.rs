//! Calendar connection profile

use secrecy::{ExposeSecret, SecretString};

use crate::value_objects::{CalendarId, CalendarUrl};

/// Basic-auth credentials for a calendar server
#[derive(Clone)]
pub struct CalendarCredentials {
    username: String,
    password: SecretString,
}

impl CalendarCredentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Get the password as a string reference
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl std::fmt::Debug for CalendarCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// One configured calendar with its access rights
#[derive(Debug, Clone)]
pub struct CalendarProfile {
    pub id: CalendarId,
    pub display_name: String,
    pub url: CalendarUrl,
    pub credentials: CalendarCredentials,
    pub read: bool,
    pub write: bool,
}

impl CalendarProfile {
    /// `Name (id)` label used in command output
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.display_name, self.id)
    }
}
