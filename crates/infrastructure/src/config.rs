//! Calendar account configuration
//!
//! Reads the JSON account file, fills in defaults and validates it into an
//! immutable [`SkillConfig`]. Loading never touches the network.

use std::collections::BTreeMap;
use std::path::Path;

use application::ApplicationError;
use domain::{
    CalendarCredentials, CalendarId, CalendarProfile, CalendarUrl, SkillConfig, SkillSettings,
    Timezone,
};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};
use validator::{Validate, ValidationErrors};

/// Default location of the account file
pub const DEFAULT_CONFIG_PATH: &str = "calendar_accounts.json";

/// Environment variable that overrides the account file location
pub const CONFIG_PATH_ENV: &str = "CALENDAR_SKILL_CONFIG";

/// Errors raised while loading the account file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Cannot read config file {path}: {message}")]
    Io { path: String, message: String },

    /// File is not valid JSON or has the wrong shape
    #[error("Config file is not valid JSON: {0}")]
    Parse(String),

    /// Values are out of range or inconsistent
    #[error("Invalid config: {0}")]
    Validation(String),
}

impl From<ConfigError> for ApplicationError {
    fn from(error: ConfigError) -> Self {
        Self::Skill(error.to_string())
    }
}

// ── Raw file format ─────────────────────────────────────────────

/// Top-level document as stored on disk
#[derive(Debug, Deserialize, Validate)]
pub struct RawConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_duration_minutes")]
    #[validate(range(min = 1, max = 10_080, message = "must be between 1 and 10080"))]
    pub default_duration_minutes: u32,

    #[serde(default = "default_request_timeout")]
    #[validate(range(min = 1, max = 300, message = "must be between 1 and 300"))]
    pub request_timeout_seconds: u64,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub default_limit: usize,

    #[serde(default = "default_max_limit")]
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub max_limit: usize,

    #[serde(default = "default_title_max_chars")]
    #[validate(range(min = 4, message = "must be at least 4"))]
    pub title_max_chars: usize,

    #[serde(default = "default_location_max_chars")]
    #[validate(range(min = 4, message = "must be at least 4"))]
    pub location_max_chars: usize,

    #[serde(default)]
    pub calendars: BTreeMap<String, RawCalendar>,
}

/// One calendar entry, keyed by its id in [`RawConfig::calendars`]
#[derive(Deserialize, Validate)]
pub struct RawCalendar {
    /// Optional repetition of the map key; must match it when present
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[validate(length(min = 1, message = "must not be empty"))]
    pub url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default = "empty_secret")]
    pub password: SecretString,

    #[serde(default = "default_true")]
    pub read: bool,

    #[serde(default)]
    pub write: bool,
}

impl std::fmt::Debug for RawCalendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawCalendar")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("read", &self.read)
            .field("write", &self.write)
            .finish()
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

const fn default_duration_minutes() -> u32 {
    60
}

const fn default_request_timeout() -> u64 {
    10
}

const fn default_limit() -> usize {
    10
}

const fn default_max_limit() -> usize {
    25
}

const fn default_title_max_chars() -> usize {
    180
}

const fn default_location_max_chars() -> usize {
    140
}

const fn default_true() -> bool {
    true
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

// ── Loading ─────────────────────────────────────────────────────

/// Read and validate the account file at `path`
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load(path: impl AsRef<Path>) -> Result<SkillConfig, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    debug!(bytes = contents.len(), "Config file read");

    let config = parse(&contents)?;
    info!(
        calendars = config.calendars.len(),
        timezone = %config.settings.timezone,
        "Config loaded"
    );
    Ok(config)
}

/// Parse and validate an account document
pub fn parse(contents: &str) -> Result<SkillConfig, ConfigError> {
    let raw: RawConfig =
        serde_json::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
    build_config(raw)
}

/// Turn a deserialized document into a [`SkillConfig`]
pub fn build_config(raw: RawConfig) -> Result<SkillConfig, ConfigError> {
    raw.validate()
        .map_err(|e| ConfigError::Validation(format_field_errors(&e)))?;

    if raw.default_limit > raw.max_limit {
        return Err(ConfigError::Validation(format!(
            "default_limit ({}) must not exceed max_limit ({})",
            raw.default_limit, raw.max_limit
        )));
    }
    if raw.calendars.is_empty() {
        return Err(ConfigError::Validation(
            "At least one calendar must be configured".to_string(),
        ));
    }

    let timezone = Timezone::parse(&raw.timezone)
        .map_err(|e| ConfigError::Validation(e.to_string()))?;

    let settings = SkillSettings {
        timezone,
        default_duration_minutes: raw.default_duration_minutes,
        request_timeout_seconds: raw.request_timeout_seconds,
        default_limit: raw.default_limit,
        max_limit: raw.max_limit,
        title_max_chars: raw.title_max_chars,
        location_max_chars: raw.location_max_chars,
    };

    let mut calendars = BTreeMap::new();
    for (key, entry) in raw.calendars {
        let profile = build_profile(&key, entry)?;
        debug!(
            calendar = %profile.id,
            read = profile.read,
            write = profile.write,
            "Calendar configured"
        );
        calendars.insert(profile.id.clone(), profile);
    }

    Ok(SkillConfig {
        settings,
        calendars,
    })
}

fn build_profile(key: &str, entry: RawCalendar) -> Result<CalendarProfile, ConfigError> {
    let id = CalendarId::new(key).map_err(|e| ConfigError::Validation(e.to_string()))?;

    if let Some(declared) = entry.id.as_deref().filter(|declared| *declared != key) {
        return Err(ConfigError::Validation(format!(
            "Calendar '{key}' declares a different id '{declared}'"
        )));
    }

    entry.validate().map_err(|e| {
        ConfigError::Validation(format!("calendar '{key}': {}", format_field_errors(&e)))
    })?;

    let url = CalendarUrl::parse(&entry.url)
        .map_err(|e| ConfigError::Validation(format!("calendar '{key}': {e}")))?;

    let display_name = entry
        .display_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| key.to_string());

    Ok(CalendarProfile {
        id,
        display_name,
        url,
        credentials: CalendarCredentials::new(entry.username, entry.password),
        read: entry.read,
        write: entry.write,
    })
}

fn format_field_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                format!(
                    "{}: {}",
                    field,
                    error
                        .message
                        .as_ref()
                        .map_or_else(|| error.code.to_string(), ToString::to_string)
                )
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;
    use tempfile::NamedTempFile;

    use super::*;

    fn document() -> serde_json::Value {
        json!({
            "timezone": "Europe/Berlin",
            "default_duration_minutes": 60,
            "request_timeout_seconds": 10,
            "default_limit": 10,
            "max_limit": 25,
            "title_max_chars": 180,
            "location_max_chars": 140,
            "calendars": {
                "family": {
                    "id": "family",
                    "display_name": "Family",
                    "url": "https://caldav.example.test/family/",
                    "username": "family@example.com",
                    "password": "secret",
                    "read": true,
                    "write": true
                }
            }
        })
    }

    fn parse_value(value: &serde_json::Value) -> Result<SkillConfig, ConfigError> {
        parse(&value.to_string())
    }

    // === Loading Tests ===

    #[test]
    fn loads_file_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", document()).unwrap();

        let config = load(file.path()).unwrap();

        assert_eq!(config.settings.timezone.as_str(), "Europe/Berlin");
        let family = config.calendar("family").unwrap();
        assert_eq!(family.display_name, "Family");
        assert_eq!(family.credentials.username(), "family@example.com");
        assert_eq!(family.credentials.password(), "secret");
        assert!(family.read);
        assert!(family.write);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = parse("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = parse_value(&document()).unwrap();
        let family = config.calendar("family").unwrap();
        assert_eq!(family.url.as_str(), "https://caldav.example.test/family");
    }

    // === Default Tests ===

    #[test]
    fn absent_keys_take_defaults() {
        let config = parse_value(&json!({
            "calendars": {
                "work": { "url": "https://caldav.example.test/work" }
            }
        }))
        .unwrap();

        assert_eq!(config.settings, SkillSettings::default());
        let work = config.calendar("work").unwrap();
        assert_eq!(work.display_name, "work");
        assert!(work.read);
        assert!(!work.write);
    }

    // === Validation Tests ===

    #[test]
    fn rejects_invalid_calendar_id() {
        let mut doc = document();
        let entry = doc["calendars"]["family"].take();
        doc["calendars"] = json!({ "Family-Cal": entry });
        let err = parse_value(&doc).unwrap_err();
        assert!(err.to_string().contains("Calendar IDs must match ^[a-z0-9_]+$"));
    }

    #[test]
    fn rejects_mismatched_inner_id() {
        let mut doc = document();
        doc["calendars"]["family"]["id"] = json!("work");
        let err = parse_value(&doc).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("different id"));
    }

    #[test]
    fn rejects_url_with_query_or_fragment() {
        for url in [
            "https://caldav.example.test/family?x=1",
            "https://caldav.example.test/family#frag",
            "ftp://caldav.example.test/family",
        ] {
            let mut doc = document();
            doc["calendars"]["family"]["url"] = json!(url);
            let err = parse_value(&doc).unwrap_err();
            assert!(err.to_string().contains("URL is invalid"), "{url}");
        }
    }

    #[test]
    fn rejects_unknown_timezone() {
        let mut doc = document();
        doc["timezone"] = json!("Mars/Olympus");
        let err = parse_value(&doc).unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus"));
    }

    #[test]
    fn rejects_non_positive_limits() {
        let mut doc = document();
        doc["default_limit"] = json!(0);
        let err = parse_value(&doc).unwrap_err();
        assert!(err.to_string().contains("default_limit"));
    }

    #[test]
    fn rejects_negative_numbers_at_parse_time() {
        let mut doc = document();
        doc["request_timeout_seconds"] = json!(-5);
        assert!(matches!(parse_value(&doc), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn default_limit_must_not_exceed_max() {
        let mut doc = document();
        doc["default_limit"] = json!(30);
        let err = parse_value(&doc).unwrap_err();
        assert!(err.to_string().contains("must not exceed max_limit"));
    }

    #[test]
    fn requires_at_least_one_calendar() {
        let mut doc = document();
        doc["calendars"] = json!({});
        let err = parse_value(&doc).unwrap_err();
        assert!(err.to_string().contains("At least one calendar"));
    }

    #[test]
    fn config_error_is_a_skill_error() {
        let err: ApplicationError = ConfigError::Parse("eof".to_string()).into();
        assert!(matches!(err, ApplicationError::Skill(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn raw_calendar_debug_redacts_password() {
        let raw: RawConfig = serde_json::from_value(document()).unwrap();
        let debug = format!("{raw:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret\""));
    }
}
