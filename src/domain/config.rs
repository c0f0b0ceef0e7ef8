//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for the chat service, the events digest sources and the smaller
//! lookup commands.

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::Path;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub hoogle: HoogleConfig,
    #[serde(default)]
    pub youtube: YoutubeConfig,
    #[serde(default)]
    pub latex: LatexConfig,
    #[serde(default)]
    pub welcome: WelcomeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(content).context(crate::strings::logs::CONFIG_PARSE_ERROR)?;
        // Fail at startup rather than on the first `events` call.
        config.events.display_timezone()?;
        Ok(config)
    }
}

/// Configuration for various connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub username: String,
    pub password: String,
    pub homeserver: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CommandsConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

fn default_prefix() -> String {
    "!".to_string()
}

/// Sources and presentation settings for the `events` digest.
#[derive(Debug, Deserialize, Clone)]
pub struct EventsConfig {
    #[serde(default = "default_primary_calendar_url")]
    pub primary_calendar_url: String,
    #[serde(default = "default_external_calendar_url")]
    pub external_calendar_url: String,
    #[serde(default)]
    pub seminars: SeminarsConfig,
    #[serde(default = "default_display_timezone")]
    pub display_timezone: String,
    /// Upper bound on expanded occurrences per recurrence rule.
    #[serde(default = "default_max_recurring_events")]
    pub max_recurring_events: usize,
    /// Window used when `events` is called without an argument.
    #[serde(default = "default_weeks")]
    pub default_weeks: u32,
    #[serde(default = "default_listing_links")]
    pub listing_links: Vec<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl EventsConfig {
    pub fn display_timezone(&self) -> Result<Tz> {
        self.display_timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid display_timezone '{}': {}", self.display_timezone, e))
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            primary_calendar_url: default_primary_calendar_url(),
            external_calendar_url: default_external_calendar_url(),
            seminars: SeminarsConfig::default(),
            display_timezone: default_display_timezone(),
            max_recurring_events: default_max_recurring_events(),
            default_weeks: default_weeks(),
            listing_links: default_listing_links(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_primary_calendar_url() -> String {
    "https://calendar.google.com/calendar/ical/q3n3pce86072n9knt3pt65fhio%40group.calendar.google.com/public/basic.ics".to_string()
}
fn default_external_calendar_url() -> String {
    "https://calendar.google.com/calendar/ical/72abf01afvsl3bjd9oq2g1avgg%40group.calendar.google.com/public/basic.ics".to_string()
}
fn default_display_timezone() -> String {
    "Australia/Brisbane".to_string()
}
fn default_max_recurring_events() -> usize {
    3
}
fn default_weeks() -> u32 {
    2
}
fn default_listing_links() -> Vec<String> {
    vec![
        "https://uqcs.org/events".to_string(),
        "https://www.itee.uq.edu.au/seminar-list".to_string(),
    ]
}
fn default_request_timeout() -> u64 {
    30
}

/// Where and how the seminar listing is scraped.
/// Selectors are CSS selectors evaluated by `scraper`.
#[derive(Debug, Deserialize, Clone)]
pub struct SeminarsConfig {
    #[serde(default = "default_seminars_url")]
    pub url: String,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default = "default_item_selector")]
    pub item_selector: String,
    #[serde(default = "default_title_selector")]
    pub title_selector: String,
    #[serde(default = "default_time_selector")]
    pub time_selector: String,
    #[serde(default = "default_location_selector")]
    pub location_selector: String,
    #[serde(default = "default_next_selector")]
    pub next_selector: String,
}

impl Default for SeminarsConfig {
    fn default() -> Self {
        Self {
            url: default_seminars_url(),
            max_pages: default_max_pages(),
            item_selector: default_item_selector(),
            title_selector: default_title_selector(),
            time_selector: default_time_selector(),
            location_selector: default_location_selector(),
            next_selector: default_next_selector(),
        }
    }
}

fn default_seminars_url() -> String {
    "https://www.itee.uq.edu.au/seminar-list".to_string()
}
fn default_max_pages() -> usize {
    3
}
fn default_item_selector() -> String {
    "table.seminars tbody tr".to_string()
}
fn default_title_selector() -> String {
    "td.title a".to_string()
}
fn default_time_selector() -> String {
    "td.date time".to_string()
}
fn default_location_selector() -> String {
    "td.location".to_string()
}
fn default_next_selector() -> String {
    "a[rel=\"next\"]".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct HoogleConfig {
    #[serde(default = "default_hoogle_url")]
    pub url: String,
    #[serde(default = "default_hoogle_count")]
    pub count: u32,
}

impl Default for HoogleConfig {
    fn default() -> Self {
        Self {
            url: default_hoogle_url(),
            count: default_hoogle_count(),
        }
    }
}

fn default_hoogle_url() -> String {
    "https://hoogle.haskell.org/".to_string()
}
fn default_hoogle_count() -> u32 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct YoutubeConfig {
    #[serde(default = "default_youtube_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_youtube_key_env")]
    pub api_key_env: String,
}

impl YoutubeConfig {
    /// Explicit key first, then the configured environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.is_empty())
    }
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            url: default_youtube_url(),
            api_key: None,
            api_key_env: default_youtube_key_env(),
        }
    }
}

fn default_youtube_url() -> String {
    "https://www.googleapis.com/youtube/v3/search".to_string()
}
fn default_youtube_key_env() -> String {
    "YOUTUBE_API_KEY".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LatexConfig {
    #[serde(default = "default_latex_url")]
    pub url: String,
}

impl Default for LatexConfig {
    fn default() -> Self {
        Self {
            url: default_latex_url(),
        }
    }
}

fn default_latex_url() -> String {
    "https://latex.codecogs.com/gif.latex".to_string()
}

/// Greeting flow for members joining the announcements room.
#[derive(Debug, Deserialize, Clone)]
pub struct WelcomeConfig {
    #[serde(default)]
    pub announcements_room: Option<String>,
    #[serde(default)]
    pub general_room: Option<String>,
    #[serde(default = "default_member_milestone")]
    pub member_milestone: u64,
    #[serde(default = "default_message_pause")]
    pub message_pause_ms: u64,
    #[serde(default = "default_welcome_messages")]
    pub messages: Vec<String>,
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            announcements_room: None,
            general_room: None,
            member_milestone: default_member_milestone(),
            message_pause_ms: default_message_pause(),
            messages: default_welcome_messages(),
        }
    }
}

fn default_member_milestone() -> u64 {
    50
}
fn default_message_pause() -> u64 {
    2500
}
fn default_welcome_messages() -> Vec<String> {
    crate::strings::messages::WELCOME_SCRIPT
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_directory")]
    pub directory: String,
    #[serde(default = "default_log_file")]
    pub file: String,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            file: default_log_file(),
            filter: default_log_filter(),
        }
    }
}

fn default_log_directory() -> String {
    "data".to_string()
}
fn default_log_file() -> String {
    "session.log".to_string()
}
fn default_log_filter() -> String {
    "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
services:
  matrix:
    username: bot
    password: hunter2
    homeserver: https://matrix.example.org
"#;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = AppConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.commands.prefix, "!");
        assert_eq!(config.events.max_recurring_events, 3);
        assert_eq!(config.events.default_weeks, 2);
        assert_eq!(config.events.display_timezone().unwrap(), chrono_tz::Australia::Brisbane);
        assert_eq!(config.events.listing_links.len(), 2);
        assert_eq!(config.welcome.member_milestone, 50);
        assert!(!config.welcome.messages.is_empty());
    }

    #[test]
    fn test_overrides_are_respected() {
        let yaml = format!(
            "{MINIMAL}events:\n  max_recurring_events: 5\n  default_weeks: 4\n  display_timezone: Europe/Berlin\n"
        );
        let config = AppConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.events.max_recurring_events, 5);
        assert_eq!(config.events.default_weeks, 4);
        assert_eq!(config.events.display_timezone().unwrap(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn test_invalid_timezone_is_rejected() {
        let yaml = format!("{MINIMAL}events:\n  display_timezone: Mars/Olympus\n");
        assert!(AppConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.services.matrix.username, "bot");
    }

    #[test]
    fn test_example_config_parses() {
        let config = AppConfig::from_yaml(include_str!("../../data/config.example.yaml")).unwrap();
        assert_eq!(config.events.seminars.max_pages, 3);
        assert_eq!(config.welcome.general_room.as_deref(), Some("!general:example.org"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(AppConfig::load("/nonexistent/config.yaml").is_err());
    }
}
