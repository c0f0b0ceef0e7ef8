//! # Event
//!
//! The uniform representation of a calendar entry, a recurrence occurrence or a seminar,
//! and its rendering as a digest block.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::domain::types::{EventSource, Seminar};

pub const EXTERNAL_PREFIX: &str = "[External] ";
pub const SEMINAR_PREFIX: &str = "[ITEE Seminar] ";
pub const RECURRING_PREFIX: &str = "[Recurring] ";
pub const DEFAULT_LOCATION: &str = "TBA";

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: String,
    pub summary: String,
    pub recurring: bool,
    pub link: Option<String>,
    pub source: EventSource,
}

impl Event {
    /// Builds a calendar-sourced event. The external prefix becomes part of the summary here.
    pub fn from_calendar(
        source: EventSource,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        location: Option<String>,
        summary: &str,
        recurring: bool,
    ) -> Self {
        let summary = match source {
            EventSource::External => format!("{EXTERNAL_PREFIX}{summary}"),
            _ => summary.to_string(),
        };
        Self {
            start,
            end: end.max(start),
            location: location.unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            summary,
            recurring,
            link: None,
            source,
        }
    }

    /// Seminars carry no duration; they are assumed to last an hour.
    pub fn from_seminar(seminar: Seminar) -> Self {
        Self {
            start: seminar.start,
            end: seminar.start + Duration::hours(1),
            location: seminar.location,
            summary: format!("{SEMINAR_PREFIX}{}", seminar.title),
            recurring: false,
            link: Some(seminar.link),
            source: EventSource::Seminar,
        }
    }

    /// Markdown block for one event. Only summary and location are escaped.
    pub fn render(&self, tz: Tz) -> String {
        let summary = escape_text(&format!(
            "{}{}",
            if self.recurring { RECURRING_PREFIX } else { "" },
            self.summary
        ));
        let location = escape_text(&self.location);

        let title = match (&self.link, self.source) {
            (Some(link), _) => format!("[{summary}]({link})"),
            (None, EventSource::Primary) => format!("**{summary}**"),
            (None, _) => summary,
        };
        let location = if location.is_empty() {
            String::new()
        } else {
            format!(" _({location})_")
        };

        format!("{title}\n**{}**{location}", self.time_range(tz))
    }

    /// `WED JAN 3 18:00 - 20:00`, with the end's date repeated when it falls on another day.
    pub fn time_range(&self, tz: Tz) -> String {
        let start = self.start.with_timezone(&tz);
        let end = self.end.with_timezone(&tz);

        let start_str = start.format("%a %b %-d %-H:%M").to_string().to_uppercase();
        let end_str = if start.date_naive() != end.date_naive() {
            end.format("%a %b %-d %-H:%M").to_string().to_uppercase()
        } else {
            end.format("%-H:%M").to_string()
        };
        format!("{start_str} - {end_str}")
    }
}

/// Escapes the characters the chat markup would otherwise interpret.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
