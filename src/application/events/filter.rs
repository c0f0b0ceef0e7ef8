//! # Events Argument Parsing
//!
//! Turns the free-text argument of `events` into the sources to query and the
//! filter to apply to the merged listing.

use chrono::{DateTime, Datelike, Duration, Month, Utc};
use chrono_tz::Tz;
use regex::Regex;
use std::sync::LazyLock;

use crate::application::events::event::Event;
use crate::domain::types::EventSource;

static FILTER_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<full>full|all)|(?P<num>[0-9]+)(?P<weeks> weeks?)?|(?P<month>jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec))",
    )
    .expect("filter grammar compiles")
});

/// Parsed intent of an `events` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    Full,
    Weeks(u32),
    Month(u32),
    Cap(usize),
    /// The argument did not match the grammar; callers must not fetch anything.
    Invalid,
}

impl EventFilter {
    /// Matches the lower-cased argument by prefix. Source keywords must already be removed.
    pub fn from_argument(argument: &str, default_weeks: u32) -> Self {
        let argument = argument.trim().to_lowercase();
        if argument.is_empty() {
            return Self::Weeks(default_weeks);
        }

        let Some(caps) = FILTER_GRAMMAR.captures(&argument) else {
            return Self::Invalid;
        };

        if caps.name("full").is_some() {
            return Self::Full;
        }
        if let Some(month) = caps.name("month") {
            return month_number(month.as_str()).map_or(Self::Invalid, Self::Month);
        }
        match caps.name("num").map(|n| n.as_str()) {
            Some(num) if caps.name("weeks").is_some() => {
                num.parse().map_or(Self::Invalid, Self::Weeks)
            }
            Some(num) => num.parse().map_or(Self::Invalid, Self::Cap),
            None => Self::Invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }

    /// Filters, sorts by start (stable) and caps the merged listing.
    pub fn apply(&self, events: Vec<Event>, now: DateTime<Utc>, tz: Tz) -> Vec<Event> {
        let mut events: Vec<Event> = match *self {
            Self::Weeks(weeks) => {
                // A horizon past the representable range means no upper bound.
                match now.checked_add_signed(Duration::weeks(i64::from(weeks))) {
                    Some(horizon) => events.into_iter().filter(|e| e.start < horizon).collect(),
                    None => events,
                }
            }
            Self::Month(month) => events
                .into_iter()
                .filter(|e| e.start.with_timezone(&tz).month() == month)
                .collect(),
            Self::Full | Self::Cap(_) => events,
            Self::Invalid => Vec::new(),
        };

        events.sort_by_key(|e| e.start);

        if let Self::Cap(cap) = *self {
            events.truncate(cap);
        }
        events
    }

    pub fn header(&self) -> String {
        match *self {
            Self::Full | Self::Invalid => "List of *all* upcoming events:".to_string(),
            Self::Weeks(weeks) => format!("Events in the next *{weeks} weeks*:"),
            Self::Month(month) => format!("Events in *{}*:", month_name(month)),
            Self::Cap(cap) => format!("The *next {cap} events*:"),
        }
    }

    pub fn no_result_message(&self) -> String {
        match *self {
            Self::Weeks(weeks) => {
                format!("There don't appear to be any events in the next *{weeks}* weeks")
            }
            Self::Month(month) => {
                format!("There don't appear to be any events in *{}*", month_name(month))
            }
            _ => "There don't appear to be any upcoming events...".to_string(),
        }
    }
}

fn month_number(abbr: &str) -> Option<u32> {
    (1..=12u8)
        .filter_map(|m| Month::try_from(m).ok())
        .find(|m| m.name()[..3].eq_ignore_ascii_case(abbr))
        .map(|m| m.number_from_month())
}

fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map_or("?", |m| m.name())
}

/// Which sources an `events` call queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSelection {
    pub primary: bool,
    pub external: bool,
    pub seminar: bool,
}

impl SourceSelection {
    pub fn all() -> Self {
        Self {
            primary: true,
            external: true,
            seminar: true,
        }
    }

    pub fn none() -> Self {
        Self {
            primary: false,
            external: false,
            seminar: false,
        }
    }

    pub fn is_enabled(&self, source: EventSource) -> bool {
        match source {
            EventSource::Primary => self.primary,
            EventSource::External => self.external,
            EventSource::Seminar => self.seminar,
        }
    }

    fn enable(&mut self, source: EventSource) {
        match source {
            EventSource::Primary => self.primary = true,
            EventSource::External => self.external = true,
            EventSource::Seminar => self.seminar = true,
        }
    }

    fn any(&self) -> bool {
        self.primary || self.external || self.seminar
    }
}

/// A fully parsed `events` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventsRequest {
    pub sources: SourceSelection,
    pub filter: EventFilter,
}

impl EventsRequest {
    /// Strips source keywords anywhere in the argument (case-insensitive), then parses
    /// what remains as a filter. No keyword means every source.
    pub fn parse(argument: &str, default_weeks: u32) -> Self {
        let mut remaining = argument.to_lowercase();
        let mut sources = SourceSelection::none();

        for source in EventSource::ALL {
            let keyword = source.keyword();
            if remaining.contains(keyword) {
                sources.enable(source);
                remaining = remaining.replace(keyword, "");
            }
        }
        if !sources.any() {
            sources = SourceSelection::all();
        }

        Self {
            sources,
            filter: EventFilter::from_argument(&remaining, default_weeks),
        }
    }
}
