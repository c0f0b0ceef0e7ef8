//! # Domain Types
//!
//! Common data structures and enums shared by the command handlers and the chat adapters.

use chrono::{DateTime, Utc};
use std::fmt;

/// Origin of an event in the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    Primary,
    External,
    Seminar,
}

impl EventSource {
    pub const ALL: [EventSource; 3] = [Self::Primary, Self::Seminar, Self::External];

    /// Keyword that selects this source in the `events` argument.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Primary => "uqcs",
            Self::Seminar => "itee",
            Self::External => "external",
        }
    }

    /// Fixed block color used when rendering events of this source.
    pub fn color(self) -> &'static str {
        match self {
            Self::Primary => "#5297D1",
            Self::Seminar => "#51237A",
            Self::External => "#116B17",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Primary => "UQCS",
            Self::Seminar => "ITEE",
            Self::External => "external",
        };
        f.write_str(name)
    }
}

/// One entry of the seminar listing, as scraped.
#[derive(Debug, Clone, PartialEq)]
pub struct Seminar {
    pub title: String,
    pub link: String,
    pub start: DateTime<Utc>,
    pub location: String,
}

/// A colored block posted alongside a message.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub text: String,
    pub color: String,
}

impl Attachment {
    pub fn new(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: color.into(),
        }
    }
}

/// An inbound command after prefix stripping.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub name: String,
    pub args: String,
    pub sender: String,
    /// Event ID of the triggering message, target of status reactions.
    pub event_id: String,
}
