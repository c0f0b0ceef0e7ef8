//! # Digest Rendering
//!
//! Formats a filtered, sorted event list into the message posted back to the room.

use chrono_tz::Tz;

use crate::application::events::event::Event;
use crate::application::events::filter::EventFilter;
use crate::domain::types::Attachment;

/// Message text plus one colored block per event.
#[derive(Debug, Clone, PartialEq)]
pub struct Digest {
    pub text: String,
    pub attachments: Vec<Attachment>,
}

impl Digest {
    pub fn render(events: &[Event], filter: &EventFilter, tz: Tz, listing_links: &[String]) -> Self {
        if events.is_empty() {
            let mut text = format!("_{}_", filter.no_result_message());
            if !listing_links.is_empty() {
                text.push_str(&crate::strings::messages::full_listing(listing_links));
            }
            return Self {
                text,
                attachments: Vec::new(),
            };
        }

        Self {
            text: format!("_{}_", filter.header()),
            attachments: events
                .iter()
                .map(|event| Attachment::new(event.render(tz), event.source.color()))
                .collect(),
        }
    }
}
