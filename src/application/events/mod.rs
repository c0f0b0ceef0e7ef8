//! # Events Digest
//!
//! Aggregates the primary calendar, the external calendar and the seminar listing
//! into one filtered, sorted digest.
//!
//! Calendar failures abort the digest. Seminar failures are logged and the digest
//! is built from the remaining sources.

pub mod digest;
pub mod event;
pub mod filter;
pub mod normalize;

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

use crate::domain::config::EventsConfig;
use crate::domain::error::BotResult;
use crate::domain::traits::{CalendarFetcher, Clock, SeminarFetcher};
use crate::domain::types::EventSource;

pub use digest::Digest;
pub use event::Event;
pub use filter::{EventFilter, EventsRequest, SourceSelection};
pub use normalize::CalendarNormalizer;

/// Tunables of the digest, resolved from [`EventsConfig`].
#[derive(Debug, Clone)]
pub struct EventsSettings {
    pub display_tz: Tz,
    pub max_recurring: usize,
    pub default_weeks: u32,
    pub listing_links: Vec<String>,
}

impl EventsSettings {
    pub fn from_config(config: &EventsConfig) -> Result<Self> {
        Ok(Self {
            display_tz: config.display_timezone()?,
            max_recurring: config.max_recurring_events,
            default_weeks: config.default_weeks,
            listing_links: config.listing_links.clone(),
        })
    }
}

pub struct EventsService {
    calendars: Arc<dyn CalendarFetcher>,
    seminars: Arc<dyn SeminarFetcher>,
    clock: Arc<dyn Clock>,
    settings: EventsSettings,
}

impl EventsService {
    pub fn new(
        calendars: Arc<dyn CalendarFetcher>,
        seminars: Arc<dyn SeminarFetcher>,
        clock: Arc<dyn Clock>,
        settings: EventsSettings,
    ) -> Self {
        Self {
            calendars,
            seminars,
            clock,
            settings,
        }
    }

    pub fn parse_request(&self, argument: &str) -> EventsRequest {
        EventsRequest::parse(argument, self.settings.default_weeks)
    }

    /// Fetches every enabled source concurrently, then filters, sorts and renders.
    pub async fn digest(&self, request: &EventsRequest) -> BotResult<Digest> {
        let now = self.clock.now();
        let events = self.collect(&request.sources, now).await?;
        let events = request
            .filter
            .apply(events, now, self.settings.display_tz);

        Ok(Digest::render(
            &events,
            &request.filter,
            self.settings.display_tz,
            &self.settings.listing_links,
        ))
    }

    /// Merged, unfiltered events from the selected sources.
    pub async fn collect(
        &self,
        sources: &SourceSelection,
        now: DateTime<Utc>,
    ) -> BotResult<Vec<Event>> {
        let (primary, external, seminars) = tokio::join!(
            self.calendar_events(EventSource::Primary, sources, now),
            self.calendar_events(EventSource::External, sources, now),
            self.seminar_events(sources, now),
        );

        let mut events = primary?;
        events.extend(external?);
        events.extend(seminars);
        Ok(events)
    }

    async fn calendar_events(
        &self,
        source: EventSource,
        sources: &SourceSelection,
        now: DateTime<Utc>,
    ) -> BotResult<Vec<Event>> {
        if !sources.is_enabled(source) {
            return Ok(Vec::new());
        }
        let raw = self.calendars.fetch_calendar(source).await?;
        CalendarNormalizer::new(self.settings.display_tz, self.settings.max_recurring)
            .normalize(&raw, source, now)
    }

    async fn seminar_events(&self, sources: &SourceSelection, now: DateTime<Utc>) -> Vec<Event> {
        if !sources.is_enabled(EventSource::Seminar) {
            return Vec::new();
        }
        match self.seminars.fetch_seminars().await {
            Ok(seminars) => seminars
                .into_iter()
                .map(Event::from_seminar)
                .filter(|e| e.start > now)
                .collect(),
            Err(e) => {
                tracing::error!("{}", crate::strings::logs::seminar_fetch_failed(&e.to_string()));
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Stub sources shared by the events and command tests.

    use super::*;
    use crate::domain::error::BotError;
    use crate::domain::types::Seminar;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub struct FixedClock(pub DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[derive(Default)]
    pub struct StubCalendars {
        pub documents: HashMap<EventSource, String>,
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl CalendarFetcher for StubCalendars {
        async fn fetch_calendar(&self, source: EventSource) -> BotResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.documents
                .get(&source)
                .map(|doc| doc.clone().into_bytes())
                .ok_or(BotError::CalendarFetch {
                    origin: source,
                    reason: "unreachable".to_string(),
                })
        }
    }

    pub struct StubSeminars {
        pub result: Result<Vec<Seminar>, String>,
        pub calls: AtomicUsize,
    }

    impl StubSeminars {
        pub fn ok(seminars: Vec<Seminar>) -> Self {
            Self {
                result: Ok(seminars),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                result: Err("connection reset".to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SeminarFetcher for StubSeminars {
        async fn fetch_seminars(&self) -> BotResult<Vec<Seminar>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(BotError::SeminarFetch)
        }
    }

    pub fn settings() -> EventsSettings {
        EventsSettings {
            display_tz: chrono_tz::Australia::Brisbane,
            max_recurring: 3,
            default_weeks: 2,
            listing_links: vec!["https://uqcs.org/events".to_string()],
        }
    }

    pub fn single_event_calendar(start: &str, end: &str, summary: &str) -> String {
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nDTSTART:{start}\r\nDTEND:{end}\r\nSUMMARY:{summary}\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n"
        )
    }
}
