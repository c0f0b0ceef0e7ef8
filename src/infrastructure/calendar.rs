//! # Calendar Feeds
//!
//! Downloads the primary and external iCalendar feeds over HTTP.

use async_trait::async_trait;

use crate::domain::config::EventsConfig;
use crate::domain::error::{BotError, BotResult};
use crate::domain::traits::CalendarFetcher;
use crate::domain::types::EventSource;

pub struct HttpCalendarFetcher {
    http: reqwest::Client,
    primary_url: String,
    external_url: String,
}

impl HttpCalendarFetcher {
    pub fn new(http: reqwest::Client, config: &EventsConfig) -> Self {
        Self {
            http,
            primary_url: config.primary_calendar_url.clone(),
            external_url: config.external_calendar_url.clone(),
        }
    }

    fn url_for(&self, source: EventSource) -> Option<&str> {
        match source {
            EventSource::Primary => Some(&self.primary_url),
            EventSource::External => Some(&self.external_url),
            EventSource::Seminar => None,
        }
    }
}

#[async_trait]
impl CalendarFetcher for HttpCalendarFetcher {
    async fn fetch_calendar(&self, source: EventSource) -> BotResult<Vec<u8>> {
        let fetch_error = |reason: String| BotError::CalendarFetch {
            origin: source,
            reason,
        };
        let url = self
            .url_for(source)
            .ok_or_else(|| fetch_error("no calendar feed for this source".to_string()))?;

        let bytes = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| fetch_error(e.to_string()))?
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        tracing::debug!("{}", crate::strings::logs::fetched("calendar", url, bytes.len()));
        Ok(bytes.to_vec())
    }
}
