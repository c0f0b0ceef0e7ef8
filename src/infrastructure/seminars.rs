//! # Seminar Listing Scraper
//!
//! Scrapes the paginated HTML seminar list into [`Seminar`] entries. Every row must
//! carry a linked title and a machine-readable `datetime`; anything else is reported as
//! a format error so the caller can fall back to an empty listing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::application::pagination::{Page, paginate};
use crate::domain::config::SeminarsConfig;
use crate::domain::error::{BotError, BotResult};
use crate::domain::traits::SeminarFetcher;
use crate::domain::types::Seminar;

pub struct SeminarScraper {
    http: reqwest::Client,
    config: SeminarsConfig,
}

impl SeminarScraper {
    pub fn new(http: reqwest::Client, config: SeminarsConfig) -> Self {
        Self { http, config }
    }

    async fn fetch_page(&self, url: String) -> BotResult<Page<Seminar>> {
        let body = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| BotError::SeminarFetch(e.to_string()))?
            .text()
            .await
            .map_err(|e| BotError::SeminarFetch(e.to_string()))?;

        tracing::debug!("{}", crate::strings::logs::fetched("seminar page", &url, body.len()));
        parse_page(&body, &url, &self.config)
    }
}

#[async_trait]
impl SeminarFetcher for SeminarScraper {
    async fn fetch_seminars(&self) -> BotResult<Vec<Seminar>> {
        paginate(self.config.url.clone(), self.config.max_pages, |url| {
            self.fetch_page(url)
        })
        .await
    }
}

fn selector(css: &str) -> BotResult<Selector> {
    Selector::parse(css).map_err(|e| BotError::SeminarFormat(format!("bad selector '{css}': {e:?}")))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Seminars on one listing page and the absolute URL of the next page.
pub fn parse_page(html: &str, page_url: &str, config: &SeminarsConfig) -> BotResult<Page<Seminar>> {
    let base = Url::parse(page_url)
        .map_err(|e| BotError::SeminarFormat(format!("bad page url '{page_url}': {e}")))?;
    let resolve = |href: &str| {
        base.join(href)
            .map(|url| url.to_string())
            .map_err(|e| BotError::SeminarFormat(format!("bad link '{href}': {e}")))
    };

    let item_sel = selector(&config.item_selector)?;
    let title_sel = selector(&config.title_selector)?;
    let time_sel = selector(&config.time_selector)?;
    let location_sel = selector(&config.location_selector)?;
    let next_sel = selector(&config.next_selector)?;

    let document = Html::parse_document(html);
    let mut seminars = Vec::new();

    for item in document.select(&item_sel) {
        let title = item
            .select(&title_sel)
            .next()
            .ok_or_else(|| BotError::SeminarFormat("seminar without a title".to_string()))?;
        let href = title
            .value()
            .attr("href")
            .ok_or_else(|| BotError::SeminarFormat("seminar title without a link".to_string()))?;

        let stamp = item
            .select(&time_sel)
            .next()
            .and_then(|t| t.value().attr("datetime"))
            .ok_or_else(|| BotError::SeminarFormat("seminar without a datetime".to_string()))?;
        let start = DateTime::parse_from_rfc3339(stamp.trim())
            .map_err(|e| BotError::SeminarFormat(format!("bad datetime '{stamp}': {e}")))?
            .with_timezone(&Utc);

        let location = item
            .select(&location_sel)
            .next()
            .map(element_text)
            .unwrap_or_default();

        seminars.push(Seminar {
            title: element_text(title),
            link: resolve(href)?,
            start,
            location,
        });
    }

    let next = document
        .select(&next_sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| resolve(href))
        .transpose()?;

    Ok(Page {
        items: seminars,
        next,
    })
}
