//! # Domain Traits
//!
//! Abstract interfaces for the chat transport, the clock and the event sources.
//! Allows for pluggable implementations in the Infrastructure layer and stubs in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::BotResult;
use crate::domain::types::{Attachment, EventSource, Seminar};

/// Abstract interface for a Chat Provider (e.g., Matrix, Slack, Console)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a message to the room, returning its event ID
    async fn send_message(&self, content: &str) -> Result<String, String>;

    /// Send a message followed by colored blocks
    async fn send_attachments(
        &self,
        content: &str,
        attachments: &[Attachment],
    ) -> Result<String, String>;

    /// React to a message, returning the reaction's event ID
    async fn react(&self, event_id: &str, key: &str) -> Result<String, String>;

    /// Withdraw a reaction previously returned by `react`
    async fn remove_reaction(&self, reaction_id: &str) -> Result<(), String>;

    /// Number of joined members in the room
    async fn joined_member_count(&self) -> Result<u64, String>;

    /// Get the current room ID
    fn room_id(&self) -> String;
}

/// Source of "now", overridable for deterministic tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Retrieves raw iCalendar documents.
#[async_trait]
pub trait CalendarFetcher: Send + Sync {
    async fn fetch_calendar(&self, source: EventSource) -> BotResult<Vec<u8>>;
}

/// Retrieves the seminar listing.
#[async_trait]
pub trait SeminarFetcher: Send + Sync {
    async fn fetch_seminars(&self) -> BotResult<Vec<Seminar>>;
}
