//! # Bot Errors
//!
//! Typed failures that the router and the events pipeline need to tell apart.
//! Everything else travels as `anyhow::Error`.

use crate::domain::types::EventSource;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    /// The command was called with arguments it does not understand.
    #[error("invalid command usage")]
    UsageSyntax,

    #[error("failed to fetch {origin} calendar: {reason}")]
    CalendarFetch { origin: EventSource, reason: String },

    #[error("failed to parse {origin} calendar: {reason}")]
    CalendarParse { origin: EventSource, reason: String },

    #[error("failed to fetch seminar listing: {0}")]
    SeminarFetch(String),

    #[error("unexpected seminar listing format: {0}")]
    SeminarFormat(String),

    #[error("chat error: {0}")]
    Chat(String),
}

pub type BotResult<T> = Result<T, BotError>;

impl BotError {
    pub fn is_usage(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<BotError>(), Some(BotError::UsageSyntax))
    }
}
