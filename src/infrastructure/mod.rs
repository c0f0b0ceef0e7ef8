//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (ChatProvider, Clock and the event sources).

pub mod calendar;
pub mod clock;
pub mod http;
pub mod matrix;
pub mod seminars;
