//! # Interface Layer
//!
//! Entry points for user interactions: the chat command handlers.

pub mod commands;
