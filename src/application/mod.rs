//! # Application Layer
//!
//! Contains the core business logic and orchestration of the bot.
//! This includes the events digest, command registry and routing, status reactions and logging.

pub mod events;
pub mod logging;
pub mod pagination;
pub mod registry;
pub mod router;
pub mod status;
