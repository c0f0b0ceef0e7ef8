//! # Command Handlers
//!
//! Contains specific handler functions for each supported command (e.g., !events, !hoogle, !yt).
//! These handlers are invoked by the Router; `register_all` builds the table it dispatches from.

pub mod cat;
pub mod events;
pub mod help;
pub mod hoogle;
pub mod id;
pub mod latex;
pub mod welcome;
pub mod youtube;

use anyhow::Result;

use crate::application::events::EventsService;
use crate::application::registry::{CommandKind, CommandRegistry};
use crate::domain::config::{HoogleConfig, LatexConfig, YoutubeConfig};
use crate::domain::error::BotError;

/// Shared dependencies of the command handlers.
pub struct CommandServices {
    pub http: reqwest::Client,
    pub events: EventsService,
    pub hoogle: HoogleConfig,
    pub youtube: YoutubeConfig,
    pub latex: LatexConfig,
}

pub fn register_all(registry: &mut CommandRegistry) -> Result<()> {
    registry.register(cat::META, CommandKind::Cat)?;
    registry.register(id::META, CommandKind::Id)?;
    registry.register(help::META, CommandKind::Help)?;
    registry.register(events::META, CommandKind::Events)?;
    registry.register(hoogle::META, CommandKind::Hoogle)?;
    registry.register(latex::META, CommandKind::Latex)?;
    registry.register(youtube::META, CommandKind::Youtube)?;
    Ok(())
}

/// Lifts a transport error out of the `ChatProvider` boundary.
pub(crate) fn chat_error(e: String) -> anyhow::Error {
    BotError::Chat(e).into()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all_has_no_name_clashes() {
        let mut registry = CommandRegistry::new();
        register_all(&mut registry).unwrap();
        assert_eq!(registry.len(), 7);
        assert!(registry.lookup("youtube").is_some());
        assert!(registry.help_for("cat").is_none());
    }
}
