//! # Help Command
//!
//! Handles the `!help` command.
//! Lists every visible command from the registry, or the usage of a single one.

use anyhow::Result;

use super::chat_error;
use crate::application::registry::{CommandMeta, CommandRegistry, StatusReact};
use crate::domain::traits::ChatProvider;

pub const META: CommandMeta = CommandMeta {
    name: "help",
    aliases: &[],
    usage: "!help [COMMAND]",
    help: "Lists the available commands, or explains one of them",
    hidden: false,
    status: StatusReact::None,
};

pub fn help_text(registry: &CommandRegistry, prefix: &str, topic: &str) -> String {
    let topic = topic.trim();
    if topic.is_empty() {
        return format!("{}\n{}", crate::strings::help::HEADER, registry.help_lines().join("\n"));
    }
    let name = topic.strip_prefix(prefix).unwrap_or(topic).to_lowercase();
    registry
        .help_for(&name)
        .unwrap_or_else(|| crate::strings::help::unknown_help_topic(&name))
}

pub async fn handle_help(
    chat: &impl ChatProvider,
    registry: &CommandRegistry,
    prefix: &str,
    args: &str,
) -> Result<()> {
    chat.send_message(&help_text(registry, prefix, args))
        .await
        .map(|_| ())
        .map_err(chat_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::commands::register_all;
    use crate::interface::commands::testing::MockChat;

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        register_all(&mut registry).unwrap();
        registry
    }

    #[test]
    fn test_full_listing_skips_hidden_commands() {
        let text = help_text(&registry(), "!", "");
        assert!(text.starts_with(crate::strings::help::HEADER));
        assert!(text.contains("!events"));
        assert!(text.contains("!hoogle"));
        assert!(!text.contains("!cat"));
    }

    #[test]
    fn test_single_topic_accepts_prefix_and_alias() {
        let registry = registry();
        assert_eq!(help_text(&registry, "!", "!yt"), help_text(&registry, "!", "youtube"));
        assert!(help_text(&registry, "!", "EVENTS").contains("!events"));
    }

    #[test]
    fn test_unknown_topic() {
        assert_eq!(
            help_text(&registry(), "!", "dance"),
            crate::strings::help::unknown_help_topic("dance")
        );
    }

    #[tokio::test]
    async fn test_handle_help_posts_once() {
        let chat = MockChat::new();
        handle_help(&chat, &registry(), "!", "").await.unwrap();
        assert_eq!(chat.texts().len(), 1);
    }
}
