use anyhow::Result;

use super::chat_error;
use crate::application::registry::{CommandMeta, StatusReact};
use crate::domain::traits::ChatProvider;
use crate::domain::types::Invocation;

pub const META: CommandMeta = CommandMeta {
    name: "id",
    aliases: &["whoami"],
    usage: "!id",
    help: "Replies with your user ID",
    hidden: false,
    status: StatusReact::None,
};

pub async fn handle_id(chat: &impl ChatProvider, invocation: &Invocation) -> Result<()> {
    chat.send_message(&invocation.sender)
        .await
        .map(|_| ())
        .map_err(chat_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::commands::testing::MockChat;

    #[tokio::test]
    async fn test_replies_with_sender() {
        let chat = MockChat::new();
        let invocation = Invocation {
            name: "id".to_string(),
            args: String::new(),
            sender: "@alice:example.org".to_string(),
            event_id: "$1".to_string(),
        };
        handle_id(&chat, &invocation).await.unwrap();
        assert_eq!(chat.texts(), vec!["@alice:example.org"]);
    }
}
