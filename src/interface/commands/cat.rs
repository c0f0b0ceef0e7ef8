use anyhow::Result;

use super::chat_error;
use crate::application::registry::{CommandMeta, StatusReact};
use crate::domain::traits::ChatProvider;

pub const META: CommandMeta = CommandMeta {
    name: "cat",
    aliases: &[],
    usage: "!cat",
    help: "Posts a cat",
    hidden: true,
    status: StatusReact::None,
};

pub async fn handle_cat(chat: &impl ChatProvider) -> Result<()> {
    chat.send_message(crate::strings::messages::CAT)
        .await
        .map(|_| ())
        .map_err(chat_error)
}
