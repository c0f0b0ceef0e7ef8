//! # Events Command
//!
//! Handles `!events`: parses the argument, refuses invalid filters before any fetch,
//! and posts the digest as a header plus one colored block per event.

use anyhow::Result;

use super::chat_error;
use crate::application::events::EventsService;
use crate::application::registry::{CommandMeta, StatusReact};
use crate::domain::error::BotError;
use crate::domain::traits::ChatProvider;

pub const META: CommandMeta = CommandMeta {
    name: "events",
    aliases: &[],
    usage: "!events [full|all|NUM EVENTS|<NUM> WEEKS|<MONTH>] [uqcs|itee|external]",
    help: "Lists upcoming UQCS, ITEE seminar and external events. Defaults to the next two weeks",
    hidden: false,
    status: StatusReact::Loading,
};

pub async fn handle_events(
    service: &EventsService,
    chat: &impl ChatProvider,
    args: &str,
) -> Result<()> {
    let request = service.parse_request(args);
    if !request.filter.is_valid() {
        return Err(BotError::UsageSyntax.into());
    }

    let digest = service.digest(&request).await?;
    chat.send_attachments(&digest.text, &digest.attachments)
        .await
        .map(|_| ())
        .map_err(chat_error)
}
