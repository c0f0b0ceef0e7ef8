//! # Command Router
//!
//! Routes incoming messages to the appropriate command handler (in `interface/commands`).
//! It strips the command prefix, resolves the name through the registry and dispatches
//! it wrapped in the command's status reactions. Plain messages are only inspected for
//! inline LaTeX.

use anyhow::Result;

use crate::application::registry::{CommandKind, CommandRegistry};
use crate::application::status::run_with_status;
use crate::domain::error::BotError;
use crate::domain::traits::ChatProvider;
use crate::domain::types::Invocation;
use crate::interface::commands::{self, CommandServices, chat_error};

pub struct CommandRouter {
    prefix: String,
    registry: CommandRegistry,
    services: CommandServices,
}

impl CommandRouter {
    pub fn new(prefix: String, registry: CommandRegistry, services: CommandServices) -> Self {
        Self {
            prefix,
            registry,
            services,
        }
    }

    /// Splits a prefixed message into command name and argument string.
    pub fn parse(&self, message: &str, sender: &str, event_id: &str) -> Option<Invocation> {
        let body = message.trim().strip_prefix(self.prefix.as_str())?;
        let (name, args) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
        if name.is_empty() {
            return None;
        }
        Some(Invocation {
            name: name.to_lowercase(),
            args: args.trim().to_string(),
            sender: sender.to_string(),
            event_id: event_id.to_string(),
        })
    }

    pub async fn route<C>(&self, chat: &C, message: &str, sender: &str, event_id: &str) -> Result<()>
    where
        C: ChatProvider,
    {
        let Some(invocation) = self.parse(message, sender, event_id) else {
            if let Some(content) = commands::latex::inline_content(message) {
                return commands::latex::post_render(&self.services.latex, chat, content).await;
            }
            return Ok(());
        };

        let Some((meta, kind)) = self.registry.lookup(&invocation.name) else {
            tracing::debug!("Ignoring unknown command '{}'", invocation.name);
            return Ok(());
        };

        tracing::info!(
            "{}",
            crate::strings::logs::dispatching(meta.name, &invocation.args, sender)
        );

        let outcome = run_with_status(
            chat,
            &invocation.event_id,
            meta.status,
            self.dispatch(kind, chat, &invocation),
        )
        .await;

        let Err(e) = outcome else {
            return Ok(());
        };
        let reply = if BotError::is_usage(&e) {
            crate::strings::messages::usage_error(meta.usage)
        } else {
            tracing::error!("{}", crate::strings::logs::command_error(meta.name, &format!("{e:#}")));
            crate::strings::messages::command_failed(meta.name)
        };
        chat.send_message(&reply).await.map(|_| ()).map_err(chat_error)
    }

    async fn dispatch<C>(&self, kind: CommandKind, chat: &C, invocation: &Invocation) -> Result<()>
    where
        C: ChatProvider,
    {
        let args = invocation.args.as_str();
        match kind {
            CommandKind::Cat => commands::cat::handle_cat(chat).await,
            CommandKind::Id => commands::id::handle_id(chat, invocation).await,
            CommandKind::Help => {
                commands::help::handle_help(chat, &self.registry, &self.prefix, args).await
            }
            CommandKind::Events => {
                commands::events::handle_events(&self.services.events, chat, args).await
            }
            CommandKind::Hoogle => {
                commands::hoogle::handle_hoogle(
                    &self.services.http,
                    &self.services.hoogle,
                    chat,
                    args,
                )
                .await
            }
            CommandKind::Latex => commands::latex::handle_latex(&self.services.latex, chat, args).await,
            CommandKind::Youtube => {
                commands::youtube::handle_yt(&self.services.http, &self.services.youtube, chat, args)
                    .await
            }
        }
    }
}
