//! # Status Reactions
//!
//! Visual progress cues on the message that triggered a command. A loading reaction
//! is held for the duration of the handler and withdrawn on every exit path; a success
//! reaction is added only when the handler returns `Ok`.
//!
//! Reaction failures are logged and never change the command's outcome.

use anyhow::Result;
use rand::seq::SliceRandom;
use std::future::Future;

use crate::application::registry::StatusReact;
use crate::domain::traits::ChatProvider;

pub const LOADING_REACTS: &[&str] = &["⏳", "⌛", "🕰️", "🐢", "💤", "🦖"];
pub const SUCCESS_REACTS: &[&str] = &["👍", "👌", "🎉", "🙌", "💯", "🥳", "✅"];

fn pick(reacts: &[&'static str]) -> &'static str {
    reacts
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("👀")
}

/// A loading reaction that must be handed back through [`LoadingStatus::release`].
pub struct LoadingStatus<'a, C: ChatProvider + ?Sized> {
    chat: &'a C,
    reaction_id: Option<String>,
}

impl<'a, C: ChatProvider + ?Sized> LoadingStatus<'a, C> {
    pub async fn acquire(chat: &'a C, event_id: &str) -> Self {
        let reaction_id = match chat.react(event_id, pick(LOADING_REACTS)).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("{}", crate::strings::logs::reaction_failed(&e));
                None
            }
        };
        Self { chat, reaction_id }
    }

    pub async fn release(self) {
        if let Some(id) = self.reaction_id {
            if let Err(e) = self.chat.remove_reaction(&id).await {
                tracing::warn!("{}", crate::strings::logs::reaction_failed(&e));
            }
        }
    }
}

/// Runs `handler` with the status feedback configured for its command.
pub async fn run_with_status<C, F, T>(
    chat: &C,
    event_id: &str,
    status: StatusReact,
    handler: F,
) -> Result<T>
where
    C: ChatProvider + ?Sized,
    F: Future<Output = Result<T>>,
{
    match status {
        StatusReact::None => handler.await,
        StatusReact::Loading => {
            let loading = LoadingStatus::acquire(chat, event_id).await;
            let result = handler.await;
            loading.release().await;
            result
        }
        StatusReact::Success => {
            let result = handler.await;
            if result.is_ok() {
                if let Err(e) = chat.react(event_id, pick(SUCCESS_REACTS)).await {
                    tracing::warn!("{}", crate::strings::logs::reaction_failed(&e));
                }
            }
            result
        }
    }
}
