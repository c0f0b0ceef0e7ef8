//! # LaTeX Command
//!
//! Handles `!latex <CONTENT>` and inline `$$ CONTENT $$` in ordinary messages by
//! posting a link to the rendered image.

use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

use super::chat_error;
use crate::application::registry::{CommandMeta, StatusReact};
use crate::domain::config::LatexConfig;
use crate::domain::traits::ChatProvider;

pub const META: CommandMeta = CommandMeta {
    name: "latex",
    aliases: &[],
    usage: "!latex CONTENT",
    help: "Renders CONTENT as LaTeX. `$$ CONTENT $$` also works",
    hidden: false,
    status: StatusReact::None,
};

static INLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\$(.+)\$\$").expect("inline latex pattern compiles"));

/// Content of the first `$$ ... $$` span, if any.
pub fn inline_content(message: &str) -> Option<&str> {
    INLINE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|content| !content.is_empty())
}

pub fn render_url(config: &LatexConfig, content: &str) -> String {
    format!("{}?{}", config.url, urlencoding::encode(content))
}

pub async fn post_render(config: &LatexConfig, chat: &impl ChatProvider, content: &str) -> Result<()> {
    let reply = crate::strings::messages::latex_render(content, &render_url(config, content));
    chat.send_message(&reply).await.map(|_| ()).map_err(chat_error)
}

pub async fn handle_latex(config: &LatexConfig, chat: &impl ChatProvider, args: &str) -> Result<()> {
    let content = args.trim();
    if content.is_empty() {
        return chat
            .send_message(crate::strings::messages::NO_DATA_PROVIDED)
            .await
            .map(|_| ())
            .map_err(chat_error);
    }
    post_render(config, chat, content).await
}
