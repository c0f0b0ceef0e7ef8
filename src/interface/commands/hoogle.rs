//! # Hoogle Command
//!
//! Handles `!hoogle [-v|--verbose] <QUERY>` against the Hoogle JSON API.
//! Both the current response shape (a bare array of `url`/`item`) and the legacy
//! one (`results` of `location`/`self`) are accepted.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use super::chat_error;
use crate::application::registry::{CommandMeta, StatusReact};
use crate::domain::config::HoogleConfig;
use crate::domain::error::BotError;
use crate::domain::traits::ChatProvider;

pub const META: CommandMeta = CommandMeta {
    name: "hoogle",
    aliases: &[],
    usage: "!hoogle [-v] [--verbose] <TYPE_SIGNATURE>",
    help: "Queries the Hoogle Haskell API search engine by function name or approximate type signature",
    hidden: false,
    status: StatusReact::Loading,
};

#[derive(Parser, Debug)]
#[command(name = "hoogle", disable_help_flag = true, disable_version_flag = true)]
struct HoogleArgs {
    #[arg(short, long)]
    verbose: bool,
    #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    query: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct HoogleResult {
    #[serde(alias = "location")]
    pub url: String,
    #[serde(alias = "self")]
    pub item: String,
    #[serde(default)]
    pub docs: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HoogleResponse {
    List(Vec<HoogleResult>),
    Legacy {
        #[serde(default)]
        results: Vec<HoogleResult>,
    },
}

impl HoogleResponse {
    fn into_results(self) -> Vec<HoogleResult> {
        match self {
            Self::List(results) | Self::Legacy { results } => results,
        }
    }
}

pub fn parse_results(body: &str) -> Result<Vec<HoogleResult>> {
    let response: HoogleResponse =
        serde_json::from_str(body).context("Hoogle returned malformed JSON")?;
    Ok(response.into_results())
}

/// Reverses the entity escaping chat clients apply to `<`, `>` and `&`.
fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

pub fn format_result(result: &HoogleResult, verbose: bool) -> String {
    let line = format!("`{}` [link]({})", result.item, result.url);
    if verbose && !result.docs.is_empty() {
        format!("{line}\n{}", result.docs)
    } else {
        line
    }
}

pub async fn handle_hoogle(
    http: &reqwest::Client,
    config: &HoogleConfig,
    chat: &impl ChatProvider,
    args: &str,
) -> Result<()> {
    let parsed = HoogleArgs::try_parse_from(std::iter::once("hoogle").chain(args.split_whitespace()))
        .map_err(|_| BotError::UsageSyntax)?;
    let query = unescape_html(&parsed.query.join(" "));

    let response = http
        .get(&config.url)
        .query(&[
            ("mode", "json"),
            ("format", "text"),
            ("count", &config.count.to_string()),
            ("hoogle", &query),
        ])
        .send()
        .await
        .context("Hoogle request failed")?;

    if !response.status().is_success() {
        tracing::warn!("Hoogle returned {}", response.status());
        return chat
            .send_message(crate::strings::messages::PROBLEM_FETCHING)
            .await
            .map(|_| ())
            .map_err(chat_error);
    }

    let body = response.text().await.context("Hoogle response was cut short")?;
    let results = parse_results(&body)?;

    let reply = if results.is_empty() {
        crate::strings::messages::NO_RESULTS_FOUND.to_string()
    } else {
        results
            .iter()
            .map(|r| format_result(r, parsed.verbose))
            .collect::<Vec<_>>()
            .join("\n")
    };
    chat.send_message(&reply).await.map(|_| ()).map_err(chat_error)
}
