//! # YouTube Command
//!
//! Handles `!yt <QUERY>`: posts the top video result of a YouTube Data API search.
//! API failures are logged and nothing is posted.

use anyhow::Result;
use serde::Deserialize;

use super::chat_error;
use crate::application::registry::{CommandMeta, StatusReact};
use crate::domain::config::YoutubeConfig;
use crate::domain::traits::ChatProvider;

pub const META: CommandMeta = CommandMeta {
    name: "yt",
    aliases: &["youtube"],
    usage: "!yt <QUERY>",
    help: "Returns the top video search result based on the query string",
    hidden: false,
    status: StatusReact::None,
};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: VideoId,
}

#[derive(Debug, Deserialize)]
struct VideoId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

async fn top_video(
    http: &reqwest::Client,
    config: &YoutubeConfig,
    api_key: &str,
    query: &str,
) -> reqwest::Result<Option<String>> {
    let response: SearchResponse = http
        .get(&config.url)
        .query(&[
            ("key", api_key),
            ("q", query),
            ("part", "id"),
            ("type", "video"),
            ("maxResults", "1"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(response.items.into_iter().find_map(|item| item.id.video_id))
}

pub async fn handle_yt(
    http: &reqwest::Client,
    config: &YoutubeConfig,
    chat: &impl ChatProvider,
    args: &str,
) -> Result<()> {
    let query = args.trim();
    if query.is_empty() {
        return chat
            .send_message(crate::strings::messages::YT_NO_QUERY)
            .await
            .map(|_| ())
            .map_err(chat_error);
    }

    let Some(api_key) = config.resolve_api_key() else {
        tracing::error!("No YouTube API key configured (set {})", config.api_key_env);
        return Ok(());
    };

    let reply = match top_video(http, config, &api_key, query).await {
        Ok(Some(id)) => format!("{}{id}", crate::strings::messages::YOUTUBE_VIDEO_URL),
        Ok(None) => crate::strings::messages::YT_NO_RESULTS.to_string(),
        Err(e) => {
            tracing::error!("YouTube search failed: {}", e);
            return Ok(());
        }
    };
    chat.send_message(&reply).await.map(|_| ()).map_err(chat_error)
}
