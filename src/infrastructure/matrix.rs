//! # Matrix Service Adapter
//!
//! Implements the `ChatProvider` trait for the Matrix protocol using the `matrix_sdk`.
//! This module acts as the bridge between the generic `ChatProvider` interface used by the bot's core logic
//! and the specific implementation details of the Matrix SDK.

use crate::domain::traits::ChatProvider;
use crate::domain::types::Attachment;
use anyhow::Result;
use async_trait::async_trait;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::EventId;
use matrix_sdk::ruma::events::reaction::ReactionEventContent;
use matrix_sdk::ruma::events::relation::Annotation;
use matrix_sdk::ruma::events::room::message::RoomMessageEventContent;
use std::convert::TryFrom;

#[derive(Clone)]
pub struct MatrixService {
    room: Room,
}

impl MatrixService {
    pub fn new(room: Room) -> Self {
        Self { room }
    }

    async fn internal_react(&self, event_id: &str, key: &str) -> Result<String> {
        let event_id = <&EventId>::try_from(event_id)?;
        let content =
            ReactionEventContent::new(Annotation::new(event_id.to_owned(), key.to_string()));
        let resp = self.room.send(content).await?;
        Ok(resp.event_id.to_string())
    }

    async fn internal_redact(&self, event_id: &str) -> Result<()> {
        let event_id = <&EventId>::try_from(event_id)?;
        self.room.redact(event_id, None, None).await?;
        Ok(())
    }
}

/// Markdown for a message followed by colored blocks. Each block line gets a colored
/// gutter, which Matrix clients render from the `font` tag.
pub fn attachments_markdown(content: &str, attachments: &[Attachment]) -> String {
    let mut out = content.to_string();
    for attachment in attachments {
        let gutter = format!("<font color=\"{}\">▌</font>", attachment.color);
        let block = attachment
            .text
            .lines()
            .map(|line| format!("{gutter} {line}"))
            .collect::<Vec<_>>()
            .join("  \n");
        out.push_str("\n\n");
        out.push_str(&block);
    }
    out
}

#[async_trait]
impl ChatProvider for MatrixService {
    fn room_id(&self) -> String {
        self.room.room_id().as_str().to_string()
    }

    async fn send_message(&self, content: &str) -> Result<String, String> {
        tracing::info!("Bot sending message to {}: {}", self.room_id(), content);
        self.room
            .send(RoomMessageEventContent::text_markdown(content))
            .await
            .map(|resp| resp.event_id.to_string())
            .map_err(|e| e.to_string())
    }

    async fn send_attachments(
        &self,
        content: &str,
        attachments: &[Attachment],
    ) -> Result<String, String> {
        self.send_message(&attachments_markdown(content, attachments))
            .await
    }

    async fn react(&self, event_id: &str, key: &str) -> Result<String, String> {
        self.internal_react(event_id, key)
            .await
            .map_err(|e| e.to_string())
    }

    async fn remove_reaction(&self, reaction_id: &str) -> Result<(), String> {
        self.internal_redact(reaction_id)
            .await
            .map_err(|e| e.to_string())
    }

    async fn joined_member_count(&self) -> Result<u64, String> {
        Ok(self.room.joined_members_count())
    }
}
