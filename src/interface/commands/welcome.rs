//! # Welcome Flow
//!
//! Greets members joining the announcements room: a public welcome in the general
//! room, a celebration on member milestones, then the welcome script by direct message.

use anyhow::Result;
use std::time::Duration;

use super::chat_error;
use crate::domain::config::WelcomeConfig;
use crate::domain::traits::ChatProvider;

pub fn is_milestone(members: u64, milestone: u64) -> bool {
    milestone > 0 && members > 0 && members % milestone == 0
}

pub async fn welcome_member(
    config: &WelcomeConfig,
    announcements: &impl ChatProvider,
    general: &impl ChatProvider,
    direct: &impl ChatProvider,
    user_id: &str,
) -> Result<()> {
    general
        .send_message(&crate::strings::messages::welcome_user(user_id))
        .await
        .map_err(chat_error)?;

    let members = announcements.joined_member_count().await.map_err(chat_error)?;
    if is_milestone(members, config.member_milestone) {
        general
            .send_message(&crate::strings::messages::member_milestone(members))
            .await
            .map_err(chat_error)?;
    }

    let pause = Duration::from_millis(config.message_pause_ms);
    for message in &config.messages {
        tokio::time::sleep(pause).await;
        direct.send_message(message).await.map_err(chat_error)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::commands::testing::MockChat;

    fn config() -> WelcomeConfig {
        WelcomeConfig {
            message_pause_ms: 0,
            messages: vec!["hi".to_string(), "bye".to_string()],
            ..WelcomeConfig::default()
        }
    }

    #[test]
    fn test_milestones() {
        assert!(is_milestone(100, 50));
        assert!(!is_milestone(101, 50));
        assert!(!is_milestone(0, 50));
        assert!(!is_milestone(10, 0));
    }

    #[tokio::test]
    async fn test_welcomes_and_sends_script() {
        let announcements = MockChat::new().with_members(49);
        let general = MockChat::new();
        let direct = MockChat::new();

        welcome_member(&config(), &announcements, &general, &direct, "@new:example.org")
            .await
            .unwrap();
        assert_eq!(general.texts(), vec!["Welcome, @new:example.org!"]);
        assert_eq!(direct.texts(), vec!["hi", "bye"]);
    }

    #[tokio::test]
    async fn test_celebrates_milestone() {
        let announcements = MockChat::new().with_members(150);
        let general = MockChat::new();
        let direct = MockChat::new();

        welcome_member(&config(), &announcements, &general, &direct, "@new:example.org")
            .await
            .unwrap();
        assert_eq!(general.texts()[1], crate::strings::messages::member_milestone(150));
    }

    #[tokio::test]
    async fn test_stops_when_general_room_fails() {
        let general = MockChat::new().failing_messages();
        let direct = MockChat::new();
        let result = welcome_member(&config(), &MockChat::new(), &general, &direct, "@x:y").await;
        assert!(result.is_err());
        assert!(direct.messages().is_empty());
    }
}
