#![recursion_limit = "256"]
//! # Main Entry Point
//!
//! Wires the bot together:
//! - Domain: Configuration, Types and Errors
//! - Infrastructure: Matrix, calendar feeds, seminar scraper, clock
//! - Application: Events digest, Registry, Router, Logging
//! - Interface: Command Handlers and the welcome flow
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::Result;
use clap::Parser;
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::{
        OwnedRoomId,
        events::room::{
            member::{MembershipChange, MembershipState, StrippedRoomMemberEvent, SyncRoomMemberEvent},
            message::{MessageType, SyncRoomMessageEvent},
        },
    },
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::application::events::{EventsService, EventsSettings};
use crate::application::registry::CommandRegistry;
use crate::application::router::CommandRouter;
use crate::domain::config::{AppConfig, WelcomeConfig};
use crate::infrastructure::calendar::HttpCalendarFetcher;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::matrix::MatrixService;
use crate::infrastructure::seminars::SeminarScraper;
use crate::interface::commands::{self, CommandServices};

#[derive(Parser, Debug)]
#[command(version, about = "Community chat bot with an events digest")]
struct Cli {
    /// Path to the YAML configuration
    #[arg(short, long, default_value = "data/config.yaml")]
    config: PathBuf,
}

fn is_before(ts: matrix_sdk::ruma::MilliSecondsSinceUnixEpoch, start_time: SystemTime) -> bool {
    UNIX_EPOCH + Duration::from_millis(ts.get().into()) < start_time
}

fn build_router(config: &AppConfig) -> Result<CommandRouter> {
    let http = infrastructure::http::build_client(config.events.request_timeout_secs)?;

    let events = EventsService::new(
        Arc::new(HttpCalendarFetcher::new(http.clone(), &config.events)),
        Arc::new(SeminarScraper::new(http.clone(), config.events.seminars.clone())),
        Arc::new(SystemClock),
        EventsSettings::from_config(&config.events)?,
    );

    let mut registry = CommandRegistry::new();
    commands::register_all(&mut registry)?;
    tracing::info!("Registered {} commands", registry.len());

    Ok(CommandRouter::new(
        config.commands.prefix.clone(),
        registry,
        CommandServices {
            http,
            events,
            hoogle: config.hoogle.clone(),
            youtube: config.youtube.clone(),
            latex: config.latex.clone(),
        },
    ))
}

async fn welcome(client: Client, config: WelcomeConfig, announcements: Room, user_id: String) -> Result<()> {
    let general_id = config
        .general_room
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("welcome.general_room is not configured"))?;
    let general = client
        .get_room(&OwnedRoomId::try_from(general_id)?)
        .ok_or_else(|| anyhow::anyhow!("Not joined to general room {general_id}"))?;

    let user = matrix_sdk::ruma::OwnedUserId::try_from(user_id.as_str())?;
    let direct = match client.get_dm_room(&user) {
        Some(room) => room,
        None => client.create_dm(&user).await?,
    };

    commands::welcome::welcome_member(
        &config,
        &MatrixService::new(announcements),
        &MatrixService::new(general),
        &MatrixService::new(direct),
        &user_id,
    )
    .await
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    // 2. Logging
    let _log_guard = application::logging::init(&config.logging)?;
    tracing::info!("{}", strings::logs::STARTING);

    // 3. Commands
    let router = Arc::new(build_router(&config)?);

    // 4. Matrix Setup
    let matrix = &config.services.matrix;
    let client = Client::builder()
        .homeserver_url(&matrix.homeserver)
        .build()
        .await?;

    let mut login = client
        .matrix_auth()
        .login_username(&matrix.username, &matrix.password);
    if let Some(name) = &matrix.display_name {
        login = login.initial_device_display_name(name);
    }
    login.send().await?;

    tracing::info!("{}", strings::logs::logged_in(&matrix.username));

    // 5. Event Handlers
    let start_time = SystemTime::now();

    let loop_router = router.clone();
    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let router = loop_router.clone();
        async move {
            let Some(original_msg) = ev.as_original() else {
                return;
            };
            // Ignore backlog delivered by the first sync
            if is_before(ev.origin_server_ts(), start_time) {
                return;
            }
            let MessageType::Text(text_content) = &original_msg.content.msgtype else {
                return;
            };
            if original_msg.sender == room.own_user_id() {
                return;
            }

            let body = &text_content.body;
            tracing::info!("{}", strings::logs::received_message(original_msg.sender.as_str(), body));

            let chat = MatrixService::new(room);
            if let Err(e) = router
                .route(
                    &chat,
                    body,
                    original_msg.sender.as_str(),
                    original_msg.event_id.as_str(),
                )
                .await
            {
                tracing::error!("{}", strings::logs::route_failed(&e.to_string()));
            }
        }
    });

    let welcome_config = config.welcome.clone();
    client.add_event_handler(move |ev: SyncRoomMemberEvent, room: Room, client: Client| {
        let config = welcome_config.clone();
        async move {
            let Some(member) = ev.as_original() else {
                return;
            };
            if is_before(ev.origin_server_ts(), start_time)
                || config.announcements_room.as_deref() != Some(room.room_id().as_str())
                || member.state_key == room.own_user_id()
                || !matches!(member.membership_change(), MembershipChange::Joined)
            {
                return;
            }

            let user_id = member.state_key.to_string();
            // The script pauses between lines; keep it off the sync loop.
            tokio::spawn(async move {
                if let Err(e) = welcome(client, config, room, user_id.clone()).await {
                    tracing::error!("{}", strings::logs::welcome_failed(&user_id, &format!("{e:#}")));
                }
            });
        }
    });

    // Handle Invites
    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership == MembershipState::Invite {
            if let Err(e) = room.join().await {
                tracing::warn!("Failed to join {}: {}", room.room_id(), e);
            }
        }
    });

    // 6. Sync
    tracing::info!("{}", strings::logs::SYNC_LOOP_START);
    let sync_client = client.clone();
    let sync_handle = tokio::spawn(async move { sync_client.sync(SyncSettings::default()).await });

    match sync_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("{}", strings::logs::sync_loop_fail(&e.to_string())),
        Err(e) => tracing::error!("Matrix Sync Panic: {}", e),
    }

    Ok(())
}
