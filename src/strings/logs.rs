//! # Log Messages
//!
//! Format functions for operator-facing log lines.

pub const CONFIG_PARSE_ERROR: &str = "Failed to parse YAML";
pub const STARTING: &str = "Starting eventbot...";
pub const SYNC_LOOP_START: &str = "Starting sync loop...";

pub fn logged_in(user: &str) -> String {
    format!("Logged in as {user}")
}

pub fn received_message(sender: &str, body: &str) -> String {
    format!("Received message from {sender}: \n{body}")
}

pub fn dispatching(cmd: &str, args: &str, sender: &str) -> String {
    format!("Router dispatching cmd='{cmd}' args='{args}' sender='{sender}'")
}

pub fn route_failed(err: &str) -> String {
    format!("Failed to route message: {err}")
}

pub fn command_error(cmd: &str, err: &str) -> String {
    format!("Command '{cmd}' failed: {err}")
}

pub fn reaction_failed(err: &str) -> String {
    format!("Failed to update status reaction: {err}")
}

pub fn seminar_fetch_failed(err: &str) -> String {
    format!("Seminar listing unavailable, continuing without it: {err}")
}

pub fn fetched(what: &str, url: &str, bytes: usize) -> String {
    format!("Fetched {what} from {url} ({bytes} bytes)")
}

pub fn welcome_failed(user: &str, err: &str) -> String {
    format!("Failed to welcome {user}: {err}")
}

pub fn sync_loop_fail(err: &str) -> String {
    format!("Sync loop failed: {err}")
}
