//! # Help Text
//!
//! Static framing around the per-command help generated from the registry.
//! Displayed to the user via the `!help` command.

pub const HEADER: &str = "**🤖 Bot Help**\nUse: !command _args_\n";

pub fn unknown_help_topic(name: &str) -> String {
    format!("No help available for `{name}`.")
}
