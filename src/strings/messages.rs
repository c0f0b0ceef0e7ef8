//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.
//! Includes usage errors, lookup results and the welcome script.

pub const NO_DATA_PROVIDED: &str = "No data provided";
pub const PROBLEM_FETCHING: &str = "Problem fetching data";
pub const NO_RESULTS_FOUND: &str = "No results found";
pub const YT_NO_QUERY: &str = "You can't look for nothing. !yt <QUERY>";
pub const YT_NO_RESULTS: &str = "Your query returned no results.";
pub const YOUTUBE_VIDEO_URL: &str = "https://www.youtube.com/watch?v=";

pub fn usage_error(usage: &str) -> String {
    format!("Usage: {usage}")
}

pub fn command_failed(name: &str) -> String {
    format!("❌ `{name}` failed, please try again later.")
}

pub fn full_listing(links: &[String]) -> String {
    format!("\nFor a full list of events, visit: {}", links.join(" and "))
}

pub fn latex_render(data: &str, url: &str) -> String {
    format!("LaTeX render for \"{data}\": {url}")
}

pub fn welcome_user(user_id: &str) -> String {
    format!("Welcome, {user_id}!")
}

pub fn member_milestone(count: u64) -> String {
    format!("🎉 {count} members! 🎉")
}

pub const CAT: &str = concat!(
    "```\n",
    "         __..--''``\\--....___   _..,_\n",
    "     _.-'    .-/\";  `        ``<._  ``-+'~=.\n",
    " _.-' _..--.'_    \\                    `(^) )\n",
    "((..-'    (< _     ;_..__               ; `'   fL\n",
    "           `-._,_)'      ``--...____..-'\n",
    "```"
);

pub const WELCOME_SCRIPT: &[&str] = &[
    "Hey there! Welcome to the UQCS chat!",
    "This is the first time I've seen you, so you're probably new here",
    "I'm the UQCS bot, your friendly (open source) robot helper",
    "We've got a bunch of generic rooms along with many subject-specific ones",
    "The UQCS community has a code of conduct in place to ensure our members' well-being and safety. \
     You can view a copy of it at:\n> https://github.com/UQComputingSociety/code-of-conduct",
    "For a list of upcoming events check out the events room, or type \"!events\"",
    "Type \"!help\" to find out what I can do!",
    "and again, welcome :)",
];
