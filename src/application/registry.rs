//! # Command Registry
//!
//! Explicit table of the commands the bot answers to, built once at startup and
//! shared by reference with the router and the help command.

use anyhow::{Result, bail};

/// Which handler the router dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Cat,
    Id,
    Help,
    Events,
    Hoogle,
    Latex,
    Youtube,
}

/// Reaction feedback wrapped around a command's execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusReact {
    None,
    /// Shown while the command runs, withdrawn afterwards.
    Loading,
    /// Added once the command completed successfully.
    Success,
}

/// Registration-time description of a command.
#[derive(Debug, Clone)]
pub struct CommandMeta {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub help: &'static str,
    /// Hidden commands still dispatch but are left out of `help`.
    pub hidden: bool,
    pub status: StatusReact,
}

impl CommandMeta {
    fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }

    pub fn help_line(&self) -> String {
        format!("`{}` - {}", self.usage, self.help)
    }
}

#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<(CommandMeta, CommandKind)>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, meta: CommandMeta, kind: CommandKind) -> Result<()> {
        let names = std::iter::once(meta.name).chain(meta.aliases.iter().copied());
        for name in names {
            if self.lookup(name).is_some() {
                bail!("Command '{}' is already registered", name);
            }
        }
        self.commands.push((meta, kind));
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<(&CommandMeta, CommandKind)> {
        self.commands
            .iter()
            .find(|(meta, _)| meta.answers_to(name))
            .map(|(meta, kind)| (meta, *kind))
    }

    /// Help lines of every visible command, sorted by name.
    pub fn help_lines(&self) -> Vec<String> {
        let mut visible: Vec<&CommandMeta> = self
            .commands
            .iter()
            .map(|(meta, _)| meta)
            .filter(|meta| !meta.hidden)
            .collect();
        visible.sort_by_key(|meta| meta.name);
        visible.into_iter().map(CommandMeta::help_line).collect()
    }

    pub fn help_for(&self, name: &str) -> Option<String> {
        self.lookup(name)
            .filter(|(meta, _)| !meta.hidden)
            .map(|(meta, _)| meta.help_line())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}
