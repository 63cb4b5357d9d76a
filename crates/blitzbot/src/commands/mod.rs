//! Chat command surface.
//!
//! The dispatch framework (outside this crate) parses the raw message,
//! loads the invoker's stored record, calls a command function, sends any
//! `Reply::Message` text, and persists any returned `RecordUpdate`.

pub mod win_rate;

use blitz_common::RecordUpdate;

/// A chat user as handed over by the platform gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    pub id: String,
    pub username: String,
    pub bot: bool,
}

/// The slice of a platform message the commands need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub author: ChatUser,
    pub mentions: Vec<ChatUser>,
}

impl IncomingMessage {
    /// First mentioned non-bot user, if any. The invoking mention of the
    /// bot itself arrives flagged as a bot and is never a target.
    pub fn target_mention(&self) -> Option<&ChatUser> {
        self.mentions.iter().find(|mention| !mention.bot)
    }
}

/// Render a platform mention for a user id.
pub fn format_mention(id: &str) -> String {
    format!("<@{id}>")
}

/// What a command wants sent back. Saying nothing is an explicit outcome,
/// not a missing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Deliberate no-op; the caller sends nothing.
    Silent,
    Message(String),
}

/// Result of one command invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub reply: Reply,
    /// Fresh counters for the caller to persist, present only when they
    /// differ from what is already stored.
    pub update: Option<RecordUpdate>,
}

impl CommandOutcome {
    pub fn silent() -> Self {
        Self {
            reply: Reply::Silent,
            update: None,
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self {
            reply: Reply::Message(text.into()),
            update: None,
        }
    }
}

/// Registration data for the dispatch framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub alias: &'static str,
    pub arg_count: usize,
    pub description: &'static str,
    pub signatures: &'static [&'static str],
}

pub const TANK_WIN_RATE_SPEC: CommandSpec = CommandSpec {
    name: "tank-win-rate",
    alias: "twr",
    arg_count: 1,
    description: "Get your win rate for the given tank.",
    signatures: &[
        "@BOTNAME tank-win-rate <tank-name>",
        "@BOTNAME twr <tank-name>",
    ],
};

pub const WIN_RATE_SPEC: CommandSpec = CommandSpec {
    name: "win-rate",
    alias: "wr",
    arg_count: 0,
    description: "Get the win rate of your account.",
    signatures: &["@BOTNAME win-rate", "@BOTNAME wr"],
};
