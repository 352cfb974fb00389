//! Error handling for command dispatch.
//!
//! Every rejected command maps to exactly one `-ERR` line and one metric
//! label. Only [`HandlerError::InvalidUsername`] ends the session.

use chat_proto::Reply;
use thiserror::Error;

/// Errors that can occur during command handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("already logged in")]
    AlreadyLoggedIn,

    #[error("not logged in")]
    NotLoggedIn,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("private message undeliverable")]
    PrivateFailed,

    /// JOINGROUP found no group with that name.
    #[error("no such group: {0}")]
    GroupNotFound(String),

    /// QUITGROUP found no group with that exact name.
    #[error("no group named exactly {0}")]
    NoSuchGroup(String),

    #[error("group exists: {0}")]
    GroupExists(String),

    #[error("group name missing")]
    GroupNameMissing,

    #[error("not in group: {0}")]
    NotInGroup(String),

    #[error("kick failed")]
    KickFailed,
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidUsername(_) => "invalid_username",
            Self::AlreadyLoggedIn => "already_logged_in",
            Self::NotLoggedIn => "not_logged_in",
            Self::UnknownCommand(_) => "unknown_command",
            Self::PrivateFailed => "private_failed",
            Self::GroupNotFound(_) => "group_not_found",
            Self::NoSuchGroup(_) => "no_such_group",
            Self::GroupExists(_) => "group_exists",
            Self::GroupNameMissing => "group_name_missing",
            Self::NotInGroup(_) => "not_in_group",
            Self::KickFailed => "kick_failed",
        }
    }

    /// Whether the session must finish after the reply is sent.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidUsername(_))
    }

    /// The `-ERR` line sent to the client.
    pub fn to_reply(&self) -> Reply {
        match self {
            Self::InvalidUsername(_) => Reply::err(
                "username has an invalid format (only characters, numbers and underscores are allowed)",
            ),
            Self::AlreadyLoggedIn => Reply::err("user already logged in"),
            Self::NotLoggedIn => Reply::err("Please log in first"),
            // sic: clients match on this spelling
            Self::UnknownCommand(_) => Reply::err("Unkown command"),
            Self::PrivateFailed => Reply::err("Private message sending has failed."),
            Self::GroupNotFound(_) => Reply::err("Group name not found"),
            Self::NoSuchGroup(_) => Reply::err("Group name does not exist."),
            Self::GroupExists(_) => Reply::err("Group name already exists."),
            Self::GroupNameMissing => Reply::err("Group name is missing."),
            Self::NotInGroup(name) => {
                Reply::err(format!("You are not a participant in this group: {name}"))
            }
            Self::KickFailed => Reply::err("Failed to kick the selected user"),
        }
    }
}
