//! Server-to-client lines.
//!
//! Replies follow the `+OK[ <data>]` / `-ERR <reason>` convention. Relayed
//! broadcasts and private notes are the only unsolicited lines a client sees.

use std::fmt;

/// A line sent by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `HELO <welcome text>`, sent once right after accept.
    Greeting(String),
    /// `+OK` with optional data.
    Ok(Option<String>),
    /// `-ERR <reason>`.
    Err(String),
    /// `BCST [<from>] <text>`, relayed to every other logged-in client.
    Broadcast {
        /// Username of the sender.
        from: String,
        /// Broadcast payload.
        text: String,
    },
    /// Private note delivered to the target of a PRIVATE command.
    Private {
        /// Username of the sender.
        from: String,
        /// Message text.
        text: String,
    },
}

impl Reply {
    /// `+OK` with no data.
    pub fn ok() -> Self {
        Reply::Ok(None)
    }

    /// `+OK <data>`.
    pub fn ok_with(data: impl Into<String>) -> Self {
        Reply::Ok(Some(data.into()))
    }

    /// `-ERR <reason>`.
    pub fn err(reason: impl Into<String>) -> Self {
        Reply::Err(reason.into())
    }

    /// Whether this is an `-ERR` line.
    pub fn is_err(&self) -> bool {
        matches!(self, Reply::Err(_))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Greeting(text) => write!(f, "HELO {text}"),
            Reply::Ok(None) => f.write_str("+OK"),
            Reply::Ok(Some(data)) => write!(f, "+OK {data}"),
            Reply::Err(reason) => write!(f, "-ERR {reason}"),
            Reply::Broadcast { from, text } => write!(f, "BCST [{from}] {text}"),
            Reply::Private { from, text } => write!(f, "{from} has sent you a message: {text}"),
        }
    }
}
