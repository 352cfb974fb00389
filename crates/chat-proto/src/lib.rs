//! # chat-proto
//!
//! Wire protocol for the `chatd` chat service.
//!
//! The protocol is plain text, one command per line:
//!
//! ```text
//! S: HELO Welcome to the chat server
//! C: HELO alice
//! S: +OK alice
//! C: BCST hello everyone
//! S: +OK
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use chat_proto::{split_pair, Command, Reply};
//!
//! let cmd: Command = "PRIVATE bob-see you at five".parse().unwrap();
//! if let Command::Private(payload) = &cmd {
//!     assert_eq!(split_pair(payload), Some(("bob", "see you at five")));
//! }
//!
//! assert_eq!(Reply::ok_with("alice").to_string(), "+OK alice");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod reply;
pub mod username;

pub use self::command::{split_pair, Command, PAIR_SEPARATOR};
pub use self::error::ProtocolError;
#[cfg(feature = "tokio")]
pub use self::line::{LineCodec, DEFAULT_MAX_LINE_LEN};
pub use self::reply::Reply;
pub use self::username::{UsernameExt, USERNAME_MAX_LEN, USERNAME_MIN_LEN};
