//! State management module.
//!
//! Contains the Matrix (shared server state) and the pieces it owns.

mod groups;
mod matrix;
mod registry;
mod session;
mod uid;

pub use groups::{GroupError, GroupInfo, GroupManager, Member};
pub use matrix::{Matrix, Settings};
pub use registry::{RegisterError, Registry};
pub use session::{Phase, SessionHandle};
pub use uid::{SessionId, SessionIdGenerator};
