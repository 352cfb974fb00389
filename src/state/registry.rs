//! Directory of logged-in users.
//!
//! Maps username to the session that holds it. A name is present only while
//! its session is `Connected`; registration and the phase change happen under
//! the same shard lock, so no other task can observe a half-registered user.

use crate::state::{Phase, SessionHandle, SessionId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use thiserror::Error;

/// Why a login was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("username {0} is taken")]
    Taken(String),

    #[error("session is already logged in as {0}")]
    AlreadyLoggedIn(String),

    #[error("session is closed")]
    Closed,
}

/// Username → session directory.
#[derive(Default)]
pub struct Registry {
    users: DashMap<String, Arc<SessionHandle>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim `name` for `session` and move it to `Connected`.
    ///
    /// Claiming the name a session already holds succeeds without change.
    pub fn try_register(&self, name: &str, session: &Arc<SessionHandle>) -> Result<(), RegisterError> {
        if let Some(current) = session.username() {
            return if current == name && !session.is_finished() {
                Ok(())
            } else {
                Err(RegisterError::AlreadyLoggedIn(current.to_string()))
            };
        }

        match self.users.entry(name.to_string()) {
            Entry::Occupied(_) => Err(RegisterError::Taken(name.to_string())),
            Entry::Vacant(slot) => {
                // Username first, then phase: a concurrent terminate that sees
                // Finished also sees the name and waits on this shard.
                if !session.set_username(name) {
                    let current = session.username().unwrap_or_default().to_string();
                    return Err(RegisterError::AlreadyLoggedIn(current));
                }
                if !session.advance(Phase::Connecting, Phase::Connected) {
                    return Err(RegisterError::Closed);
                }
                slot.insert(Arc::clone(session));
                Ok(())
            }
        }
    }

    /// Remove the session's entry, if it still owns one.
    pub fn unregister(&self, session: &SessionHandle) -> bool {
        let Some(name) = session.username() else {
            return false;
        };
        self.users
            .remove_if(name, |_, held| held.id() == session.id())
            .is_some()
    }

    /// Find a logged-in session by exact username.
    pub fn lookup(&self, name: &str) -> Option<Arc<SessionHandle>> {
        self.users.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Queue `line` for every logged-in session except `sender`.
    ///
    /// Returns the number of sessions the line was queued for.
    pub fn broadcast_except(&self, sender: SessionId, line: &str) -> usize {
        // Collect first so no shard lock is held while queueing.
        let targets: Vec<Arc<SessionHandle>> = self
            .users
            .iter()
            .filter(|entry| entry.value().id() != sender)
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        targets.iter().filter(|target| target.send(line)).count()
    }

    /// `(username, peer)` for every logged-in session, ordered by username.
    pub fn snapshot(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .users
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().peer().to_string()))
            .collect();
        entries.sort();
        entries
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }
}
