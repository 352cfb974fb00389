//! The Matrix - shared state of the chat server.
//!
//! One `Arc<Matrix>` is built at startup and handed to every session. It owns
//! the username registry, the group collection and the runtime settings, and
//! is the only place a session is torn down.

use crate::config::{Config, FaultConfig};
use crate::metrics;
use crate::state::{GroupManager, Registry, SessionHandle, SessionIdGenerator};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Settings sessions read at runtime.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Greeting text following `HELO`.
    pub welcome: String,
    /// Inbound line limit in bytes.
    pub max_line_len: usize,
    /// Capacity of each session's outbound queue.
    pub send_queue_len: usize,
    pub faults: FaultConfig,
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            welcome: config.server.welcome.clone(),
            max_line_len: config.server.max_line_len,
            send_queue_len: config.server.send_queue_len,
            faults: config.faults.clone(),
        }
    }
}

pub struct Matrix {
    pub registry: Registry,
    pub groups: GroupManager,
    pub ids: SessionIdGenerator,
    pub settings: Settings,
}

impl Matrix {
    pub fn new(config: &Config) -> Self {
        Self {
            registry: Registry::new(),
            groups: GroupManager::new(config.groups.unique_names),
            ids: SessionIdGenerator::new(),
            settings: Settings::from(config),
        }
    }

    /// Allocate an id and a handle for a freshly accepted connection.
    pub fn open_session(
        &self,
        peer: impl std::fmt::Display,
    ) -> (Arc<SessionHandle>, mpsc::Receiver<String>) {
        metrics::session_opened();
        SessionHandle::new(self.ids.next(), peer, self.settings.send_queue_len)
    }

    /// Finish `handle` and release everything it holds.
    ///
    /// Safe to call from any task, any number of times. Only the first call
    /// does the work and returns `true`.
    pub fn terminate(&self, handle: &SessionHandle, reason: &str) -> bool {
        if !handle.finish() {
            return false;
        }

        if self.registry.unregister(handle) {
            metrics::set_logged_in(self.registry.len());
        }
        let groups_left = self.groups.purge(handle.id());
        handle.close();
        metrics::session_closed();

        info!(
            session = %handle.id(),
            peer = %handle.peer(),
            user = handle.username().unwrap_or("-"),
            groups_left,
            reason,
            "Session terminated"
        );
        true
    }
}
