//! Shared per-session handle and lifecycle phase.
//!
//! The handle is the only thing other sessions ever see of a connection: the
//! registry stores `Arc<SessionHandle>` for logged-in users and groups store
//! the bare [`SessionId`]. It never points back at shared state, so dropping a
//! session cannot leave a reference cycle behind.
//!
//! ## Lifecycle
//!
//! ```text
//! ┌──────┐ greeting ┌────────────┐  HELO ok  ┌───────────┐
//! │ Init ├─────────►│ Connecting ├──────────►│ Connected │
//! └──┬───┘          └─────┬──────┘           └─────┬─────┘
//!    │                    │ bad name / EOF / kill  │ QUIT / EOF / kill
//!    └────────────────────┴────────────►┌──────────┴┐
//!                                       │ Finished  │
//!                                       └───────────┘
//! ```
//!
//! Phases only move forward. `Finished` is reached exactly once, by whichever
//! caller wins [`SessionHandle::finish`].

use crate::state::SessionId;
use std::fmt;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::warn;

/// Protocol phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Phase {
    Init = 0,
    Connecting = 1,
    Connected = 2,
    Finished = 3,
}

impl Phase {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Phase::Init,
            1 => Phase::Connecting,
            2 => Phase::Connected,
            _ => Phase::Finished,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Init => "INIT",
            Phase::Connecting => "CONNECTING",
            Phase::Connected => "CONNECTED",
            Phase::Finished => "FINISHED",
        })
    }
}

/// Outbound side of a session, shared with the registry.
pub struct SessionHandle {
    id: SessionId,
    /// Remote socket address (or another transport descriptor).
    peer: String,
    username: OnceLock<String>,
    phase: AtomicU8,
    outbound: mpsc::Sender<String>,
    /// Set when a send found the queue full.
    overflowed: AtomicBool,
    closed: CancellationToken,
}

impl SessionHandle {
    /// Create a handle in phase `Init` along with the receiving end of its
    /// outbound line queue, which holds at most `queue_len` lines.
    pub fn new(
        id: SessionId,
        peer: impl fmt::Display,
        queue_len: usize,
    ) -> (Arc<Self>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(queue_len.max(1));
        let handle = Arc::new(Self {
            id,
            peer: peer.to_string(),
            username: OnceLock::new(),
            phase: AtomicU8::new(Phase::Init as u8),
            outbound: tx,
            overflowed: AtomicBool::new(false),
            closed: CancellationToken::new(),
        });
        (handle, rx)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// The login name, once HELO succeeded.
    pub fn username(&self) -> Option<&str> {
        self.username.get().map(String::as_str)
    }

    /// Set the login name. Fails if one is already set.
    pub(crate) fn set_username(&self, name: &str) -> bool {
        self.username.set(name.to_string()).is_ok()
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn is_finished(&self) -> bool {
        self.phase() == Phase::Finished
    }

    /// Move from `from` to `to`. Fails if the session is not in `from` or if
    /// the move would go backwards.
    pub fn advance(&self, from: Phase, to: Phase) -> bool {
        if to <= from {
            return false;
        }
        self.phase
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Enter `Finished`. Returns `true` only for the caller that performed the
    /// transition.
    pub fn finish(&self) -> bool {
        self.phase.swap(Phase::Finished as u8, Ordering::AcqRel) != Phase::Finished as u8
    }

    /// Queue a line for this session's writer without waiting.
    ///
    /// Lines queued by one caller arrive in the order they were queued.
    /// Returns `false` once the session has finished or closed. A full queue
    /// means the peer stopped reading: the line is dropped and the session is
    /// closed, leaving cleanup to its reader.
    pub fn send(&self, line: impl Into<String>) -> bool {
        if self.is_finished() || self.is_closed() {
            return false;
        }
        match self.outbound.try_send(line.into()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                if !self.overflowed.swap(true, Ordering::AcqRel) {
                    warn!(
                        session = %self.id,
                        user = self.username().unwrap_or("-"),
                        "Send queue full, closing session"
                    );
                }
                self.close();
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Whether a send ever found the outbound queue full.
    pub fn overflowed(&self) -> bool {
        self.overflowed.load(Ordering::Acquire)
    }

    /// Signal the reader and writer tasks to stop.
    pub(crate) fn close(&self) {
        self.closed.cancel();
    }

    /// Resolves once the session has been closed.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.closed.cancelled()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .field("username", &self.username())
            .field("phase", &self.phase())
            .finish()
    }
}
