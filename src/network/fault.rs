//! Network fault simulation.
//!
//! Outgoing lines pass through [`FaultInjector::apply`], which may drop a line
//! (1 in 6) or overwrite some of its characters with `X` (1 in 4 of the lines
//! that survive). Separately, [`spawn_connection_loss`] arms a timer that
//! severs a session after a random delay.
//!
//! Faults are silent: neither side is told, only the log and metrics are.

use crate::config::FaultConfig;
use crate::metrics;
use crate::state::{Matrix, SessionHandle};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

const DROP_ONE_IN: u32 = 6;
const CORRUPT_ONE_IN: u32 = 4;
const CORRUPT_FIRST_MAX: usize = 4;
const CORRUPT_STEP_MAX: usize = 10;

/// Per-line drop/corrupt transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultInjector {
    drop: bool,
    corrupt: bool,
}

impl FaultInjector {
    pub fn new(config: &FaultConfig) -> Self {
        Self {
            drop: config.dropped_packets,
            corrupt: config.corrupted_packets,
        }
    }

    pub fn is_active(&self) -> bool {
        self.drop || self.corrupt
    }

    /// Pass `line` through the enabled faults. `None` means dropped.
    pub fn apply<R: Rng + ?Sized>(&self, line: String, rng: &mut R) -> Option<String> {
        if self.drop && rng.gen_range(0..DROP_ONE_IN) == 0 {
            metrics::record_fault("drop");
            debug!(fault = "drop", %line, "Dropped outgoing line");
            return None;
        }

        if self.corrupt && rng.gen_range(0..CORRUPT_ONE_IN) == 0 {
            let corrupted = corrupt(&line, rng);
            metrics::record_fault("corrupt");
            debug!(fault = "corrupt", original = %line, sent = %corrupted, "Corrupted outgoing line");
            return Some(corrupted);
        }

        Some(line)
    }
}

/// Overwrite characters of `line` with `X`, starting somewhere in the first
/// few characters and walking forward in random steps.
pub fn corrupt<R: Rng + ?Sized>(line: &str, rng: &mut R) -> String {
    let mut chars: Vec<char> = line.chars().collect();
    let mut offset = rng.gen_range(0..CORRUPT_FIRST_MAX);
    while offset < chars.len() {
        chars[offset] = 'X';
        offset += rng.gen_range(0..CORRUPT_STEP_MAX);
    }
    chars.into_iter().collect()
}

/// Arm a timer that terminates `handle` after a delay drawn from `[min, max)`.
///
/// The timer stands down early if the session closes on its own.
pub fn spawn_connection_loss(
    matrix: Arc<Matrix>,
    handle: Arc<SessionHandle>,
    min: Duration,
    max: Duration,
) -> JoinHandle<()> {
    let delay = if min < max {
        rand::thread_rng().gen_range(min..max)
    } else {
        min
    };

    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {
                if matrix.terminate(&handle, "connection loss") {
                    metrics::record_fault("disconnect");
                    debug!(
                        fault = "disconnect",
                        session = %handle.id(),
                        delay_ms = delay.as_millis() as u64,
                        "Forced disconnect"
                    );
                }
            }
            _ = handle.closed() => {}
        }
    })
}
