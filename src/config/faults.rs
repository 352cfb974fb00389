//! Network fault simulation configuration.
//!
//! All three simulations are independent and disabled by default:
//! - `connection_loss`: each session is severed after a random delay in
//!   `[connection_loss_min_secs, connection_loss_max_secs)` seconds
//! - `dropped_packets`: roughly one outgoing line in six is discarded
//! - `corrupted_packets`: roughly one outgoing line in four gets characters
//!   overwritten

use super::defaults::{default_connection_loss_max_secs, default_connection_loss_min_secs};
use serde::Deserialize;
use std::time::Duration;

/// Fault simulation toggles.
#[derive(Debug, Clone, Deserialize)]
pub struct FaultConfig {
    /// Forcibly disconnect every session after a random delay.
    #[serde(default)]
    pub connection_loss: bool,
    /// Silently drop some outgoing lines.
    #[serde(default)]
    pub dropped_packets: bool,
    /// Corrupt some outgoing lines.
    #[serde(default)]
    pub corrupted_packets: bool,
    /// Lower bound (inclusive) of the forced disconnect delay, in seconds.
    #[serde(default = "default_connection_loss_min_secs")]
    pub connection_loss_min_secs: u64,
    /// Upper bound (exclusive) of the forced disconnect delay, in seconds.
    #[serde(default = "default_connection_loss_max_secs")]
    pub connection_loss_max_secs: u64,
}

impl FaultConfig {
    /// Forced disconnect delay window as durations.
    pub fn connection_loss_window(&self) -> (Duration, Duration) {
        (
            Duration::from_secs(self.connection_loss_min_secs),
            Duration::from_secs(self.connection_loss_max_secs),
        )
    }
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            connection_loss: false,
            dropped_packets: false,
            corrupted_packets: false,
            connection_loss_min_secs: default_connection_loss_min_secs(),
            connection_loss_max_secs: default_connection_loss_max_secs(),
        }
    }
}
