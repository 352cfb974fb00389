//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::net::SocketAddr;

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_welcome() -> String {
    "Welcome to the chat server".to_string()
}

pub fn default_max_line_len() -> usize {
    chat_proto::DEFAULT_MAX_LINE_LEN
}

pub fn default_send_queue_len() -> usize {
    1024
}

// =============================================================================
// Listen Defaults
// =============================================================================

pub fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 1337))
}

// =============================================================================
// Fault Simulation Defaults
// =============================================================================

pub fn default_connection_loss_min_secs() -> u64 {
    10
}

pub fn default_connection_loss_max_secs() -> u64 {
    20
}
