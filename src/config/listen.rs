//! Network listener configuration.

use super::defaults::default_listen_address;
use serde::Deserialize;
use std::net::SocketAddr;

/// Network listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:1337").
    #[serde(default = "default_listen_address")]
    pub address: SocketAddr,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_listen_address(),
        }
    }
}
