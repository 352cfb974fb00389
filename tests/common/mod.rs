//! Integration test common infrastructure.
//!
//! Provides utilities for spawning the chatd binary and talking to it over
//! real TCP connections.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::{TestServer, TestServerOptions};
