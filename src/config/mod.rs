//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, GroupsConfig, LogConfig)
//! - [`listen`]: Network listener configuration (ListenConfig)
//! - [`faults`]: Network fault simulation toggles (FaultConfig)
//! - [`validation`]: Startup validation of the loaded values

mod defaults;
mod faults;
mod listen;
mod types;
mod validation;

pub use faults::FaultConfig;
pub use listen::ListenConfig;
pub use types::{Config, ConfigError, GroupsConfig, LogConfig, ServerConfig};
pub use validation::{ValidationError, validate};
