//! Network module.
//!
//! Contains the Gateway (TCP listener), the per-connection Session and the
//! fault injector applied to outgoing traffic.

pub mod fault;
mod gateway;
mod session;

pub use fault::FaultInjector;
pub use gateway::Gateway;
pub use session::Session;
