//! HELO.

use super::{Context, HandlerResult};
use crate::error::HandlerError;
use crate::metrics;
use chat_proto::{Reply, UsernameExt};
use tracing::{debug, info};

pub(super) fn helo(ctx: &Context<'_>, name: &str) -> HandlerResult {
    if ctx.handle.username().is_some() {
        return Err(HandlerError::AlreadyLoggedIn);
    }
    if !name.is_valid_username() {
        return Err(HandlerError::InvalidUsername(name.to_string()));
    }

    match ctx.matrix.registry.try_register(name, ctx.handle) {
        Ok(()) => {
            metrics::set_logged_in(ctx.matrix.registry.len());
            info!(session = %ctx.handle.id(), user = name, peer = %ctx.handle.peer(), "User logged in");
            Ok(Reply::ok_with(name))
        }
        Err(err) => {
            debug!(session = %ctx.handle.id(), user = name, error = %err, "Login refused");
            Err(HandlerError::AlreadyLoggedIn)
        }
    }
}
