//! Chat command handlers.
//!
//! [`dispatch`] routes one parsed [`Command`] to its handler and turns the
//! result into the lines owed to the caller. Handlers never touch the socket:
//! replies for the caller are returned, lines for other sessions are queued on
//! their handles.

mod chat;
mod group;
mod login;

use crate::error::HandlerError;
use crate::metrics;
use crate::state::{Matrix, Phase, SessionHandle};
use chat_proto::{Command, Reply};
use std::sync::Arc;
use tracing::debug;

pub type HandlerResult = Result<Reply, HandlerError>;

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// Shared server state.
    pub matrix: &'a Matrix,
    /// The calling session.
    pub handle: &'a Arc<SessionHandle>,
}

impl<'a> Context<'a> {
    pub fn new(matrix: &'a Matrix, handle: &'a Arc<SessionHandle>) -> Self {
        Self { matrix, handle }
    }

    /// The caller's username. Only valid past the login check in [`dispatch`].
    fn username(&self) -> &str {
        self.handle.username().unwrap_or_default()
    }
}

/// What the session loop must do after a command.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Lines for the caller, in order.
    pub replies: Vec<Reply>,
    /// Finish the session once the replies are queued.
    pub finish: bool,
}

impl Outcome {
    fn reply(reply: Reply) -> Self {
        Self {
            replies: vec![reply],
            finish: false,
        }
    }

    fn finish_after(reply: Reply) -> Self {
        Self {
            replies: vec![reply],
            finish: true,
        }
    }
}

/// Run one command for the session in `ctx`.
pub fn dispatch(ctx: &Context<'_>, command: Command) -> Outcome {
    let name = command.name();
    metrics::record_command(name);

    if command == Command::Quit {
        return Outcome::finish_after(Reply::ok_with("Goodbye"));
    }

    let result = if !command.allowed_before_login() && ctx.handle.phase() != Phase::Connected {
        Err(HandlerError::NotLoggedIn)
    } else {
        route(ctx, command)
    };

    match result {
        Ok(reply) => Outcome::reply(reply),
        Err(err) => {
            metrics::record_command_error(name, err.error_code());
            debug!(
                session = %ctx.handle.id(),
                command = name,
                error = %err,
                "Command rejected"
            );
            let reply = err.to_reply();
            if err.is_fatal() {
                Outcome::finish_after(reply)
            } else {
                Outcome::reply(reply)
            }
        }
    }
}

fn route(ctx: &Context<'_>, command: Command) -> HandlerResult {
    match command {
        Command::Helo(name) => login::helo(ctx, &name),
        Command::Bcst(text) => chat::broadcast(ctx, &text),
        Command::Private(payload) => chat::private(ctx, &payload),
        Command::AllClients => chat::all_clients(ctx),
        Command::NewGroup(name) => group::new_group(ctx, &name),
        Command::AllGroups => group::all_groups(ctx),
        Command::JoinGroup(name) => group::join_group(ctx, &name),
        Command::QuitGroup(name) => group::quit_group(ctx, &name),
        Command::KickUser(payload) => group::kick_user(ctx, &payload),
        Command::Unknown(keyword) => Err(HandlerError::UnknownCommand(keyword)),
        // answered in dispatch
        Command::Quit => Ok(Reply::ok_with("Goodbye")),
    }
}
