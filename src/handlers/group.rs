//! Group commands: NEWGROUP, ALLGROUPS, JOINGROUP, QUITGROUP, KICKUSER.

use super::{Context, HandlerResult};
use crate::error::HandlerError;
use crate::state::{GroupError, Member};
use chat_proto::{Reply, split_pair};
use tracing::{debug, info};

pub(super) fn new_group(ctx: &Context<'_>, name: &str) -> HandlerResult {
    ctx.matrix
        .groups
        .create(name, ctx.handle.id())
        .map_err(|err| match err {
            GroupError::NameMissing => HandlerError::GroupNameMissing,
            _ => HandlerError::GroupExists(name.to_string()),
        })?;

    info!(group = name, owner = ctx.username(), "Group created");
    let same_name = ctx.matrix.groups.find_by_name_case_insensitive(name).len();
    if same_name > 1 {
        debug!(group = name, same_name, "Group name shared, JOINGROUP picks the oldest");
    }
    Ok(Reply::ok_with(format!(
        "New group with the name {name} has been added."
    )))
}

pub(super) fn all_groups(ctx: &Context<'_>) -> HandlerResult {
    let groups = ctx.matrix.groups.snapshot();
    if groups.is_empty() {
        return Ok(Reply::ok());
    }

    let listing = groups
        .iter()
        .map(|(name, members)| format!("Group: {name}, has {members} participants."))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(Reply::ok_with(listing))
}

pub(super) fn join_group(ctx: &Context<'_>, name: &str) -> HandlerResult {
    let member = Member::new(ctx.handle.id(), ctx.username());
    let joined = ctx
        .matrix
        .groups
        .join(name, member)
        .map_err(|_| HandlerError::GroupNotFound(name.to_string()))?;

    debug!(group = %joined, user = ctx.username(), "Joined group");
    Ok(Reply::ok_with(format!(
        "You have been added to the group: {joined}"
    )))
}

pub(super) fn quit_group(ctx: &Context<'_>, name: &str) -> HandlerResult {
    match ctx.matrix.groups.leave(name, ctx.handle.id()) {
        Ok(_) => Ok(Reply::ok_with(format!(
            "You are no longer a participant in this group: {name}"
        ))),
        Err(GroupError::NotMember(_)) => Err(HandlerError::NotInGroup(name.to_string())),
        Err(_) => Err(HandlerError::NoSuchGroup(name.to_string())),
    }
}

/// `KICKUSER <group>-<user>`. The kicked user is not told.
pub(super) fn kick_user(ctx: &Context<'_>, payload: &str) -> HandlerResult {
    let (group, target) = split_pair(payload).ok_or(HandlerError::KickFailed)?;

    if let Err(err) = ctx.matrix.groups.kick(group, ctx.handle.id(), target) {
        debug!(group, target, kicker = ctx.username(), error = %err, "Kick refused");
        return Err(HandlerError::KickFailed);
    }

    info!(group, target, kicker = ctx.username(), "User kicked from group");
    Ok(Reply::ok_with(format!(
        "User {payload} has been kicked from the group"
    )))
}
