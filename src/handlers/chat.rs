//! BCST, PRIVATE and ALLCLIENTS.

use super::{Context, HandlerResult};
use crate::error::HandlerError;
use crate::metrics;
use chat_proto::{Reply, split_pair};
use tracing::debug;

/// Relay `text` to every other logged-in user.
pub(super) fn broadcast(ctx: &Context<'_>, text: &str) -> HandlerResult {
    let line = Reply::Broadcast {
        from: ctx.username().to_string(),
        text: text.to_string(),
    }
    .to_string();

    let recipients = ctx.matrix.registry.broadcast_except(ctx.handle.id(), &line);
    metrics::record_fanout(recipients);
    debug!(user = ctx.username(), recipients, "Broadcast relayed");

    Ok(Reply::ok())
}

/// `PRIVATE <target>-<text>`
pub(super) fn private(ctx: &Context<'_>, payload: &str) -> HandlerResult {
    let (target, text) = split_pair(payload).ok_or(HandlerError::PrivateFailed)?;
    let recipient = ctx
        .matrix
        .registry
        .lookup(target)
        .ok_or(HandlerError::PrivateFailed)?;

    let note = Reply::Private {
        from: ctx.username().to_string(),
        text: text.to_string(),
    };
    if !recipient.send(note.to_string()) {
        return Err(HandlerError::PrivateFailed);
    }

    Ok(Reply::ok_with(format!(
        "Private message has been sent to client: {target}"
    )))
}

pub(super) fn all_clients(ctx: &Context<'_>) -> HandlerResult {
    let listing = ctx
        .matrix
        .registry
        .snapshot()
        .into_iter()
        .map(|(user, peer)| format!("Username: {user} is connected to the server. Socket: {peer}"))
        .collect::<Vec<_>>()
        .join(" ");

    if listing.is_empty() {
        Ok(Reply::ok())
    } else {
        Ok(Reply::ok_with(listing))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;

    #[test]
    fn test_broadcast_fanout() {
        let m = matrix();
        let (a, mut rx_a) = user(&m, "A_user");
        let (_b, mut rx_b) = user(&m, "B_user");
        let (_c, mut rx_c) = user(&m, "C_user");

        assert_eq!(say(&m, &a, "BCST hi"), "+OK");
        assert!(rx_a.try_recv().is_err());
        assert_eq!(rx_b.try_recv().unwrap(), "BCST [A_user] hi");
        assert_eq!(rx_c.try_recv().unwrap(), "BCST [A_user] hi");
    }

    #[test]
    fn test_broadcast_skips_unregistered() {
        let m = matrix();
        let (a, _rx_a) = user(&m, "alice");
        let (_lurker, mut rx_l) = session(&m);

        assert_eq!(say(&m, &a, "BCST anyone?"), "+OK");
        assert!(rx_l.try_recv().is_err());
    }

    #[test]
    fn test_private_delivery() {
        let m = matrix();
        let (alice, mut rx_alice) = user(&m, "alice");
        let (_bob, mut rx_bob) = user(&m, "bob");

        assert_eq!(
            say(&m, &alice, "PRIVATE bob-see you at five-ish"),
            "+OK Private message has been sent to client: bob"
        );
        assert_eq!(
            rx_bob.try_recv().unwrap(),
            "alice has sent you a message: see you at five-ish"
        );
        assert!(rx_alice.try_recv().is_err());
    }

    #[test]
    fn test_private_failures() {
        let m = matrix();
        let (alice, _rx) = user(&m, "alice");

        assert_eq!(say(&m, &alice, "PRIVATE nobody-hi"), "-ERR Private message sending has failed.");
        assert_eq!(say(&m, &alice, "PRIVATE bob hi"), "-ERR Private message sending has failed.");
        // names are matched exactly
        let (_bob, _rx2) = user(&m, "bob");
        assert_eq!(say(&m, &alice, "PRIVATE BOB-hi"), "-ERR Private message sending has failed.");
    }

    #[test]
    fn test_all_clients_listing() {
        let m = matrix();
        let (bob, _rx1) = user(&m, "bob");
        let (_alice, _rx2) = user(&m, "alice");

        assert_eq!(
            say(&m, &bob, "ALLCLIENTS"),
            "+OK Username: alice is connected to the server. Socket: 127.0.0.1:40000 \
             Username: bob is connected to the server. Socket: 127.0.0.1:40000"
        );
    }
}
