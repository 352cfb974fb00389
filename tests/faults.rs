//! Fault simulation against a live server.

mod common;

use common::{TestServer, TestServerOptions};
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_forced_disconnect_within_window() -> anyhow::Result<()> {
    let server = TestServer::spawn_with(TestServerOptions {
        connection_loss: true,
        connection_loss_window: Some((1, 2)),
        ..Default::default()
    })
    .await?;

    let started = Instant::now();
    let mut client = server.login("doomed").await?;
    client.expect_closed(Duration::from_secs(5)).await?;
    assert!(started.elapsed() < Duration::from_secs(4));

    // the name is free again
    let mut next = server.connect().await?;
    next.login("doomed").await?;
    Ok(())
}

#[tokio::test]
async fn test_dropped_packets_lose_some_lines() -> anyhow::Result<()> {
    let server = TestServer::spawn_with(TestServerOptions {
        dropped_packets: true,
        ..Default::default()
    })
    .await?;

    // login replies may be dropped too, so log in without waiting on them
    let mut sender = server.connect().await?;
    sender.send_raw("HELO sender").await?;
    let mut receiver = server.connect().await?;
    receiver.send_raw("HELO receiver").await?;
    tokio::time::sleep(Duration::from_millis(200)).await;

    for i in 0..300 {
        sender.send_raw(&format!("BCST {i}")).await?;
    }

    let mut received = 0;
    while let Ok(Some(line)) = receiver.try_recv_timeout(Duration::from_millis(500)).await {
        if line.starts_with("BCST [sender]") {
            received += 1;
        }
    }
    assert!(received > 150, "received {received}");
    assert!(received < 300, "received {received}");
    Ok(())
}

#[tokio::test]
async fn test_corrupted_packets_only_overwrite_characters() -> anyhow::Result<()> {
    let server = TestServer::spawn_with(TestServerOptions {
        corrupted_packets: true,
        ..Default::default()
    })
    .await?;

    let mut sender = server.connect().await?;
    sender.send_raw("HELO sender").await?;
    let mut receiver = server.connect().await?;
    receiver.send_raw("HELO receiver").await?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    // skip the (possibly corrupted) login reply
    receiver.recv().await?;

    let expected = "BCST [sender] abcdefghijklmnopqrstuvwxyz";
    for _ in 0..200 {
        sender.send_raw("BCST abcdefghijklmnopqrstuvwxyz").await?;
    }

    let mut corrupted = 0;
    for _ in 0..200 {
        let line = receiver.recv().await?;
        assert_eq!(line.len(), expected.len());
        if line != expected {
            corrupted += 1;
            assert!(line.chars().zip(expected.chars()).all(|(a, b)| a == b || a == 'X'));
        }
    }
    assert!(corrupted > 0);
    assert!(corrupted < 200);
    Ok(())
}
