//! Test server management.
//!
//! Spawns and manages chatd instances for integration testing.

use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// Knobs written into the generated config file.
#[derive(Debug, Clone, Default)]
pub struct TestServerOptions {
    pub connection_loss: bool,
    pub dropped_packets: bool,
    pub corrupted_packets: bool,
    /// Forced disconnect window in seconds, `(min, max)`.
    pub connection_loss_window: Option<(u64, u64)>,
    pub unique_group_names: bool,
}

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    // Removed on drop together with the config file.
    _data_dir: TempDir,
}

impl TestServer {
    /// Spawn a server with default settings (no faults).
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(TestServerOptions::default()).await
    }

    pub async fn spawn_with(options: TestServerOptions) -> anyhow::Result<Self> {
        let port = free_port()?;
        let data_dir = tempfile::tempdir()?;
        let (loss_min, loss_max) = options.connection_loss_window.unwrap_or((10, 20));

        let config_path = data_dir.path().join("config.toml");
        let config_content = format!(
            r#"
[server]
welcome = "Welcome to the chat server"

[listen]
address = "127.0.0.1:{port}"

[faults]
connection_loss = {}
dropped_packets = {}
corrupted_packets = {}
connection_loss_min_secs = {loss_min}
connection_loss_max_secs = {loss_max}

[groups]
unique_names = {}

[log]
ansi = false
"#,
            options.connection_loss,
            options.dropped_packets,
            options.corrupted_packets,
            options.unique_group_names,
        );
        std::fs::write(&config_path, config_content)?;

        let child = Command::new(env!("CARGO_BIN_EXE_chatd"))
            .arg(&config_path)
            .env("RUST_LOG", "warn")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let server = Self {
            child,
            port,
            _data_dir: data_dir,
        };
        server.wait_until_ready().await?;
        Ok(server)
    }

    /// Wait until the server is accepting connections.
    ///
    /// Probes by reading the greeting so the probe session ends cleanly.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if let Ok(mut probe) = super::client::TestClient::connect(&self.address()).await
                && probe.recv().await.is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Connect and consume the greeting.
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        let mut client = super::client::TestClient::connect(&self.address()).await?;
        let greeting = client.recv().await?;
        anyhow::ensure!(greeting.starts_with("HELO "), "unexpected greeting: {greeting}");
        Ok(client)
    }

    /// Connect and log in as `name`.
    pub async fn login(&self, name: &str) -> anyhow::Result<super::client::TestClient> {
        let mut client = self.connect().await?;
        client.login(name).await?;
        Ok(client)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Ask the OS for a port that is free right now.
fn free_port() -> anyhow::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}
