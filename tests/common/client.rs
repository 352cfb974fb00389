//! Test chat client.
//!
//! Sends commands over TCP and asserts on the lines that come back.

use chat_proto::Command;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// A test chat client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl TestClient {
    /// Connect to a test server. The greeting is left unread.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// Send a raw line; a line terminator is added when missing.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with('\n') {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    pub async fn send(&mut self, cmd: Command) -> anyhow::Result<()> {
        self.send_raw(&cmd.to_string()).await
    }

    /// Receive one line (without its terminator).
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a line with a timeout. End of stream is an error.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        match self.try_recv_timeout(dur).await? {
            Some(line) => Ok(line),
            None => anyhow::bail!("connection closed"),
        }
    }

    /// Receive a line, or `None` once the server has closed the connection.
    pub async fn try_recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Receive lines until the predicate matches one.
    #[allow(dead_code)]
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<String>>
    where
        F: FnMut(&str) -> bool,
    {
        let mut lines = Vec::new();
        loop {
            let line = self.recv().await?;
            let done = predicate(&line);
            lines.push(line);
            if done {
                break;
            }
        }
        Ok(lines)
    }

    /// Expect the server to close the connection within `dur`.
    #[allow(dead_code)]
    pub async fn expect_closed(&mut self, dur: Duration) -> anyhow::Result<()> {
        match self.try_recv_timeout(dur).await? {
            None => Ok(()),
            Some(line) => anyhow::bail!("expected close, got {line:?}"),
        }
    }

    /// HELO and wait for `+OK <name>`.
    pub async fn login(&mut self, name: &str) -> anyhow::Result<()> {
        self.send(Command::Helo(name.to_string())).await?;
        let reply = self.recv().await?;
        anyhow::ensure!(reply == format!("+OK {name}"), "login as {name} failed: {reply}");
        Ok(())
    }

    /// Send QUIT and wait for the goodbye.
    #[allow(dead_code)]
    pub async fn quit(&mut self) -> anyhow::Result<()> {
        self.send(Command::Quit).await?;
        let reply = self.recv().await?;
        anyhow::ensure!(reply == "+OK Goodbye", "unexpected QUIT reply: {reply}");
        Ok(())
    }
}
