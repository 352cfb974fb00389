//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds the listening socket and spawns one [`Session`] task per
//! accepted client. A failing session or a failed `accept()` never stops it.

use crate::network::Session;
use crate::state::Matrix;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, instrument};

/// The Gateway accepts incoming TCP connections and spawns sessions.
pub struct Gateway {
    listener: TcpListener,
    matrix: Arc<Matrix>,
}

impl Gateway {
    /// Bind the gateway to `addr`.
    pub async fn bind(addr: SocketAddr, matrix: Arc<Matrix>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(address = %listener.local_addr()?, "Listener bound");
        Ok(Self { listener, matrix })
    }

    /// The bound address (useful when binding port 0).
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        debug!(%addr, error = %e, "Failed to set TCP_NODELAY");
                    }
                    info!(%addr, "Connection accepted");

                    let matrix = Arc::clone(&self.matrix);
                    tokio::spawn(async move {
                        if let Err(e) = Session::new(stream, addr, matrix).run().await {
                            error!(%addr, error = %e, "Session error");
                        }
                        info!(%addr, "Connection closed");
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}
