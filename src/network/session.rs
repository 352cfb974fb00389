//! Session - drives one client connection.
//!
//! ```text
//!   socket ──► FramedRead<LineCodec> ──► dispatch ──► replies ─┐
//!                     ▲                     │                  │
//!                     │ closed()            └─► other handles  ▼
//!              CancellationToken                        outbound queue
//!                     │                                        │
//!                     └──── writer task ◄── FaultInjector ◄────┘
//!                            FramedWrite<LineCodec>
//! ```
//!
//! The reader loop is the only place commands run, so replies for one client
//! are queued in command order. Lines from other sessions share the same
//! queue and are written by the same task.

use crate::handlers::{Context, dispatch};
use crate::network::fault::{self, FaultInjector};
use crate::state::{Matrix, Phase, SessionHandle};
use crate::metrics;
use chat_proto::{Command, LineCodec, Reply};
use futures_util::{SinkExt, StreamExt};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, WriteHalf};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{Span, debug, field, instrument, warn};

/// How long the writer keeps flushing queued lines after the session closed.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// A client session over any byte stream.
pub struct Session<S> {
    stream: S,
    peer: String,
    matrix: Arc<Matrix>,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    pub fn new(stream: S, peer: impl fmt::Display, matrix: Arc<Matrix>) -> Self {
        Self {
            stream,
            peer: peer.to_string(),
            matrix,
        }
    }

    /// Run the session until it finishes.
    ///
    /// Transport errors end the session; they are logged, not returned.
    #[instrument(skip(self), fields(session = field::Empty, peer = %self.peer), name = "session")]
    pub async fn run(self) -> anyhow::Result<()> {
        let Self { stream, peer, matrix } = self;
        let settings = &matrix.settings;

        let (handle, outbound) = matrix.open_session(&peer);
        Span::current().record("session", field::display(handle.id()));
        debug!("Session opened");

        let (read_half, write_half) = tokio::io::split(stream);
        let writer = tokio::spawn(write_loop(
            write_half,
            outbound,
            Arc::clone(&handle),
            Arc::clone(&matrix),
            FaultInjector::new(&settings.faults),
        ));

        handle.send(Reply::Greeting(settings.welcome.clone()).to_string());
        handle.advance(Phase::Init, Phase::Connecting);

        if settings.faults.connection_loss {
            let (min, max) = settings.faults.connection_loss_window();
            fault::spawn_connection_loss(Arc::clone(&matrix), Arc::clone(&handle), min, max);
        }

        let mut reader = FramedRead::new(read_half, LineCodec::with_max_len(settings.max_line_len));
        let reason = read_loop(&mut reader, &handle, &matrix).await;

        matrix.terminate(&handle, reason);
        drop(reader);
        if let Err(e) = writer.await {
            warn!(error = %e, "Writer task failed");
        }
        debug!(reason, "Session closed");
        Ok(())
    }
}

/// Read and dispatch lines until the session must end. Returns the reason.
async fn read_loop<R>(
    reader: &mut FramedRead<R, LineCodec>,
    handle: &Arc<SessionHandle>,
    matrix: &Matrix,
) -> &'static str
where
    R: AsyncRead + Unpin,
{
    let ctx = Context::new(matrix, handle);

    loop {
        tokio::select! {
            biased;

            _ = handle.closed() => {
                return if handle.overflowed() { "send queue full" } else { "closed" };
            }

            next = reader.next() => match next {
                Some(Ok(line)) => {
                    debug!(direction = "in", user = handle.username().unwrap_or("-"), %line);

                    let command = Command::parse(&line);
                    let quit = command == Command::Quit;
                    let outcome = dispatch(&ctx, command);
                    for reply in outcome.replies {
                        handle.send(reply.to_string());
                    }
                    if outcome.finish {
                        return if quit { "quit" } else { "invalid username" };
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Read error");
                    return "read error";
                }
                None => return "eof",
            },
        }
    }
}

/// Drain the outbound queue into the socket until the session closes.
///
/// Lines queued before the close are still written, then the write side is
/// shut down. A peer that stops reading gets [`CLOSE_GRACE`] after the close
/// before the remaining output is abandoned.
async fn write_loop<W>(
    write_half: WriteHalf<W>,
    mut outbound: mpsc::Receiver<String>,
    handle: Arc<SessionHandle>,
    matrix: Arc<Matrix>,
    faults: FaultInjector,
) where
    W: AsyncRead + AsyncWrite,
{
    let mut writer = FramedWrite::new(write_half, LineCodec::new());
    let mut rng = faults.is_active().then(StdRng::from_entropy);

    let drain = async {
        loop {
            let line = tokio::select! {
                biased;

                line = outbound.recv() => match line {
                    Some(line) => line,
                    None => break,
                },
                _ = handle.closed() => break,
            };

            let line = match rng.as_mut() {
                Some(rng) => match faults.apply(line, rng) {
                    Some(line) => line,
                    None => continue,
                },
                None => line,
            };

            debug!(direction = "out", user = handle.username().unwrap_or("-"), %line);
            if let Err(e) = writer.send(line).await {
                debug!(error = %e, "Write failed");
                matrix.terminate(&handle, "write error");
                return;
            }
            metrics::record_line_sent();
        }

        if let Err(e) = writer.close().await {
            debug!(error = %e, "Shutdown failed");
        }
    };

    let stalled = async {
        handle.closed().await;
        tokio::time::sleep(CLOSE_GRACE).await;
    };

    tokio::select! {
        biased;

        () = drain => {}
        () = stalled => {
            debug!("Peer stopped reading, abandoning output");
        }
    }
}
