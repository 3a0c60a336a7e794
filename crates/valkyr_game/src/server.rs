//! TCP accept loop and per-connection message pump.

use crate::config::GameConfig;
use crate::context::ServerContext;
use crate::dispatch::DispatchTable;
use crate::error::ServerError;
use crate::handlers::build_dispatch_table;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use valkyr_proto::{read_frame, write_frame, ProtoError};

/// The core game server.
///
/// Owns the listener configuration, the shared context, and the dispatch
/// table. One tokio task serves each accepted connection; messages on a
/// single connection are processed strictly in arrival order while
/// different connections run fully concurrently.
pub struct GameServer {
    config: GameConfig,
    ctx: Arc<ServerContext>,
    dispatch: Arc<DispatchTable>,
    shutdown_sender: broadcast::Sender<()>,
}

impl GameServer {
    /// Creates the server, building the dispatch table.
    ///
    /// A duplicate opcode registration surfaces here and aborts startup.
    pub fn new(config: GameConfig, ctx: Arc<ServerContext>) -> Result<Self, ServerError> {
        let dispatch = Arc::new(build_dispatch_table()?);
        let (shutdown_sender, _) = broadcast::channel(1);
        Ok(Self {
            config,
            ctx,
            dispatch,
            shutdown_sender,
        })
    }

    /// Binds the listener and runs the accept loop until shutdown.
    pub async fn start(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.bind_address)
            .await
            .map_err(|e| ServerError::Network(format!("bind {}: {e}", self.config.bind_address)))?;
        info!("🚀 Game server listening on {}", self.config.bind_address);
        info!(
            "✅ Dispatch table sealed with {} handlers",
            self.dispatch.handler_count()
        );

        let mut shutdown_receiver = self.shutdown_sender.subscribe();
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            let ctx = self.ctx.clone();
                            let dispatch = self.dispatch.clone();
                            tokio::spawn(async move {
                                handle_connection(ctx, dispatch, stream, addr).await;
                            });
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {e}");
                        }
                    }
                }
                _ = shutdown_receiver.recv() => {
                    info!("Shutdown signal received, stopping accept loop");
                    break;
                }
            }
        }
        info!("Game server stopped");
        Ok(())
    }

    /// Signals the accept loop to stop.
    pub fn shutdown(&self) {
        let _ = self.shutdown_sender.send(());
    }

    pub fn context(&self) -> Arc<ServerContext> {
        self.ctx.clone()
    }
}

/// Serves one client connection to completion.
///
/// The read loop awaits each dispatch before reading the next frame, so a
/// connection's messages are handled in arrival order. A writer task
/// drains the session's outbound queue independently so slow sends never
/// block dispatch of other connections.
async fn handle_connection(
    ctx: Arc<ServerContext>,
    dispatch: Arc<DispatchTable>,
    stream: TcpStream,
    addr: std::net::SocketAddr,
) {
    let (mut read_half, mut write_half) = stream.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = ctx.sessions.register(addr, tx);
    info!("🔌 Connection {} accepted from {addr}", session.id);

    let writer_session_id = session.id;
    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = write_frame(&mut write_half, &frame).await {
                debug!(session = writer_session_id, "outbound write failed: {e}");
                break;
            }
        }
    });

    loop {
        match read_frame(&mut read_half).await {
            Ok(frame) => {
                // Payload-level decode failures are handled (and logged)
                // inside dispatch; the connection stays open.
                dispatch.dispatch(&ctx, &session, &frame).await;
            }
            Err(e) if e.is_eof() => {
                debug!(session = session.id, "client closed connection");
                break;
            }
            Err(ProtoError::Io(e)) => {
                debug!(session = session.id, "transport error: {e}");
                break;
            }
            Err(e) => {
                // Frame-level corruption means the stream can no longer be
                // re-synchronized; drop the connection, not the process.
                warn!(session = session.id, "unrecoverable framing error: {e}");
                break;
            }
        }
    }

    ctx.sessions.remove(session.id).await;
    writer.abort();
    info!("🔌 Connection {} from {addr} closed", session.id);
}
