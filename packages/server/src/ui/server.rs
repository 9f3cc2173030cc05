//! Server execution logic: bind, accept loop, shutdown sequence.

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use tokio::net::TcpListener;

use crate::{
    config::ServerConfig,
    domain::{TranscriptBuffer, TranscriptStore},
    error::ServerError,
    infrastructure::ConnectionRegistry,
    usecase::{BroadcastUseCase, FlushTranscriptUseCase, ShutdownContext, ShutdownCoordinator},
};

use super::{handler::handle_connection, state::ServerState};

/// Pause after a failed `accept()` before trying again
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// TCP chat relay server
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(FileTranscriptStore::new(&config.transcript_path));
/// let server = Server::bind(config, store).await?;
/// server.run(shutdown_signal()).await;
/// ```
pub struct Server {
    listener: TcpListener,
    state: Arc<ServerState>,
    flush_usecase: Arc<FlushTranscriptUseCase>,
    coordinator: Arc<ShutdownCoordinator>,
}

impl Server {
    /// Bind the listening socket and wire up the shared state.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address is unavailable or in use.
    pub async fn bind(
        config: ServerConfig,
        store: Arc<dyn TranscriptStore>,
    ) -> Result<Self, ServerError> {
        let bind_addr = config.bind_addr();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        let registry = Arc::new(ConnectionRegistry::new());
        let transcript = Arc::new(TranscriptBuffer::new());
        let shutdown = ShutdownContext::new();

        let broadcast_usecase = Arc::new(BroadcastUseCase::new(
            registry.clone(),
            transcript.clone(),
        ));
        let flush_usecase = Arc::new(FlushTranscriptUseCase::new(transcript, store));
        let coordinator = Arc::new(ShutdownCoordinator::new(
            shutdown.clone(),
            registry.clone(),
        ));

        let state = Arc::new(ServerState {
            config,
            local_addr,
            registry,
            broadcast_usecase,
            shutdown,
        });

        Ok(Self {
            listener,
            state,
            flush_usecase,
            coordinator,
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.state.local_addr
    }

    /// Registry of joined connections
    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        self.state.registry.clone()
    }

    /// Coordinator that drains the server; `initiate()` may be called from anywhere
    pub fn shutdown_coordinator(&self) -> Arc<ShutdownCoordinator> {
        self.coordinator.clone()
    }

    /// Accept connections until `shutdown_signal` resolves, then drain.
    ///
    /// After the signal: every connection gets the shutdown notice and is
    /// closed, the listener is dropped, handlers are awaited for at most
    /// `shutdown_timeout`, and a last transcript flush runs.
    pub async fn run<F>(self, shutdown_signal: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            listener,
            state,
            flush_usecase,
            coordinator,
        } = self;

        tracing::info!(
            "Server started and is listening on IP: {} and Port: {}",
            state.local_addr.ip(),
            state.local_addr.port()
        );
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        let signal_task = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                shutdown_signal.await;
                coordinator.initiate().await;
            })
        };

        let flush_task = tokio::spawn(
            flush_usecase
                .clone()
                .run_periodic(state.config.flush_interval, state.shutdown.token()),
        );

        accept_loop(listener, &state).await;

        coordinator
            .wait_for_handlers(state.config.shutdown_timeout)
            .await;

        signal_task.abort();
        if let Err(e) = flush_task.await {
            tracing::warn!("Transcript flush task ended abnormally: {}", e);
        }
        match flush_usecase.execute().await {
            Ok(0) => {}
            Ok(n) => tracing::info!("Conversation backed up ({} line(s)) before exit", n),
            Err(e) => tracing::error!("Final transcript flush failed: {}", e),
        }

        tracing::info!("Server shutdown complete");
    }
}

/// Accept until the shutdown token is cancelled; the listener is closed on return
async fn accept_loop(listener: TcpListener, state: &Arc<ServerState>) {
    let token = state.shutdown.token();
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer_addr)) => {
                    tracing::debug!("Accepted connection from {}", peer_addr);
                    state
                        .shutdown
                        .tracker()
                        .spawn(handle_connection(state.clone(), stream, peer_addr));
                }
                Err(e) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }
    tracing::info!("Stopped accepting connections");
}
