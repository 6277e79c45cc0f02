//! `MessageServer` builder and server loop.
//!
//! Ties together the layers: transport → protocol → submission handling →
//! store. Startup brings up persistence (degrading gracefully when the
//! database is unreachable), the loop accepts connections, and shutdown
//! releases the store so no further submissions are accepted.

use std::sync::Arc;

use messagemod_protocol::{Codec, JsonCodec};
use messagemod_store::{MessageStore, StoreError};
use messagemod_transport::{Transport, WebSocketTransport};
use tokio::sync::{mpsc, Notify};

use crate::handler::handle_connection;
use crate::submission::{run_submission_worker, Submission};
use crate::{Authenticator, MessageModError, ServerConfig};

/// Capacity of the queue between connection handlers and the submission
/// worker. Submissions are tiny; a small buffer is plenty.
const SUBMISSION_QUEUE_DEPTH: usize = 64;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<A: Authenticator, C: Codec> {
    pub(crate) store: Arc<MessageStore>,
    pub(crate) auth: A,
    pub(crate) codec: C,
    pub(crate) submissions: mpsc::Sender<Submission>,
}

/// Builder for configuring and starting a message submission server.
pub struct MessageServerBuilder {
    config: ServerConfig,
    store: Option<Arc<MessageStore>>,
}

impl MessageServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            store: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the SQLite URL for the message store.
    pub fn database_url(mut self, url: &str) -> Self {
        self.config.database_url = url.to_string();
        self
    }

    /// Replaces the whole configuration at once.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Supplies an externally owned store handle.
    ///
    /// The server still drives its lifecycle (initialize on start, close
    /// on shutdown); sharing the `Arc` lets the caller read back
    /// persisted messages.
    pub fn store(mut self, store: Arc<MessageStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Binds the transport and builds the server with the given
    /// authenticator. Uses `JsonCodec` for frames.
    pub async fn build(
        self,
        auth: impl Authenticator,
    ) -> Result<MessageServer<impl Authenticator, JsonCodec>, MessageModError>
    {
        let transport =
            WebSocketTransport::bind(&self.config.bind_addr).await?;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MessageStore::new()));
        let (submission_tx, submission_rx) =
            mpsc::channel(SUBMISSION_QUEUE_DEPTH);

        let state = Arc::new(ServerState {
            store,
            auth,
            codec: JsonCodec,
            submissions: submission_tx,
        });

        Ok(MessageServer {
            transport,
            state,
            database_url: self.config.database_url,
            submission_rx,
            shutdown: Arc::new(Notify::new()),
        })
    }
}

impl Default for MessageServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Requests a graceful stop of a running [`MessageServer`].
#[derive(Clone)]
pub struct ServerHandle {
    shutdown: Arc<Notify>,
}

impl ServerHandle {
    /// Signals the server loop to stop accepting connections and close
    /// the store. Idempotent.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

/// A running message submission server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct MessageServer<A: Authenticator, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<A, C>>,
    database_url: String,
    submission_rx: mpsc::Receiver<Submission>,
    shutdown: Arc<Notify>,
}

impl<A, C> MessageServer<A, C>
where
    A: Authenticator,
    C: Codec + Clone + 'static,
{
    /// Creates a new builder.
    pub fn builder() -> MessageServerBuilder {
        MessageServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns a handle that can stop the server from another task.
    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    /// Runs the server: startup, accept loop, shutdown.
    ///
    /// Startup initializes the store and verifies connectivity. A store
    /// failure is logged and the server keeps running in a degraded mode
    /// where every submission is answered with an error notice; it never
    /// blocks the host from starting.
    pub async fn run(mut self) -> Result<(), MessageModError> {
        match self.state.store.initialize(&self.database_url).await {
            Ok(()) => {
                if self.state.store.test_connection().await {
                    tracing::info!("database ready, submissions enabled");
                } else {
                    tracing::error!(
                        "database unreachable, submissions will be rejected"
                    );
                }
            }
            Err(StoreError::AlreadyInitialized) => {
                // The caller handed us a store it initialized itself;
                // use it as-is.
                tracing::info!("store already initialized, reusing it");
            }
            Err(e) => {
                tracing::error!(error = %e, "database initialization failed");
                tracing::warn!(
                    "running without persistence, submissions will be rejected"
                );
            }
        }

        // All decoding, validation, and persistence happens on this one
        // task, off the per-connection I/O tasks.
        let worker = tokio::spawn(run_submission_worker(
            Arc::clone(&self.state.store),
            self.state.codec.clone(),
            self.submission_rx,
        ));

        tracing::info!("message server running");

        loop {
            tokio::select! {
                _ = self.shutdown.notified() => {
                    tracing::info!("shutdown requested");
                    break;
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) =
                                handle_connection(conn, state).await
                            {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                }
            }
        }

        // No submissions are accepted past this point: the store rejects
        // them and the worker is torn down.
        self.state.store.close().await;
        worker.abort();
        tracing::info!("message server stopped");
        Ok(())
    }
}
