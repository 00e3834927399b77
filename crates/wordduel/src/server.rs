//! `WordDuelServer` builder and server loop.
//!
//! This is the entry point for running a WordDuel server. It ties
//! together all the layers: transport → protocol → rooms → win store.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use wordduel_protocol::{Codec, JsonCodec};
use wordduel_room::RoomManager;
use wordduel_store::{DEFAULT_LEADERBOARD_LIMIT, WinStore};
use wordduel_transport::{LineTransport, Transport};
use wordduel_words::WordSource;

use crate::WordDuelError;
use crate::handler::handle_connection;

/// Address the server binds to unless told otherwise.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:55555";

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `host:port` to listen on. Port 0 picks a free port.
    pub bind_addr: String,

    /// Rows returned for `GET_LEADERBOARD`.
    pub leaderboard_limit: usize,

    /// Close a connection that sends nothing for this long. `None`
    /// waits forever.
    pub idle_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
            idle_timeout: None,
        }
    }
}

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks.
/// Interior mutability via `Mutex` where needed.
pub(crate) struct ServerState<S: WinStore, C: Codec> {
    pub(crate) rooms: Mutex<RoomManager>,
    pub(crate) words: Box<dyn WordSource>,
    pub(crate) store: S,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a WordDuel server.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use wordduel::prelude::*;
///
/// # async fn run(words: WordLists) -> Result<(), WordDuelError> {
/// let server = WordDuelServerBuilder::new()
///     .bind("0.0.0.0:55555")
///     .idle_timeout(Some(Duration::from_secs(600)))
///     .build(words, JsonFileStore::open("wins.json").await?)
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct WordDuelServerBuilder {
    config: ServerConfig,
}

impl WordDuelServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets how many rows `GET_LEADERBOARD` returns.
    pub fn leaderboard_limit(mut self, limit: usize) -> Self {
        self.config.leaderboard_limit = limit;
        self
    }

    /// Sets the idle timeout. `None` disables it.
    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and assembles the server.
    ///
    /// Uses `JsonCodec` and `LineTransport`.
    pub async fn build<S: WinStore>(
        self,
        words: impl WordSource,
        store: S,
    ) -> Result<WordDuelServer<S, JsonCodec>, WordDuelError> {
        let transport = LineTransport::bind(&self.config.bind_addr).await?;

        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomManager::new()),
            words: Box::new(words),
            store,
            codec: JsonCodec,
            config: self.config,
        });

        Ok(WordDuelServer { transport, state })
    }
}

/// A bound WordDuel server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct WordDuelServer<S: WinStore, C: Codec> {
    transport: LineTransport,
    state: Arc<ServerState<S, C>>,
}

impl<S: WinStore, C: Codec> WordDuelServer<S, C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the server's configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each accepted connection. Runs until
    /// the process is terminated; a failed accept is logged and the loop
    /// carries on.
    pub async fn run(mut self) -> Result<(), WordDuelError> {
        match self.transport.local_addr() {
            Ok(addr) => tracing::info!(%addr, "WordDuel server listening"),
            Err(e) => tracing::warn!(error = %e, "WordDuel server running, address unknown"),
        }

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
