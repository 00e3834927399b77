//! Transport abstraction layer for WordDuel.
//!
//! Provides the [`Transport`] and [`Connection`] traits so the session
//! server only ever sees "a thing that yields connections" and "a thing
//! that sends and receives whole messages".
//!
//! # Feature Flags
//!
//! - `tcp` (default): newline-delimited messages over plain TCP
//!   ([`LineTransport`], [`LineConnection`])

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "tcp")]
mod line;

pub use error::TransportError;
#[cfg(feature = "tcp")]
pub use line::{LineConnection, LineTransport, MAX_LINE_BYTES};

use std::fmt;

/// Opaque identifier for a connection.
///
/// The session server uses this as the identity key for every per-player
/// map, so it must be unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that can send and receive whole messages.
///
/// Framing is the transport's business: callers hand in one encoded
/// message and get one encoded message back.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one message to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the sending side of the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
