//! Unified error type for the WordDuel server.

use wordduel_protocol::ProtocolError;
use wordduel_room::RoomError;
use wordduel_store::StoreError;
use wordduel_transport::TransportError;
use wordduel_words::WordError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WordDuelError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The word lists couldn't be loaded or are unusable.
    #[error(transparent)]
    Words(#[from] WordError),

    /// A room-level error (full, not found, invalid settings).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The win store couldn't be opened.
    #[error(transparent)]
    Store(#[from] StoreError),
}
