//! Wire protocol for WordDuel.
//!
//! This crate defines the "language" that game clients and the session
//! server speak:
//!
//! - **Types** ([`Envelope`], [`ClientRequest`], [`ServerResponse`], etc.):
//!   the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw lines) and the rooms.
//! It doesn't know about connections or rooms; it only knows how to
//! serialize and deserialize messages.
//!
//! ```text
//! Transport (line) → Protocol (Envelope → ClientRequest) → Session Server
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    Answer, ClientRequest, CreateGame, Envelope, GameSettings, JoinGame, LeaderboardEntry, PlayerId,
    Recipient, RoomCode, ServerResponse, request_kind, response_kind,
};
