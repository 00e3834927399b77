//! Error types for the room layer.

use wordduel_protocol::{PlayerId, RoomCode};

/// Errors that can occur during room operations.
///
/// Every variant is recoverable: the session server turns it into an
/// `INVALID_REQUEST` carrying [`reason`](RoomError::reason).
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room is registered under this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The room already has two players.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// Another player in the room already uses this nickname.
    #[error("nickname {0:?} is taken")]
    NicknameTaken(String),

    /// A room is already registered under this code.
    #[error("room code {0} is taken")]
    CodeTaken(RoomCode),

    /// The player is already in a room.
    #[error("player {0} is already in a room")]
    AlreadyInRoom(PlayerId),

    /// The player is not in this (or any) room.
    #[error("player {0} is not in a room")]
    NotInRoom(PlayerId),

    /// The player already reported a result for the current round.
    #[error("player {0} already answered this round")]
    AlreadyAnswered(PlayerId),

    /// The room is waiting for a guest; there is no round to answer.
    #[error("no active round")]
    NoActiveRound,

    /// The match is over.
    #[error("game already finished")]
    GameFinished,

    /// The create request's settings cannot be played.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// The room's actor is gone or its command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}

impl RoomError {
    /// The human-readable reason sent to the client.
    pub fn reason(&self) -> String {
        match self {
            Self::NotFound(_) => "Room not found".into(),
            Self::RoomFull(_) => "Room full".into(),
            Self::NicknameTaken(_) => "Nickname taken".into(),
            Self::CodeTaken(_) => "Room code taken".into(),
            Self::AlreadyInRoom(_) => "Already in a room".into(),
            Self::NotInRoom(_) => "Not in a room".into(),
            Self::AlreadyAnswered(_) => "Answer already recorded".into(),
            Self::NoActiveRound => "No active round".into(),
            Self::GameFinished => "Game already finished".into(),
            Self::InvalidSettings(detail) => format!("Invalid settings: {detail}"),
            Self::Unavailable(_) => "Room unavailable".into(),
        }
    }
}
