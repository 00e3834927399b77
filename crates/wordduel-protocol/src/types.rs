//! Core protocol types for WordDuel's wire format.
//!
//! Every line on the wire is one [`Envelope`]: `{"type": <kind>, "data":
//! <any>}`. The `type` string selects one variant of the closed request
//! and response sets; `data` holds that variant's payload (or `null`).

use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected player.
///
/// Derived from the transport's connection id, so one connection is one
/// player for as long as the socket stays open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The code players share out of band to meet in the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

// ---------------------------------------------------------------------------
// Recipient: who should receive a message?
// ---------------------------------------------------------------------------

/// Specifies who should receive a server response produced by a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every player currently in the room.
    All,

    /// One specific player.
    Player(PlayerId),
}

// ---------------------------------------------------------------------------
// Envelope: the top-level wire format
// ---------------------------------------------------------------------------

/// The top-level message wrapper. Every line on the wire is an Envelope.
///
/// `data` defaults to `null` when a client leaves it out, which is how
/// payload-less requests such as `protocol.leave` usually arrive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// The message kind, e.g. `"protocol.answer"`.
    #[serde(rename = "type")]
    pub kind: String,

    /// The kind-specific payload.
    #[serde(default)]
    pub data: Value,
}

/// `type` strings for client → server requests.
pub mod request_kind {
    pub const CREATE_GAME: &str = "protocol.create_game";
    pub const JOIN_GAME: &str = "protocol.join_game";
    pub const ANSWER: &str = "protocol.answer";
    pub const LEAVE: &str = "protocol.leave";
    pub const GET_LEADERBOARD: &str = "protocol.get_leaderboard";
}

/// `type` strings for server → client responses.
pub mod response_kind {
    pub const SETTINGS: &str = "protocol.settings";
    pub const GUESSES: &str = "protocol.guesses";
    pub const OPPONENT: &str = "protocol.opponent";
    pub const START: &str = "protocol.start";
    pub const NEW_ROUND: &str = "protocol.new_round";
    pub const POINTS_UPDATE: &str = "protocol.points_update";
    pub const WINNER: &str = "protocol.winner";
    pub const OPPONENT_LEFT: &str = "protocol.opponent_left";
    pub const INVALID_REQUEST: &str = "protocol.invalid_request";
    pub const LEADERBOARD: &str = "protocol.leaderboard";
}

// ---------------------------------------------------------------------------
// Client requests
// ---------------------------------------------------------------------------

/// Payload of `protocol.create_game`.
///
/// Everything but the code and nickname is optional; the room layer
/// fills in defaults (`mode` 5, `attempts` mode + 1, `rounds` 5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGame {
    pub room_code: RoomCode,
    pub nickname: String,
    #[serde(default)]
    pub mode: Option<u8>,
    #[serde(default)]
    pub attempts: Option<u32>,
    #[serde(default)]
    pub rounds: Option<u32>,
    #[serde(default)]
    pub infinite: bool,
}

/// Payload of `protocol.join_game`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinGame {
    pub room_code: RoomCode,
    pub nickname: String,
}

/// Payload of `protocol.answer`: one player's result for the current
/// round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// The final guess typed. Informational only.
    #[serde(default)]
    pub guess: String,

    /// How many guesses the player used.
    pub guesses_used: u32,

    /// Seconds from round start to the final guess.
    #[serde(default)]
    pub seconds: f64,

    /// Whether the word was found. When absent, the server infers it
    /// from `guesses_used <= max_guesses`.
    #[serde(default)]
    pub success: Option<bool>,
}

/// A decoded client → server request.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientRequest {
    CreateGame(CreateGame),
    JoinGame(JoinGame),
    Answer(Answer),
    Leave,
    GetLeaderboard,
}

impl ClientRequest {
    /// Returns the wire `type` of this request.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateGame(_) => request_kind::CREATE_GAME,
            Self::JoinGame(_) => request_kind::JOIN_GAME,
            Self::Answer(_) => request_kind::ANSWER,
            Self::Leave => request_kind::LEAVE,
            Self::GetLeaderboard => request_kind::GET_LEADERBOARD,
        }
    }
}

impl TryFrom<Envelope> for ClientRequest {
    type Error = ProtocolError;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        match envelope.kind.as_str() {
            request_kind::CREATE_GAME => payload(envelope.data).map(Self::CreateGame),
            request_kind::JOIN_GAME => payload(envelope.data).map(Self::JoinGame),
            request_kind::ANSWER => payload(envelope.data).map(Self::Answer),
            // Payload-less: whatever `data` holds is ignored.
            request_kind::LEAVE => Ok(Self::Leave),
            request_kind::GET_LEADERBOARD => Ok(Self::GetLeaderboard),
            _ => Err(ProtocolError::UnknownType(envelope.kind)),
        }
    }
}

fn payload<T: DeserializeOwned>(data: Value) -> Result<T, ProtocolError> {
    if data.is_null() {
        return Err(ProtocolError::InvalidMessage("missing data".into()));
    }
    serde_json::from_value(data).map_err(ProtocolError::Decode)
}

// ---------------------------------------------------------------------------
// Server responses
// ---------------------------------------------------------------------------

/// The match configuration, as announced in `protocol.settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Word length: 5, 6 or 7.
    pub mode: u8,
    /// Attempts allowed per round.
    pub max_guesses: u32,
    /// Configured round count (ignored when `infinite`).
    pub rounds: u32,
    /// Keep playing until both players fail the same round.
    pub infinite: bool,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub wins: u32,
}

/// A server → client response.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerResponse {
    /// The room's settings.
    Settings(GameSettings),
    /// Secret words so far, one letter list per round.
    Guesses(Vec<Vec<char>>),
    /// The opponent's name and current score.
    Opponent { name: String, points: u32 },
    /// Both players are present; round one begins.
    Start,
    /// Both players finished the round; the next one begins.
    NewRound,
    /// Scores, oriented to the recipient.
    PointsUpdate { your_points: u32, opponent_points: u32 },
    /// The match is over. `"everyone"` for a shared win.
    Winner(String),
    /// The opponent left or disconnected.
    OpponentLeft,
    /// The request was rejected; the string says why.
    InvalidRequest(String),
    /// Top players by wins, best first.
    Leaderboard(Vec<LeaderboardEntry>),
}

impl ServerResponse {
    /// Returns the wire `type` of this response.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Settings(_) => response_kind::SETTINGS,
            Self::Guesses(_) => response_kind::GUESSES,
            Self::Opponent { .. } => response_kind::OPPONENT,
            Self::Start => response_kind::START,
            Self::NewRound => response_kind::NEW_ROUND,
            Self::PointsUpdate { .. } => response_kind::POINTS_UPDATE,
            Self::Winner(_) => response_kind::WINNER,
            Self::OpponentLeft => response_kind::OPPONENT_LEFT,
            Self::InvalidRequest(_) => response_kind::INVALID_REQUEST,
            Self::Leaderboard(_) => response_kind::LEADERBOARD,
        }
    }

    /// Wraps this response in an [`Envelope`]. Payload-less responses
    /// carry `"data": null`.
    pub fn to_envelope(&self) -> Result<Envelope, ProtocolError> {
        let data = match self {
            Self::Settings(settings) => to_value(settings)?,
            Self::Guesses(words) => to_value(words)?,
            Self::Opponent { name, points } => {
                serde_json::json!({ "name": name, "points": points })
            }
            Self::Start | Self::NewRound | Self::OpponentLeft => Value::Null,
            Self::PointsUpdate {
                your_points,
                opponent_points,
            } => serde_json::json!({
                "your_points": your_points,
                "opponent_points": opponent_points,
            }),
            Self::Winner(name) => Value::String(name.clone()),
            Self::InvalidRequest(reason) => Value::String(reason.clone()),
            Self::Leaderboard(rows) => to_value(rows)?,
        };
        Ok(Envelope {
            kind: self.kind().to_string(),
            data,
        })
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ProtocolError> {
    serde_json::to_value(value).map_err(ProtocolError::Encode)
}

// =========================================================================
// Tests
// =========================================================================
