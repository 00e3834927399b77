//! Match settings and the room lifecycle state machine.

use std::fmt;

use wordduel_protocol::{CreateGame, GameSettings};
use wordduel_words::is_supported_mode;

use crate::RoomError;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Word length used when a create request leaves `mode` out.
pub const DEFAULT_MODE: u8 = 5;

/// Round count used when a create request leaves `rounds` out.
pub const DEFAULT_ROUNDS: u32 = 5;

/// Longest fixed match a room will draw words for.
pub const MAX_ROUNDS: u32 = 100;

/// Winner name announced when an infinite match ends in a tie.
pub const EVERYONE: &str = "everyone";

/// Turns a create request into concrete, playable settings.
///
/// Missing fields get defaults: `mode` 5, `attempts` one more than the
/// word length, `rounds` 5. `attempts` may not exceed that default, and
/// `rounds` may not exceed [`MAX_ROUNDS`] in either mode.
///
/// # Errors
/// Returns [`RoomError::InvalidSettings`] for an unsupported mode,
/// attempts or rounds out of range, or a blank nickname or code.
pub fn resolve_settings(request: &CreateGame) -> Result<GameSettings, RoomError> {
    if request.nickname.trim().is_empty() {
        return Err(RoomError::InvalidSettings("nickname must not be empty".into()));
    }
    if request.room_code.as_str().trim().is_empty() {
        return Err(RoomError::InvalidSettings("room code must not be empty".into()));
    }

    let mode = request.mode.unwrap_or(DEFAULT_MODE);
    if !is_supported_mode(mode) {
        return Err(RoomError::InvalidSettings(format!(
            "mode must be 5, 6 or 7, got {mode}"
        )));
    }

    let attempt_limit = u32::from(mode) + 1;
    let max_guesses = request.attempts.unwrap_or(attempt_limit);
    if !(1..=attempt_limit).contains(&max_guesses) {
        return Err(RoomError::InvalidSettings(format!(
            "attempts must be between 1 and {attempt_limit}, got {max_guesses}"
        )));
    }

    let rounds = request.rounds.unwrap_or(DEFAULT_ROUNDS);
    if rounds == 0 && !request.infinite {
        return Err(RoomError::InvalidSettings("rounds must be at least 1".into()));
    }
    if rounds > MAX_ROUNDS {
        return Err(RoomError::InvalidSettings(format!(
            "rounds must be at most {MAX_ROUNDS}, got {rounds}"
        )));
    }

    Ok(GameSettings {
        mode,
        max_guesses,
        rounds,
        infinite: request.infinite,
    })
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// ```text
/// AwaitingGuest → Active → Finished
///       ↑           │
///       └───────────┘  (guest or host leaves mid-match)
/// ```
///
/// - **AwaitingGuest**: only the host is seated. Joins are accepted.
/// - **Active**: both players are seated and rounds are progressing.
/// - **Finished**: a winner was decided. No further rounds are played,
///   but players may still leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    AwaitingGuest,
    Active,
    Finished,
}

impl RoomState {
    /// Returns `true` if a guest may join in this state.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::AwaitingGuest)
    }

    /// Returns `true` if results are being accepted.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for RoomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingGuest => write!(f, "AwaitingGuest"),
            Self::Active => write!(f, "Active"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}
