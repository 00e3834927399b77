//! Room lifecycle management for WordDuel.
//!
//! A room is one two-player match. Its rules live in [`Room`], a plain
//! state machine with no I/O. Each live room runs as an isolated Tokio
//! task (actor model) that owns the `Room` and both players' outbound
//! channels, so every mutation and every fan-out for one room happens
//! one command at a time.
//!
//! # Key types
//!
//! - [`Room`]: the match state machine (seating, scoring, round
//!   advancement and departures)
//! - [`RoomManager`]: the registry of room codes, player → room and
//!   player → opponent maps
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomState`]: lifecycle state machine
//! - [`scoring`]: points for one round

mod actor;
mod config;
mod error;
mod manager;
mod room;
pub mod scoring;

pub use actor::{AnswerOutcome, JoinOutcome, LeaveOutcome, PlayerSender, RoomHandle, RoomInfo};
pub use config::{DEFAULT_MODE, DEFAULT_ROUNDS, EVERYONE, MAX_ROUNDS, RoomState, resolve_settings};
pub use error::RoomError;
pub use manager::RoomManager;
pub use room::{MatchResult, Room, RoundOutcome, Seat};
