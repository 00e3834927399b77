//! Room manager: creates, tracks, and routes players to rooms.

use std::collections::HashMap;

use wordduel_protocol::{CreateGame, GameSettings, PlayerId, RoomCode};
use wordduel_words::WordSource;

use crate::{
    JoinOutcome, LeaveOutcome, PlayerSender, Room, RoomError, RoomHandle, RoomInfo,
    resolve_settings,
};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Tracks every live room and which player sits where.
///
/// This is the entry point for room operations from the session layer.
/// It only touches its own maps; anything that changes a match goes
/// through the room's actor.
pub struct RoomManager {
    /// Active rooms, keyed by the code players share.
    rooms: HashMap<RoomCode, RoomHandle>,

    /// Maps each player to the room they're currently in.
    /// A player can be in at most ONE room at a time (key invariant).
    player_rooms: HashMap<PlayerId, RoomCode>,

    /// Both directions of every seated pair.
    opponents: HashMap<PlayerId, PlayerId>,

    channel_size: usize,
}

impl RoomManager {
    /// Creates a new, empty room manager.
    pub fn new() -> Self {
        Self::with_channel_size(DEFAULT_CHANNEL_SIZE)
    }

    /// Creates a manager whose room actors buffer up to `channel_size`
    /// commands.
    pub fn with_channel_size(channel_size: usize) -> Self {
        Self {
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
            opponents: HashMap::new(),
            channel_size: channel_size.max(1),
        }
    }

    /// Creates a room hosted by `host` and registers it under the
    /// requested code. The host is sent `SETTINGS`.
    ///
    /// # Errors
    /// - [`RoomError::AlreadyInRoom`] if `host` already has a seat
    /// - [`RoomError::CodeTaken`] if the code is in use
    /// - [`RoomError::InvalidSettings`] if the settings can't be played
    pub fn create_room(
        &mut self,
        host: PlayerId,
        request: &CreateGame,
        words: &dyn WordSource,
        sender: PlayerSender,
    ) -> Result<GameSettings, RoomError> {
        if self.player_rooms.contains_key(&host) {
            return Err(RoomError::AlreadyInRoom(host));
        }
        let code = request.room_code.clone();
        if self.rooms.contains_key(&code) {
            return Err(RoomError::CodeTaken(code));
        }

        let settings = resolve_settings(request)?;
        let room = Room::create(
            code.clone(),
            host,
            request.nickname.clone(),
            settings,
            words.words_for(settings.mode),
        )?;

        let handle = RoomHandle::spawn(room, sender, self.channel_size);
        self.rooms.insert(code.clone(), handle);
        self.player_rooms.insert(host, code.clone());
        tracing::info!(
            room = %code,
            %host,
            mode = settings.mode,
            max_guesses = settings.max_guesses,
            rounds = settings.rounds,
            infinite = settings.infinite,
            "room created"
        );
        Ok(settings)
    }

    /// Seats `player_id` as the guest of the room registered under
    /// `code`.
    ///
    /// Enforces the "one room at a time" invariant.
    pub async fn join_room(
        &mut self,
        player_id: PlayerId,
        code: &RoomCode,
        nickname: &str,
        sender: PlayerSender,
    ) -> Result<JoinOutcome, RoomError> {
        if self.player_rooms.contains_key(&player_id) {
            return Err(RoomError::AlreadyInRoom(player_id));
        }

        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let outcome = handle.join(player_id, nickname, sender).await?;
        self.player_rooms.insert(player_id, code.clone());
        self.opponents.insert(player_id, outcome.opponent);
        self.opponents.insert(outcome.opponent, player_id);
        Ok(outcome)
    }

    /// Removes a player from their current room.
    ///
    /// Unlinks the pair, and drops the room (and its code) once nobody
    /// is left in it.
    pub async fn leave_room(&mut self, player_id: PlayerId) -> Result<LeaveOutcome, RoomError> {
        let code = self
            .player_rooms
            .remove(&player_id)
            .ok_or(RoomError::NotInRoom(player_id))?;
        if let Some(opponent) = self.opponents.remove(&player_id) {
            self.opponents.remove(&opponent);
        }

        let outcome = match self.rooms.get(&code) {
            Some(handle) => handle.leave(player_id).await,
            None => Err(RoomError::NotFound(code.clone())),
        };

        let destroy = match &outcome {
            Ok(outcome) => outcome.room_emptied(),
            Err(RoomError::Unavailable(_)) => true,
            Err(_) => false,
        };
        if destroy && self.rooms.remove(&code).is_some() {
            tracing::info!(room = %code, "room destroyed");
        }
        outcome
    }

    /// Returns a handle to the player's current room.
    ///
    /// Callers clone the handle out and await the room without holding
    /// the manager, so busy rooms don't stall each other.
    pub fn handle_for(&self, player_id: PlayerId) -> Result<RoomHandle, RoomError> {
        let code = self
            .player_rooms
            .get(&player_id)
            .ok_or(RoomError::NotInRoom(player_id))?;
        self.rooms
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }

    /// Returns info about a specific room.
    pub async fn get_room_info(&self, code: &RoomCode) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        handle.get_info().await
    }

    /// Returns the code of the room a player is in, if any.
    pub fn player_room(&self, player_id: PlayerId) -> Option<&RoomCode> {
        self.player_rooms.get(&player_id)
    }

    /// Returns the player's current opponent, if seated opposite one.
    pub fn opponent_of(&self, player_id: PlayerId) -> Option<PlayerId> {
        self.opponents.get(&player_id).copied()
    }

    /// Returns the number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Returns the number of seated players across all rooms.
    pub fn player_count(&self) -> usize {
        self.player_rooms.len()
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new()
    }
}
