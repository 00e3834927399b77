//! The match state machine for one room.
//!
//! [`Room`] knows nothing about sockets or channels. It holds the secret
//! words, both seats and the per-round completion sets, and exposes the
//! operations the room actor drives one at a time.

use std::collections::HashSet;

use wordduel_protocol::{GameSettings, PlayerId, RoomCode};
use wordduel_words::WordPool;

use crate::{EVERYONE, RoomError, RoomState, scoring};

/// One player's place in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub id: PlayerId,
    pub nickname: String,
    /// Cumulative points.
    pub score: u32,
    /// Rounds this player has solved, i.e. which secret word their next
    /// guess is checked against. Never exceeds the number of secret words.
    pub round_index: usize,
    /// Rounds completed as the client sees them. Advanced for both seats
    /// at every fixed-mode round change.
    pub rounds_played: u32,
}

impl Seat {
    fn new(id: PlayerId, nickname: String) -> Self {
        Self {
            id,
            nickname,
            score: 0,
            round_index: 0,
            rounds_played: 0,
        }
    }
}

/// How a match ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// The name announced in `WINNER`: a nickname or [`EVERYONE`].
    pub winner_name: String,
    /// Nicknames to credit with a win.
    pub credited: Vec<String>,
}

/// What [`Room::try_advance_round`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Not every present player has answered yet.
    Pending,
    /// The round closed and the next one began.
    NextRound,
    /// The match is over.
    MatchOver(MatchResult),
}

/// One two-player match.
#[derive(Debug)]
pub struct Room {
    code: RoomCode,
    settings: GameSettings,
    state: RoomState,
    host: Option<Seat>,
    guest: Option<Seat>,
    pool: WordPool,
    secret_words: Vec<String>,
    rounds_remaining: u32,
    finished_this_round: HashSet<PlayerId>,
    failed_this_round: HashSet<PlayerId>,
}

impl Room {
    /// Creates a room with `host` seated and its secret words drawn.
    ///
    /// Fixed matches draw one word per configured round up front;
    /// infinite matches draw one and append more as rounds proceed.
    ///
    /// # Errors
    /// Returns [`RoomError::InvalidSettings`] if `pool` is empty.
    pub fn create(
        code: RoomCode,
        host: PlayerId,
        nickname: impl Into<String>,
        settings: GameSettings,
        pool: WordPool,
    ) -> Result<Self, RoomError> {
        if pool.is_empty() {
            return Err(RoomError::InvalidSettings(format!(
                "no words available for mode {}",
                settings.mode
            )));
        }

        let initial_words = if settings.infinite { 1 } else { settings.rounds };
        let secret_words = (0..initial_words)
            .filter_map(|_| pool.pick_random().map(str::to_owned))
            .collect();

        Ok(Self {
            code,
            settings,
            state: RoomState::AwaitingGuest,
            host: Some(Seat::new(host, nickname.into())),
            guest: None,
            pool,
            secret_words,
            rounds_remaining: settings.rounds,
            finished_this_round: HashSet::new(),
            failed_this_round: HashSet::new(),
        })
    }

    /// Seats a second player and starts the match.
    ///
    /// # Errors
    /// - [`RoomError::GameFinished`] if the match is already over
    /// - [`RoomError::RoomFull`] if a guest is already seated
    /// - [`RoomError::AlreadyInRoom`] if `guest` is the host
    /// - [`RoomError::NicknameTaken`] if the host uses the same nickname
    pub fn add_guest(
        &mut self,
        guest: PlayerId,
        nickname: impl Into<String>,
    ) -> Result<(), RoomError> {
        if !self.state.is_joinable() {
            return Err(match self.state {
                RoomState::Finished => RoomError::GameFinished,
                _ => RoomError::RoomFull(self.code.clone()),
            });
        }
        let nickname = nickname.into();
        if let Some(host) = &self.host {
            if host.id == guest {
                return Err(RoomError::AlreadyInRoom(guest));
            }
            if host.nickname == nickname {
                return Err(RoomError::NicknameTaken(nickname));
            }
        }

        self.guest = Some(Seat::new(guest, nickname));
        self.state = RoomState::Active;
        Ok(())
    }

    /// Scores one player's result for the current round.
    ///
    /// Not guarded against repeats: a second call in the same round
    /// scores again. Callers check [`has_answered`](Self::has_answered)
    /// first.
    ///
    /// Returns the points awarded.
    ///
    /// # Errors
    /// - [`RoomError::GameFinished`] once the match is over
    /// - [`RoomError::NoActiveRound`] while waiting for a guest
    /// - [`RoomError::NotInRoom`] if `player` has no seat
    pub fn record_result(
        &mut self,
        player: PlayerId,
        guesses_used: u32,
        seconds: f64,
        succeeded: bool,
    ) -> Result<u32, RoomError> {
        match self.state {
            RoomState::Active => {}
            RoomState::Finished => return Err(RoomError::GameFinished),
            RoomState::AwaitingGuest => return Err(RoomError::NoActiveRound),
        }

        let points = scoring::round_points(self.settings.max_guesses, guesses_used, seconds);
        let word_count = self.secret_words.len();
        let seat = self
            .seat_mut(player)
            .ok_or(RoomError::NotInRoom(player))?;

        seat.score = seat.score.saturating_add(points);
        if succeeded {
            seat.round_index = (seat.round_index + 1).min(word_count);
        } else {
            self.failed_this_round.insert(player);
        }
        self.finished_this_round.insert(player);
        Ok(points)
    }

    /// Closes the round if every present player has answered.
    pub fn try_advance_round(&mut self) -> RoundOutcome {
        if !self.state.is_active() {
            return RoundOutcome::Pending;
        }
        let (Some(host), Some(guest)) = (&self.host, &self.guest) else {
            return RoundOutcome::Pending;
        };
        let both_finished = self.finished_this_round.contains(&host.id)
            && self.finished_this_round.contains(&guest.id);
        if !both_finished {
            return RoundOutcome::Pending;
        }

        if self.settings.infinite {
            let both_failed = self.failed_this_round.contains(&host.id)
                && self.failed_this_round.contains(&guest.id);
            if both_failed {
                let result = shared_tie_result(host, guest);
                return self.finish(result);
            }
        } else {
            self.rounds_remaining = self.rounds_remaining.saturating_sub(1);
            if self.rounds_remaining == 0 {
                let result = host_favoured_result(host, guest);
                return self.finish(result);
            }
        }

        if self.settings.infinite {
            if let Some(word) = self.pool.pick_random() {
                self.secret_words.push(word.to_owned());
            }
        } else {
            for seat in self.seats_mut() {
                seat.rounds_played += 1;
            }
        }
        self.finished_this_round.clear();
        self.failed_this_round.clear();
        RoundOutcome::NextRound
    }

    /// Removes `player` and returns whoever is still seated.
    ///
    /// A departing host hands the host seat to the guest. If the match
    /// was in progress the room goes back to waiting for a guest.
    ///
    /// # Errors
    /// Returns [`RoomError::NotInRoom`] if `player` has no seat.
    pub fn remove_player(&mut self, player: PlayerId) -> Result<Option<PlayerId>, RoomError> {
        if self.host.as_ref().is_some_and(|s| s.id == player) {
            self.host = self.guest.take();
        } else if self.guest.as_ref().is_some_and(|s| s.id == player) {
            self.guest = None;
        } else {
            return Err(RoomError::NotInRoom(player));
        }

        self.finished_this_round.remove(&player);
        self.failed_this_round.remove(&player);
        if self.state == RoomState::Active {
            self.state = RoomState::AwaitingGuest;
        }
        Ok(self.host.as_ref().map(|s| s.id))
    }

    fn finish(&mut self, result: MatchResult) -> RoundOutcome {
        self.state = RoomState::Finished;
        RoundOutcome::MatchOver(result)
    }

    // -- Queries -------------------------------------------------------------

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn host(&self) -> Option<&Seat> {
        self.host.as_ref()
    }

    pub fn guest(&self) -> Option<&Seat> {
        self.guest.as_ref()
    }

    /// Seated players, host first.
    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.host.iter().chain(self.guest.iter())
    }

    pub fn seat(&self, player: PlayerId) -> Option<&Seat> {
        self.seats().find(|s| s.id == player)
    }

    /// The other seated player, if any.
    pub fn opponent_of(&self, player: PlayerId) -> Option<&Seat> {
        self.seats().find(|s| s.id != player)
    }

    pub fn player_count(&self) -> usize {
        self.seats().count()
    }

    pub fn is_empty(&self) -> bool {
        self.host.is_none()
    }

    /// Whether `player` already reported a result this round.
    pub fn has_answered(&self, player: PlayerId) -> bool {
        self.finished_this_round.contains(&player)
    }

    pub fn rounds_remaining(&self) -> u32 {
        self.rounds_remaining
    }

    pub fn secret_words(&self) -> &[String] {
        &self.secret_words
    }

    /// The secret words as letter lists, the way `GUESSES` carries them.
    pub fn guesses(&self) -> Vec<Vec<char>> {
        self.secret_words.iter().map(|w| w.chars().collect()).collect()
    }

    fn seat_mut(&mut self, player: PlayerId) -> Option<&mut Seat> {
        self.host
            .iter_mut()
            .chain(self.guest.iter_mut())
            .find(|s| s.id == player)
    }

    fn seats_mut(&mut self) -> impl Iterator<Item = &mut Seat> {
        self.host.iter_mut().chain(self.guest.iter_mut())
    }
}

/// Infinite-mode rule: a tie is shared by both players.
fn shared_tie_result(host: &Seat, guest: &Seat) -> MatchResult {
    if host.score == guest.score {
        MatchResult {
            winner_name: EVERYONE.to_string(),
            credited: vec![host.nickname.clone(), guest.nickname.clone()],
        }
    } else {
        let winner = if host.score > guest.score { host } else { guest };
        sole_winner(winner)
    }
}

/// Fixed-round rule: the higher score wins and a tie goes to the host.
// Differs from `shared_tie_result` on ties. Both rules are pinned by tests.
fn host_favoured_result(host: &Seat, guest: &Seat) -> MatchResult {
    let winner = if guest.score > host.score { guest } else { host };
    sole_winner(winner)
}

fn sole_winner(seat: &Seat) -> MatchResult {
    MatchResult {
        winner_name: seat.nickname.clone(),
        credited: vec![seat.nickname.clone()],
    }
}
