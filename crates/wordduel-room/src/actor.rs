//! Room actor: an isolated Tokio task that owns one match.
//!
//! Each room runs in its own task and talks to the outside world through
//! an mpsc channel. The actor owns the [`Room`] and both players'
//! outbound channels, so scoring, round advancement and the messages
//! they produce happen one command at a time with no locks around the
//! match state.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use wordduel_protocol::{Answer, GameSettings, PlayerId, Recipient, RoomCode, ServerResponse};

use crate::{MatchResult, Room, RoomError, RoomState, RoundOutcome};

/// Channel sender for delivering responses to a player's connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerResponse>;

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in each variant is a reply channel: the caller
/// sends a command and waits for the result on it.
pub(crate) enum RoomCommand {
    /// Seat a second player.
    Join {
        player_id: PlayerId,
        nickname: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<JoinOutcome, RoomError>>,
    },

    /// Record one player's result for the current round.
    Answer {
        player_id: PlayerId,
        answer: Answer,
        reply: oneshot::Sender<Result<AnswerOutcome, RoomError>>,
    },

    /// Remove a player.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<LeaveOutcome, RoomError>>,
    },

    /// Request a metadata snapshot.
    GetInfo { reply: oneshot::Sender<RoomInfo> },
}

/// What a successful join led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    /// The host now seated opposite the new guest.
    pub opponent: PlayerId,
    /// The match's settings, as just sent in `SETTINGS`.
    pub settings: GameSettings,
}

/// What an accepted answer led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// Points awarded for this answer.
    pub points: u32,
    /// Set when this answer ended the match.
    pub result: Option<MatchResult>,
}

/// What a leave led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// The player still seated, who was sent `OPPONENT_LEFT`.
    pub remaining: Option<PlayerId>,
}

impl LeaveOutcome {
    /// The room has nobody left and its actor has stopped.
    pub fn room_emptied(&self) -> bool {
        self.remaining.is_none()
    }
}

/// A snapshot of room metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub state: RoomState,
    pub settings: GameSettings,
    pub player_count: usize,
    /// Secret words drawn so far.
    pub word_count: usize,
    /// Scores by player, host first.
    pub scores: Vec<(PlayerId, u32)>,
}

/// Handle to a running room actor.
///
/// Cheap to clone; it's just an `mpsc::Sender` wrapper. The
/// `RoomManager` holds one per room.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Starts an actor for `room` and sends `SETTINGS` to its host.
    ///
    /// `channel_size` bounds the command inbox; senders wait when it is
    /// full.
    pub fn spawn(room: Room, host_sender: PlayerSender, channel_size: usize) -> Self {
        let (tx, rx) = mpsc::channel(channel_size);
        let code = room.code().clone();

        let mut senders = HashMap::new();
        if let Some(host) = room.host() {
            senders.insert(host.id, host_sender);
        }

        let actor = RoomActor {
            room,
            senders,
            receiver: rx,
        };
        actor.announce_settings();
        tokio::spawn(actor.run());

        Self { code, sender: tx }
    }

    /// Seats `player_id` as the guest.
    pub async fn join(
        &self,
        player_id: PlayerId,
        nickname: impl Into<String>,
        sender: PlayerSender,
    ) -> Result<JoinOutcome, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(
            RoomCommand::Join {
                player_id,
                nickname: nickname.into(),
                sender,
                reply,
            },
            rx,
        )
        .await?
    }

    /// Submits a player's result for the current round.
    pub async fn answer(
        &self,
        player_id: PlayerId,
        answer: Answer,
    ) -> Result<AnswerOutcome, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(
            RoomCommand::Answer {
                player_id,
                answer,
                reply,
            },
            rx,
        )
        .await?
    }

    /// Removes a player from the room.
    pub async fn leave(&self, player_id: PlayerId) -> Result<LeaveOutcome, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(RoomCommand::Leave { player_id, reply }, rx)
            .await?
    }

    /// Requests the current room info.
    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(RoomCommand::GetInfo { reply }, rx).await
    }

    async fn request<T>(
        &self,
        command: RoomCommand,
        reply: oneshot::Receiver<T>,
    ) -> Result<T, RoomError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    /// Per-player outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Processes commands until the room empties or every handle is
    /// dropped.
    async fn run(mut self) {
        tracing::info!(room = %self.room.code(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    nickname,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player_id, nickname, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Answer {
                    player_id,
                    answer,
                    reply,
                } => {
                    let result = self.handle_answer(player_id, answer);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let result = self.handle_leave(player_id);
                    let _ = reply.send(result);
                    if self.room.is_empty() {
                        break;
                    }
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
            }
        }

        tracing::info!(room = %self.room.code(), "room actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        nickname: String,
        sender: PlayerSender,
    ) -> Result<JoinOutcome, RoomError> {
        self.room.add_guest(player_id, nickname)?;
        self.senders.insert(player_id, sender);

        let host = self
            .room
            .opponent_of(player_id)
            .map(|s| s.id)
            .ok_or(RoomError::NotInRoom(player_id))?;
        tracing::info!(
            room = %self.room.code(),
            %player_id,
            %host,
            "guest joined, match started"
        );

        let guesses = self.room.guesses();
        let settings = self.room.settings();
        for pid in self.player_ids() {
            self.send_to(pid, ServerResponse::Guesses(guesses.clone()));
            self.send_to(pid, ServerResponse::Settings(settings));
            self.send_to(pid, self.opponent_summary(pid));
            self.send_to(pid, ServerResponse::Start);
        }
        Ok(JoinOutcome {
            opponent: host,
            settings,
        })
    }

    fn handle_answer(
        &mut self,
        player_id: PlayerId,
        answer: Answer,
    ) -> Result<AnswerOutcome, RoomError> {
        if self.room.state().is_active() && self.room.has_answered(player_id) {
            return Err(RoomError::AlreadyAnswered(player_id));
        }

        let succeeded = answer
            .success
            .unwrap_or(answer.guesses_used <= self.room.settings().max_guesses);
        let points =
            self.room
                .record_result(player_id, answer.guesses_used, answer.seconds, succeeded)?;
        tracing::debug!(
            room = %self.room.code(),
            %player_id,
            guesses_used = answer.guesses_used,
            seconds = answer.seconds,
            succeeded,
            points,
            "answer recorded"
        );

        for pid in self.player_ids() {
            self.send_to(pid, self.points_update(pid));
        }

        let result = match self.room.try_advance_round() {
            RoundOutcome::Pending => None,
            RoundOutcome::NextRound => {
                self.announce_new_round();
                None
            }
            RoundOutcome::MatchOver(result) => {
                tracing::info!(
                    room = %self.room.code(),
                    winner = %result.winner_name,
                    "match finished"
                );
                self.dispatch(vec![(
                    Recipient::All,
                    ServerResponse::Winner(result.winner_name.clone()),
                )]);
                Some(result)
            }
        };

        Ok(AnswerOutcome { points, result })
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<LeaveOutcome, RoomError> {
        let remaining = self.room.remove_player(player_id)?;
        self.senders.remove(&player_id);

        tracing::info!(
            room = %self.room.code(),
            %player_id,
            players = self.room.player_count(),
            "player left"
        );

        if let Some(remaining) = remaining {
            self.dispatch(vec![(
                Recipient::Player(remaining),
                ServerResponse::OpponentLeft,
            )]);
        }
        Ok(LeaveOutcome { remaining })
    }

    fn announce_settings(&self) {
        self.dispatch(vec![(
            Recipient::All,
            ServerResponse::Settings(self.room.settings()),
        )]);
    }

    fn announce_new_round(&self) {
        tracing::debug!(
            room = %self.room.code(),
            words = self.room.secret_words().len(),
            rounds_remaining = self.room.rounds_remaining(),
            "new round"
        );
        if self.room.settings().infinite {
            self.dispatch(vec![(
                Recipient::All,
                ServerResponse::Guesses(self.room.guesses()),
            )]);
        }
        for pid in self.player_ids() {
            self.send_to(pid, self.opponent_summary(pid));
            self.send_to(pid, ServerResponse::NewRound);
        }
    }

    /// `OPPONENT` as seen by `player`.
    fn opponent_summary(&self, player: PlayerId) -> ServerResponse {
        match self.room.opponent_of(player) {
            Some(opponent) => ServerResponse::Opponent {
                name: opponent.nickname.clone(),
                points: opponent.score,
            },
            None => ServerResponse::Opponent {
                name: String::new(),
                points: 0,
            },
        }
    }

    /// `POINTS_UPDATE` oriented to `player`.
    fn points_update(&self, player: PlayerId) -> ServerResponse {
        ServerResponse::PointsUpdate {
            your_points: self.room.seat(player).map_or(0, |s| s.score),
            opponent_points: self.room.opponent_of(player).map_or(0, |s| s.score),
        }
    }

    fn player_ids(&self) -> Vec<PlayerId> {
        self.room.seats().map(|s| s.id).collect()
    }

    /// Dispatches responses to the correct recipients.
    fn dispatch(&self, msgs: Vec<(Recipient, ServerResponse)>) {
        for (recipient, msg) in msgs {
            match recipient {
                Recipient::All => {
                    for pid in self.player_ids() {
                        self.send_to(pid, msg.clone());
                    }
                }
                Recipient::Player(pid) => self.send_to(pid, msg),
            }
        }
    }

    /// Sends a response to a single player. Silently drops it if the
    /// receiver is gone (player disconnected).
    fn send_to(&self, player_id: PlayerId, msg: ServerResponse) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            code: self.room.code().clone(),
            state: self.room.state(),
            settings: self.room.settings(),
            player_count: self.room.player_count(),
            word_count: self.room.secret_words().len(),
            scores: self.room.seats().map(|s| (s.id, s.score)).collect(),
        }
    }
}
