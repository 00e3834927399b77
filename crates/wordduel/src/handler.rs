//! Per-connection handler: request decoding, dispatch, and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Derive the player's identity from the connection id
//!   2. Spawn a writer task that drains the player's outbound channel
//!   3. Loop: receive a line → decode → dispatch to the room layer
//!   4. On close, error or idle timeout: leave the room (the opponent
//!      gets `OPPONENT_LEFT`)

use std::sync::Arc;

use tokio::sync::mpsc;
use wordduel_protocol::{
    Answer, ClientRequest, Codec, CreateGame, Envelope, JoinGame, PlayerId, ProtocolError,
    ServerResponse,
};
use wordduel_room::{PlayerSender, RoomError};
use wordduel_store::WinStore;
use wordduel_transport::{Connection, LineConnection};

use crate::WordDuelError;
use crate::server::ServerState;

/// Reason sent for any line that doesn't decode to a request.
const MALFORMED_REQUEST: &str = "Malformed request";

/// Drop guard that takes the player out of their room when the handler
/// exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async lock.
struct SeatGuard<S: WinStore, C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<S, C>>,
}

impl<S: WinStore, C: Codec> Drop for SeatGuard<S, C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        runtime.spawn(async move {
            let mut rooms = state.rooms.lock().await;
            if rooms.player_room(player_id).is_none() {
                return;
            }
            match rooms.leave_room(player_id).await {
                Ok(outcome) => tracing::info!(
                    %player_id,
                    opponent = ?outcome.remaining,
                    "player removed after disconnect"
                ),
                Err(e) => tracing::debug!(%player_id, error = %e, "disconnect cleanup failed"),
            }
        });
    }
}

/// What one connection remembers between requests.
struct Session {
    player_id: PlayerId,
    outbound: PlayerSender,
}

impl Session {
    fn send(&self, response: ServerResponse) {
        // Only fails once the writer task is gone, i.e. the socket is dead.
        let _ = self.outbound.send(response);
    }

    fn reject(&self, error: &RoomError) {
        tracing::warn!(player_id = %self.player_id, error = %error, "request rejected");
        self.send(ServerResponse::InvalidRequest(error.reason()));
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S, C>(
    conn: LineConnection,
    state: Arc<ServerState<S, C>>,
) -> Result<(), WordDuelError>
where
    S: WinStore,
    C: Codec,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let player_id = PlayerId(conn_id.into_inner());
    tracing::info!(%conn_id, %player_id, peer = %conn.peer_addr(), "player connected");

    let (outbound, rx) = mpsc::unbounded_channel();
    tokio::spawn(write_loop(Arc::clone(&conn), rx, Arc::clone(&state)));

    let _guard = SeatGuard {
        player_id,
        state: Arc::clone(&state),
    };
    let session = Session {
        player_id,
        outbound,
    };

    loop {
        let received = match state.config.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, conn.recv()).await {
                Ok(received) => received,
                Err(_) => {
                    tracing::info!(%player_id, "connection idle, closing");
                    break;
                }
            },
            None => conn.recv().await,
        };

        let data = match received {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        let request = match decode_request(&state.codec, &data) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode request");
                session.send(ServerResponse::InvalidRequest(MALFORMED_REQUEST.into()));
                continue;
            }
        };

        tracing::debug!(%player_id, kind = request.kind(), "request received");
        dispatch(&state, &session, request).await;
    }

    // _guard drops here → the player leaves their room.
    Ok(())
}

fn decode_request(codec: &impl Codec, data: &[u8]) -> Result<ClientRequest, ProtocolError> {
    let envelope: Envelope = codec.decode(data)?;
    ClientRequest::try_from(envelope)
}

async fn dispatch<S, C>(state: &ServerState<S, C>, session: &Session, request: ClientRequest)
where
    S: WinStore,
    C: Codec,
{
    match request {
        ClientRequest::CreateGame(create) => handle_create(state, session, create).await,
        ClientRequest::JoinGame(join) => handle_join(state, session, join).await,
        ClientRequest::Answer(answer) => handle_answer(state, session, answer).await,
        ClientRequest::Leave => handle_leave(state, session).await,
        ClientRequest::GetLeaderboard => handle_leaderboard(state, session).await,
    }
}

async fn handle_create<S, C>(state: &ServerState<S, C>, session: &Session, create: CreateGame)
where
    S: WinStore,
    C: Codec,
{
    let result = state.rooms.lock().await.create_room(
        session.player_id,
        &create,
        state.words.as_ref(),
        session.outbound.clone(),
    );
    if let Err(e) = result {
        session.reject(&e);
    }
}

async fn handle_join<S, C>(state: &ServerState<S, C>, session: &Session, join: JoinGame)
where
    S: WinStore,
    C: Codec,
{
    // Lock only for the join itself; the room does the fan-out.
    let result = {
        let mut rooms = state.rooms.lock().await;
        rooms
            .join_room(
                session.player_id,
                &join.room_code,
                &join.nickname,
                session.outbound.clone(),
            )
            .await
    };
    match result {
        Ok(joined) => tracing::info!(
            player_id = %session.player_id,
            room = %join.room_code,
            opponent = %joined.opponent,
            mode = joined.settings.mode,
            "player joined room"
        ),
        Err(e) => session.reject(&e),
    }
}

async fn handle_answer<S, C>(state: &ServerState<S, C>, session: &Session, answer: Answer)
where
    S: WinStore,
    C: Codec,
{
    // Clone the handle out so other rooms aren't held up while this one
    // works.
    let handle = state.rooms.lock().await.handle_for(session.player_id);
    let result = match handle {
        Ok(handle) => handle.answer(session.player_id, answer).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => {
            if let Some(result) = outcome.result {
                credit_winners(&state.store, &result.credited).await;
            }
        }
        Err(e) => session.reject(&e),
    }
}

async fn handle_leave<S, C>(state: &ServerState<S, C>, session: &Session)
where
    S: WinStore,
    C: Codec,
{
    let result = state.rooms.lock().await.leave_room(session.player_id).await;
    match result {
        Ok(outcome) => {
            tracing::info!(
                player_id = %session.player_id,
                opponent = ?outcome.remaining,
                "player left room"
            );
        }
        Err(e) => session.reject(&e),
    }
}

async fn handle_leaderboard<S, C>(state: &ServerState<S, C>, session: &Session)
where
    S: WinStore,
    C: Codec,
{
    let rows = match state.store.top_players(state.config.leaderboard_limit).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(error = %e, "leaderboard unavailable, sending empty board");
            Vec::new()
        }
    };
    session.send(ServerResponse::Leaderboard(rows));
}

/// Records a win for each credited player. Store failures are logged;
/// the match result stands regardless.
async fn credit_winners(store: &impl WinStore, credited: &[String]) {
    for username in credited {
        if let Err(e) = store.record_win(username).await {
            tracing::warn!(%username, error = %e, "failed to record win");
            continue;
        }
        let wins = store.wins_for(username).await.unwrap_or(0);
        tracing::info!(%username, wins, "win recorded");
    }
}

/// Drains the player's outbound channel into the socket.
///
/// Ends once every sender is gone (the handler has exited and the room
/// has dropped the player) or the socket stops accepting writes.
async fn write_loop<S, C>(
    conn: Arc<LineConnection>,
    mut rx: mpsc::UnboundedReceiver<ServerResponse>,
    state: Arc<ServerState<S, C>>,
) where
    S: WinStore,
    C: Codec,
{
    let conn_id = conn.id();
    while let Some(response) = rx.recv().await {
        let bytes = match response
            .to_envelope()
            .and_then(|envelope| state.codec.encode(&envelope))
        {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    %conn_id,
                    kind = response.kind(),
                    error = %e,
                    "failed to encode response"
                );
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
            break;
        }
    }
    let _ = conn.close().await;
}
