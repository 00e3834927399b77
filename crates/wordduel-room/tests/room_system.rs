//! Integration tests for the room system: registry, actor, and the
//! message stream each player sees.

use std::time::Duration;

use tokio::sync::mpsc;
use wordduel_protocol::{Answer, CreateGame, GameSettings, PlayerId, RoomCode, ServerResponse};
use wordduel_room::{EVERYONE, PlayerSender, RoomError, RoomManager, RoomState};
use wordduel_words::WordLists;

// =========================================================================
// Helpers
// =========================================================================

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

fn words() -> WordLists {
    WordLists::new().with_mode(5, ["CRANE", "SLATE", "TRACE"], ["ADIEU"])
}

fn channel() -> (PlayerSender, mpsc::UnboundedReceiver<ServerResponse>) {
    mpsc::unbounded_channel()
}

/// Creates a dummy player sender (receiver is dropped immediately).
fn dummy_sender() -> PlayerSender {
    mpsc::unbounded_channel().0
}

fn create(code: &str, nickname: &str, rounds: u32, infinite: bool) -> CreateGame {
    CreateGame {
        room_code: RoomCode::from(code),
        nickname: nickname.into(),
        mode: Some(5),
        attempts: Some(6),
        rounds: Some(rounds),
        infinite,
    }
}

fn answer(guesses_used: u32, seconds: f64, success: Option<bool>) -> Answer {
    Answer {
        guess: "CRANE".into(),
        guesses_used,
        seconds,
        success,
    }
}

/// Everything queued for a player so far. Room replies are only sent
/// after the actor has queued its messages, so nothing is in flight.
fn drain(rx: &mut mpsc::UnboundedReceiver<ServerResponse>) -> Vec<ServerResponse> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

/// A manager with a started match between alice (P-1, host) and bob
/// (P-2), with both inboxes drained.
async fn started_match(
    rounds: u32,
    infinite: bool,
) -> (
    RoomManager,
    mpsc::UnboundedReceiver<ServerResponse>,
    mpsc::UnboundedReceiver<ServerResponse>,
) {
    let mut mgr = RoomManager::new();
    let (alice_tx, mut alice_rx) = channel();
    let (bob_tx, mut bob_rx) = channel();
    mgr.create_room(pid(1), &create("ROOM", "alice", rounds, infinite), &words(), alice_tx)
        .unwrap();
    mgr.join_room(pid(2), &RoomCode::from("ROOM"), "bob", bob_tx)
        .await
        .unwrap();
    drain(&mut alice_rx);
    drain(&mut bob_rx);
    (mgr, alice_rx, bob_rx)
}

async fn submit(
    mgr: &RoomManager,
    player: PlayerId,
    answer: Answer,
) -> Result<wordduel_room::AnswerOutcome, RoomError> {
    mgr.handle_for(player)?.answer(player, answer).await
}

// =========================================================================
// Create / join
// =========================================================================

#[tokio::test]
async fn test_create_room_sends_settings_to_host() {
    let mut mgr = RoomManager::new();
    let (tx, mut rx) = channel();
    let settings = mgr
        .create_room(pid(1), &create("ROOM", "alice", 2, false), &words(), tx)
        .unwrap();

    assert_eq!(
        settings,
        GameSettings {
            mode: 5,
            max_guesses: 6,
            rounds: 2,
            infinite: false
        }
    );
    assert_eq!(drain(&mut rx), vec![ServerResponse::Settings(settings)]);
    assert_eq!(mgr.room_count(), 1);
    assert_eq!(mgr.player_room(pid(1)), Some(&RoomCode::from("ROOM")));

    let info = mgr.get_room_info(&RoomCode::from("ROOM")).await.unwrap();
    assert_eq!(info.state, RoomState::AwaitingGuest);
    assert_eq!(info.player_count, 1);
    assert_eq!(info.word_count, 2);
}

#[tokio::test]
async fn test_create_room_code_taken() {
    let mut mgr = RoomManager::new();
    mgr.create_room(pid(1), &create("ROOM", "alice", 2, false), &words(), dummy_sender())
        .unwrap();
    let result =
        mgr.create_room(pid(2), &create("ROOM", "bob", 2, false), &words(), dummy_sender());
    assert!(matches!(result, Err(RoomError::CodeTaken(_))));
    assert_eq!(mgr.room_count(), 1);
}

#[tokio::test]
async fn test_create_room_one_room_at_a_time() {
    let mut mgr = RoomManager::new();
    mgr.create_room(pid(1), &create("A", "alice", 2, false), &words(), dummy_sender())
        .unwrap();
    let result = mgr.create_room(pid(1), &create("B", "alice", 2, false), &words(), dummy_sender());
    assert!(matches!(result, Err(RoomError::AlreadyInRoom(_))));
}

#[tokio::test]
async fn test_create_room_without_words_for_mode() {
    let mut mgr = RoomManager::new();
    let request = CreateGame {
        mode: Some(6),
        ..create("ROOM", "alice", 2, false)
    };
    let result = mgr.create_room(pid(1), &request, &words(), dummy_sender());
    assert!(matches!(result, Err(RoomError::InvalidSettings(_))));
    assert_eq!(mgr.room_count(), 0);
    assert_eq!(mgr.player_room(pid(1)), None);
}

#[tokio::test]
async fn test_join_room_not_found() {
    let mut mgr = RoomManager::new();
    let result = mgr
        .join_room(pid(1), &RoomCode::from("NOPE"), "bob", dummy_sender())
        .await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

#[tokio::test]
async fn test_join_room_starts_match_for_both() {
    let mut mgr = RoomManager::new();
    let (alice_tx, mut alice_rx) = channel();
    let (bob_tx, mut bob_rx) = channel();
    let settings = mgr
        .create_room(pid(1), &create("ROOM", "alice", 2, false), &words(), alice_tx)
        .unwrap();
    drain(&mut alice_rx);

    let joined = mgr
        .join_room(pid(2), &RoomCode::from("ROOM"), "bob", bob_tx)
        .await
        .unwrap();
    assert_eq!(joined.opponent, pid(1));
    assert_eq!(joined.settings, settings);
    assert_eq!(mgr.opponent_of(pid(1)), Some(pid(2)));
    assert_eq!(mgr.opponent_of(pid(2)), Some(pid(1)));

    let alice = drain(&mut alice_rx);
    let bob = drain(&mut bob_rx);
    assert_eq!(alice.len(), 4);
    assert_eq!(bob.len(), 4);

    // Same secret words for both, two rounds of five letters.
    let ServerResponse::Guesses(words) = &alice[0] else {
        panic!("expected GUESSES first, got {:?}", alice[0]);
    };
    assert_eq!(words.len(), 2);
    assert!(words.iter().all(|w| w.len() == 5));
    assert_eq!(bob[0], alice[0]);

    assert_eq!(alice[1], ServerResponse::Settings(settings));
    assert_eq!(
        alice[2],
        ServerResponse::Opponent {
            name: "bob".into(),
            points: 0
        }
    );
    assert_eq!(
        bob[2],
        ServerResponse::Opponent {
            name: "alice".into(),
            points: 0
        }
    );
    assert_eq!(alice[3], ServerResponse::Start);
    assert_eq!(bob[3], ServerResponse::Start);
}

#[tokio::test]
async fn test_join_room_full_leaves_state_unchanged() {
    let (mut mgr, mut alice_rx, mut bob_rx) = started_match(2, false).await;
    let (carol_tx, mut carol_rx) = channel();

    let result = mgr
        .join_room(pid(3), &RoomCode::from("ROOM"), "carol", carol_tx)
        .await;
    let err = result.unwrap_err();
    assert!(matches!(err, RoomError::RoomFull(_)));
    assert_eq!(err.reason(), "Room full");

    let info = mgr.get_room_info(&RoomCode::from("ROOM")).await.unwrap();
    assert_eq!(info.player_count, 2);
    assert_eq!(info.state, RoomState::Active);
    assert_eq!(mgr.player_room(pid(3)), None);
    assert!(drain(&mut alice_rx).is_empty());
    assert!(drain(&mut bob_rx).is_empty());
    assert!(drain(&mut carol_rx).is_empty());
}

#[tokio::test]
async fn test_join_room_nickname_taken() {
    let mut mgr = RoomManager::new();
    mgr.create_room(pid(1), &create("ROOM", "alice", 2, false), &words(), dummy_sender())
        .unwrap();
    let result = mgr
        .join_room(pid(2), &RoomCode::from("ROOM"), "alice", dummy_sender())
        .await;
    assert!(matches!(result, Err(RoomError::NicknameTaken(_))));
    assert_eq!(mgr.player_room(pid(2)), None);
}

// =========================================================================
// Answers and rounds
// =========================================================================

#[tokio::test]
async fn test_answer_before_guest_joins() {
    let mut mgr = RoomManager::new();
    mgr.create_room(pid(1), &create("ROOM", "alice", 2, false), &words(), dummy_sender())
        .unwrap();
    let result = submit(&mgr, pid(1), answer(3, 10.0, Some(true))).await;
    assert!(matches!(result, Err(RoomError::NoActiveRound)));
}

#[tokio::test]
async fn test_answer_not_in_room() {
    let mgr = RoomManager::new();
    let result = submit(&mgr, pid(1), answer(3, 10.0, Some(true))).await;
    assert!(matches!(result, Err(RoomError::NotInRoom(_))));
}

#[tokio::test]
async fn test_two_round_match_end_to_end() {
    let (mgr, mut alice_rx, mut bob_rx) = started_match(2, false).await;

    // Round 1: alice solves in 3 within 10s, bob exhausts after 200s.
    let outcome = submit(&mgr, pid(1), answer(3, 10.0, Some(true))).await.unwrap();
    assert_eq!(outcome.points, 80);
    assert_eq!(outcome.result, None);
    assert_eq!(
        drain(&mut alice_rx),
        vec![ServerResponse::PointsUpdate {
            your_points: 80,
            opponent_points: 0
        }]
    );
    assert_eq!(
        drain(&mut bob_rx),
        vec![ServerResponse::PointsUpdate {
            your_points: 0,
            opponent_points: 80
        }]
    );

    let outcome = submit(&mgr, pid(2), answer(6, 200.0, Some(false))).await.unwrap();
    assert_eq!(outcome.points, 0);
    assert_eq!(outcome.result, None);
    assert_eq!(
        drain(&mut bob_rx),
        vec![
            ServerResponse::PointsUpdate {
                your_points: 0,
                opponent_points: 80
            },
            ServerResponse::Opponent {
                name: "alice".into(),
                points: 80
            },
            ServerResponse::NewRound,
        ]
    );
    assert_eq!(
        drain(&mut alice_rx),
        vec![
            ServerResponse::PointsUpdate {
                your_points: 80,
                opponent_points: 0
            },
            ServerResponse::Opponent {
                name: "bob".into(),
                points: 0
            },
            ServerResponse::NewRound,
        ]
    );

    // Round 2: bob catches up partly, alice keeps the lead.
    submit(&mgr, pid(1), answer(6, 30.0, Some(false))).await.unwrap();
    let outcome = submit(&mgr, pid(2), answer(5, 10.0, Some(true))).await.unwrap();
    assert_eq!(outcome.points, 60);
    let result = outcome.result.expect("match should be over");
    assert_eq!(result.winner_name, "alice");
    assert_eq!(result.credited, ["alice"]);

    let alice = drain(&mut alice_rx);
    let bob = drain(&mut bob_rx);
    assert_eq!(alice.last(), Some(&ServerResponse::Winner("alice".into())));
    assert_eq!(bob.last(), Some(&ServerResponse::Winner("alice".into())));

    let info = mgr.get_room_info(&RoomCode::from("ROOM")).await.unwrap();
    assert_eq!(info.state, RoomState::Finished);
    assert_eq!(info.scores, vec![(pid(1), 80), (pid(2), 60)]);

    let late = submit(&mgr, pid(1), answer(1, 1.0, Some(true))).await;
    assert!(matches!(late, Err(RoomError::GameFinished)));
}

#[tokio::test]
async fn test_lone_answer_does_not_advance() {
    let (mgr, mut alice_rx, _bob_rx) = started_match(2, false).await;
    submit(&mgr, pid(1), answer(3, 10.0, Some(true))).await.unwrap();

    let alice = drain(&mut alice_rx);
    assert!(!alice.contains(&ServerResponse::NewRound));
}

#[tokio::test]
async fn test_second_answer_same_round_rejected() {
    let (mgr, _alice_rx, _bob_rx) = started_match(2, false).await;
    submit(&mgr, pid(1), answer(3, 10.0, Some(true))).await.unwrap();

    let err = submit(&mgr, pid(1), answer(1, 1.0, Some(true))).await.unwrap_err();
    assert!(matches!(err, RoomError::AlreadyAnswered(_)));
    assert_eq!(err.reason(), "Answer already recorded");

    let info = mgr.get_room_info(&RoomCode::from("ROOM")).await.unwrap();
    assert_eq!(info.scores, vec![(pid(1), 80), (pid(2), 0)]);
}

#[tokio::test]
async fn test_concurrent_answers_scored_once() {
    let (mgr, _alice_rx, _bob_rx) = started_match(2, false).await;
    let handle = mgr.handle_for(pid(1)).unwrap();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            handle.answer(pid(1), answer(3, 10.0, Some(true))).await
        }));
    }

    let mut accepted = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(err) => assert!(matches!(err, RoomError::AlreadyAnswered(_))),
        }
    }
    assert_eq!(accepted, 1);

    let info = mgr.get_room_info(&RoomCode::from("ROOM")).await.unwrap();
    assert_eq!(info.scores[0], (pid(1), 80));
}

#[tokio::test]
async fn test_fixed_mode_tie_goes_to_host() {
    // A fixed match has no shared win: equal scores name the host.
    let (mgr, mut alice_rx, _bob_rx) = started_match(1, false).await;
    submit(&mgr, pid(1), answer(3, 10.0, Some(true))).await.unwrap();
    let outcome = submit(&mgr, pid(2), answer(3, 10.0, Some(true))).await.unwrap();

    let result = outcome.result.unwrap();
    assert_eq!(result.winner_name, "alice");
    assert_eq!(result.credited, ["alice"]);
    assert_eq!(
        drain(&mut alice_rx).last(),
        Some(&ServerResponse::Winner("alice".into()))
    );
}

#[tokio::test]
async fn test_infinite_mode_continues_with_new_word() {
    let (mgr, mut alice_rx, _bob_rx) = started_match(5, true).await;
    submit(&mgr, pid(1), answer(2, 10.0, Some(true))).await.unwrap();
    drain(&mut alice_rx);
    submit(&mgr, pid(2), answer(6, 10.0, Some(false))).await.unwrap();

    let alice = drain(&mut alice_rx);
    let ServerResponse::Guesses(words) = &alice[1] else {
        panic!("expected refreshed GUESSES, got {alice:?}");
    };
    assert_eq!(words.len(), 2);
    assert_eq!(alice.last(), Some(&ServerResponse::NewRound));

    let info = mgr.get_room_info(&RoomCode::from("ROOM")).await.unwrap();
    assert_eq!(info.word_count, 2);
    assert_eq!(info.state, RoomState::Active);
}

#[tokio::test]
async fn test_infinite_mode_tie_credits_everyone() {
    let (mgr, mut alice_rx, mut bob_rx) = started_match(5, true).await;
    submit(&mgr, pid(1), answer(6, 10.0, Some(false))).await.unwrap();
    let outcome = submit(&mgr, pid(2), answer(6, 10.0, Some(false))).await.unwrap();

    let result = outcome.result.unwrap();
    assert_eq!(result.winner_name, EVERYONE);
    assert_eq!(result.credited, ["alice", "bob"]);
    assert_eq!(
        drain(&mut alice_rx).last(),
        Some(&ServerResponse::Winner(EVERYONE.into()))
    );
    assert_eq!(
        drain(&mut bob_rx).last(),
        Some(&ServerResponse::Winner(EVERYONE.into()))
    );
}

#[tokio::test]
async fn test_infinite_mode_higher_score_wins() {
    let (mgr, _alice_rx, _bob_rx) = started_match(5, true).await;
    submit(&mgr, pid(1), answer(1, 10.0, Some(true))).await.unwrap();
    submit(&mgr, pid(2), answer(6, 10.0, Some(false))).await.unwrap();

    submit(&mgr, pid(1), answer(6, 10.0, Some(false))).await.unwrap();
    let outcome = submit(&mgr, pid(2), answer(6, 10.0, Some(false))).await.unwrap();

    let result = outcome.result.unwrap();
    assert_eq!(result.winner_name, "alice");
    assert_eq!(result.credited, ["alice"]);
}

#[tokio::test]
async fn test_missing_success_is_inferred_from_guess_count() {
    // Over the limit counts as a failure, so both failing ends an
    // infinite match.
    let (mgr, _alice_rx, _bob_rx) = started_match(5, true).await;
    submit(&mgr, pid(1), answer(7, 10.0, None)).await.unwrap();
    let outcome = submit(&mgr, pid(2), answer(7, 10.0, None)).await.unwrap();
    assert_eq!(outcome.result.unwrap().winner_name, EVERYONE);
}

// =========================================================================
// Leaving
// =========================================================================

#[tokio::test]
async fn test_guest_leave_notifies_host_and_reopens_room() {
    let (mut mgr, mut alice_rx, _bob_rx) = started_match(2, false).await;

    let outcome = mgr.leave_room(pid(2)).await.unwrap();
    assert_eq!(outcome.remaining, Some(pid(1)));
    assert_eq!(drain(&mut alice_rx), vec![ServerResponse::OpponentLeft]);
    assert_eq!(mgr.opponent_of(pid(1)), None);
    assert_eq!(mgr.player_room(pid(2)), None);
    assert_eq!(mgr.room_count(), 1);

    let info = mgr.get_room_info(&RoomCode::from("ROOM")).await.unwrap();
    assert_eq!(info.state, RoomState::AwaitingGuest);

    // A fresh guest can take the seat.
    mgr.join_room(pid(3), &RoomCode::from("ROOM"), "carol", dummy_sender())
        .await
        .unwrap();
    assert_eq!(mgr.opponent_of(pid(1)), Some(pid(3)));
}

#[tokio::test]
async fn test_host_leave_promotes_guest() {
    let (mut mgr, _alice_rx, mut bob_rx) = started_match(2, false).await;

    mgr.leave_room(pid(1)).await.unwrap();
    assert_eq!(drain(&mut bob_rx), vec![ServerResponse::OpponentLeft]);

    let info = mgr.get_room_info(&RoomCode::from("ROOM")).await.unwrap();
    assert_eq!(info.scores, vec![(pid(2), 0)]);
}

#[tokio::test]
async fn test_last_leave_destroys_room_and_frees_code() {
    let (mut mgr, _alice_rx, _bob_rx) = started_match(2, false).await;
    mgr.leave_room(pid(1)).await.unwrap();
    let outcome = mgr.leave_room(pid(2)).await.unwrap();
    assert!(outcome.room_emptied());
    assert_eq!(mgr.room_count(), 0);
    assert_eq!(mgr.player_count(), 0);

    let result = mgr
        .get_room_info(&RoomCode::from("ROOM"))
        .await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));

    // The code is free again.
    mgr.create_room(pid(3), &create("ROOM", "carol", 2, false), &words(), dummy_sender())
        .unwrap();
    assert_eq!(mgr.room_count(), 1);
}

#[tokio::test]
async fn test_leave_not_in_any_room() {
    let mut mgr = RoomManager::new();
    let result = mgr.leave_room(pid(1)).await;
    assert!(matches!(result, Err(RoomError::NotInRoom(_))));
}

#[tokio::test]
async fn test_join_finished_room_rejected() {
    let (mut mgr, _alice_rx, _bob_rx) = started_match(1, false).await;
    submit(&mgr, pid(1), answer(3, 10.0, Some(true))).await.unwrap();
    submit(&mgr, pid(2), answer(3, 10.0, Some(true))).await.unwrap();
    mgr.leave_room(pid(2)).await.unwrap();

    let result = tokio::time::timeout(
        Duration::from_secs(1),
        mgr.join_room(pid(3), &RoomCode::from("ROOM"), "carol", dummy_sender()),
    )
    .await
    .expect("join should not hang");
    let err = result.unwrap_err();
    assert!(matches!(err, RoomError::GameFinished));
    assert_eq!(err.reason(), "Game already finished");
}
