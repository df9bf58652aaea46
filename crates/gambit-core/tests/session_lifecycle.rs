//! End-to-end session behavior against an in-memory store: joining, turn
//! order, the draw protocol, termination, settlement, and liveness.

use std::sync::Arc;

use chrono::{Duration, Utc};

use gambit_core::{Coordinator, CoordinatorConfig, CoreError, RecordKind};
use gambit_rules::StandardRules;
use gambit_shared::records::{GameRecord, PlayerRecord, PlayerView};
use gambit_shared::types::{Color, GameResult, GameStatus, MoveInput, PlayerId};
use gambit_store::RecordStore;

fn coordinator() -> Coordinator {
    Coordinator::new(
        RecordStore::open_in_memory().unwrap(),
        Arc::new(StandardRules::new()),
        CoordinatorConfig::default(),
    )
}

fn mv(from: &str, to: &str) -> MoveInput {
    MoveInput {
        from: from.into(),
        to: to.into(),
        promotion: None,
    }
}

/// Host a party game with `host` in the white seat and `joiner` joining via
/// the shared code.  Returns the ongoing game.
async fn hosted_game(
    coordinator: &Coordinator,
    host: &PlayerView,
    joiner: &PlayerView,
) -> GameRecord {
    let (_, code) = coordinator.create_party_game(host.id).await.unwrap();
    coordinator
        .join_by_code(&code.to_lowercase(), joiner.id)
        .await
        .unwrap()
}

async fn stats(coordinator: &Coordinator, id: PlayerId) -> (u32, u32, u32, u32) {
    let p = coordinator.get_player(id).await.unwrap();
    (p.games_played, p.wins, p.losses, p.draws)
}

#[tokio::test]
async fn register_login_and_name_conflicts() {
    let coordinator = coordinator();

    let anna = coordinator.register("Anna", "secret99").await.unwrap();
    assert_eq!(anna.name, "Anna");

    // Same name, any case, is taken by someone else.
    let err = coordinator.register("anna", "different1").await.unwrap_err();
    assert!(matches!(err, CoreError::NameTaken));

    // The lock itself is idempotent for the owning id (registration retry).
    assert!(coordinator.claim_name("Anna", anna.id).await.unwrap());
    assert!(!coordinator.claim_name("Anna", PlayerId::new()).await.unwrap());

    let back = coordinator.login("  anna ", "secret99").await.unwrap();
    assert_eq!(back.id, anna.id);

    let err = coordinator.login("anna", "wrong-pass").await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidCredentials));

    let err = coordinator.register("ab", "secret99").await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));
}

#[tokio::test]
async fn join_is_idempotent_and_full_games_reject() {
    let coordinator = coordinator();
    let host = coordinator.guest().await.unwrap();
    let joiner = coordinator.guest().await.unwrap();
    let third = coordinator.guest().await.unwrap();

    let (game, code) = coordinator.create_party_game(host.id).await.unwrap();
    assert_eq!(game.status, GameStatus::Waiting);
    assert!(game.black.is_none());

    let joined = coordinator.join_game(game.id, joiner.id).await.unwrap();
    assert_eq!(joined.status, GameStatus::Ongoing);

    // Second join by either seated player changes nothing.
    let again = coordinator.join_game(game.id, joiner.id).await.unwrap();
    assert_eq!(again, joined);
    let host_again = coordinator.join_game(game.id, host.id).await.unwrap();
    assert_eq!(host_again, joined);

    let err = coordinator.join_game(game.id, third.id).await.unwrap_err();
    assert!(matches!(err, CoreError::GameFull));

    // The party code still resolves to the same game, case-insensitively.
    let via_code = coordinator.join_by_code(&code, joiner.id).await.unwrap();
    assert_eq!(via_code.id, game.id);
}

#[tokio::test]
async fn moves_enforce_turn_order_and_participation() {
    let coordinator = coordinator();
    let host = coordinator.guest().await.unwrap();
    let joiner = coordinator.guest().await.unwrap();
    let outsider = coordinator.guest().await.unwrap();

    let (waiting, _) = coordinator.create_party_game(host.id).await.unwrap();
    let err = coordinator
        .make_move(waiting.id, host.id, &mv("e2", "e4"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotStarted));

    let game = hosted_game(&coordinator, &host, &joiner).await;

    // Black cannot open.
    let err = coordinator
        .make_move(game.id, joiner.id, &mv("e7", "e5"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotYourTurn));

    let after = coordinator
        .make_move(game.id, host.id, &mv("e2", "e4"))
        .await
        .unwrap();
    assert_eq!(after.turn, Color::Black);
    assert_eq!(after.history, vec!["e4".to_string()]);

    // White cannot move twice in a row.
    let err = coordinator
        .make_move(game.id, host.id, &mv("d2", "d4"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotYourTurn));

    let err = coordinator
        .make_move(game.id, outsider.id, &mv("e7", "e5"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotAParticipant));

    // An illegal move leaves the record untouched.
    let before = coordinator.get_game(game.id).await.unwrap();
    let err = coordinator
        .make_move(game.id, joiner.id, &mv("e7", "e3"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::IllegalMove(_)));
    assert_eq!(coordinator.get_game(game.id).await.unwrap(), before);
}

#[tokio::test]
async fn checkmate_settles_exactly_once() {
    let coordinator = coordinator();
    let host = coordinator.guest().await.unwrap();
    let joiner = coordinator.guest().await.unwrap();
    let game = hosted_game(&coordinator, &host, &joiner).await;

    coordinator
        .send_chat(game.id, host.id, "good luck")
        .await
        .unwrap();

    // Fool's mate: the joiner (black) wins.
    for (player, from, to) in [
        (host.id, "f2", "f3"),
        (joiner.id, "e7", "e5"),
        (host.id, "g2", "g4"),
        (joiner.id, "d8", "h4"),
    ] {
        coordinator
            .make_move(game.id, player, &mv(from, to))
            .await
            .unwrap();
    }

    let finished = coordinator.get_game(game.id).await.unwrap();
    assert_eq!(finished.status, GameStatus::Checkmate);
    assert_eq!(finished.winner, Some(Color::Black));
    assert!(finished.chat.is_empty());
    assert_eq!(finished.history.last().map(String::as_str), Some("Qh4#"));

    assert_eq!(stats(&coordinator, joiner.id).await, (1, 1, 0, 0));
    assert_eq!(stats(&coordinator, host.id).await, (1, 0, 1, 0));
    assert_eq!(coordinator.get_player(host.id).await.unwrap().current_game, None);
    assert_eq!(coordinator.get_player(joiner.id).await.unwrap().current_game, None);

    let host_history = coordinator.player_history(host.id).await.unwrap();
    let joiner_history = coordinator.player_history(joiner.id).await.unwrap();
    assert_eq!(host_history.len(), 1);
    assert_eq!(joiner_history.len(), 1);
    assert_eq!(host_history[0].result, GameResult::Loss);
    assert_eq!(joiner_history[0].result, GameResult::Win);
    assert_eq!(host_history[0].end_status, GameStatus::Checkmate);

    // Nothing moves in a finished game, and re-running termination logic is
    // a no-op: counters and ledgers stay put.
    let err = coordinator
        .make_move(game.id, host.id, &mv("e2", "e4"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::GameOver));
    assert!(!coordinator.abandon(game.id, host.id).await.unwrap());
    assert_eq!(stats(&coordinator, joiner.id).await, (1, 1, 0, 0));
    assert_eq!(coordinator.player_history(joiner.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn draw_protocol_guards_and_settles() {
    let coordinator = coordinator();
    let host = coordinator.guest().await.unwrap();
    let joiner = coordinator.guest().await.unwrap();
    let game = hosted_game(&coordinator, &host, &joiner).await;

    let offered = coordinator.offer_draw(game.id, host.id).await.unwrap();
    assert_eq!(offered.draw_offer, Some(Color::White));

    // Only one offer may be pending, regardless of who tries.
    let err = coordinator.offer_draw(game.id, host.id).await.unwrap_err();
    assert!(matches!(err, CoreError::OfferPending));
    let err = coordinator.offer_draw(game.id, joiner.id).await.unwrap_err();
    assert!(matches!(err, CoreError::OfferPending));

    // The offering side cannot resolve its own offer.
    let err = coordinator
        .respond_draw(game.id, host.id, true)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NoOffer));

    // Rejection clears the offer and play continues.
    let rejected = coordinator
        .respond_draw(game.id, joiner.id, false)
        .await
        .unwrap();
    assert_eq!(rejected.status, GameStatus::Ongoing);
    assert_eq!(rejected.draw_offer, None);
    let err = coordinator
        .respond_draw(game.id, joiner.id, false)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NoOffer));

    // An accepted move wipes a fresh offer.
    coordinator.offer_draw(game.id, joiner.id).await.unwrap();
    let after_move = coordinator
        .make_move(game.id, host.id, &mv("e2", "e4"))
        .await
        .unwrap();
    assert_eq!(after_move.draw_offer, None);

    // Acceptance ends the game as a draw and settles both sides.
    coordinator.offer_draw(game.id, host.id).await.unwrap();
    let drawn = coordinator
        .respond_draw(game.id, joiner.id, true)
        .await
        .unwrap();
    assert_eq!(drawn.status, GameStatus::Draw);
    assert_eq!(drawn.winner, None);
    assert!(drawn.chat.is_empty());

    assert_eq!(stats(&coordinator, host.id).await, (1, 0, 0, 1));
    assert_eq!(stats(&coordinator, joiner.id).await, (1, 0, 0, 1));
    assert_eq!(
        coordinator.player_history(host.id).await.unwrap()[0].result,
        GameResult::Draw
    );
}

#[tokio::test]
async fn chat_is_cleared_on_termination_and_orphaned_after() {
    let coordinator = coordinator();
    let host = coordinator.guest().await.unwrap();
    let joiner = coordinator.guest().await.unwrap();
    let game = hosted_game(&coordinator, &host, &joiner).await;

    coordinator.send_chat(game.id, host.id, "hi").await.unwrap();
    let with_chat = coordinator.send_chat(game.id, joiner.id, "hi back").await.unwrap();
    assert_eq!(with_chat.chat.len(), 2);
    assert_eq!(with_chat.chat[0].text, "hi");

    coordinator.offer_draw(game.id, host.id).await.unwrap();
    coordinator
        .respond_draw(game.id, joiner.id, true)
        .await
        .unwrap();

    // Messages after termination land in a fresh, never-rendered log.
    let after = coordinator.send_chat(game.id, host.id, "gg").await.unwrap();
    assert_eq!(after.chat.len(), 1);
    assert_eq!(after.chat[0].text, "gg");
}

#[tokio::test]
async fn abandonment_awards_the_opponent() {
    let coordinator = coordinator();
    let host = coordinator.guest().await.unwrap();
    let joiner = coordinator.guest().await.unwrap();

    // Abandoning a waiting game is a silent no-op.
    let (waiting, _) = coordinator.create_party_game(host.id).await.unwrap();
    assert!(!coordinator.abandon(waiting.id, host.id).await.unwrap());

    let game = hosted_game(&coordinator, &host, &joiner).await;
    coordinator.send_chat(game.id, host.id, "brb").await.unwrap();

    // A non-participant cannot trigger a forfeit.
    assert!(!coordinator.abandon(game.id, PlayerId::new()).await.unwrap());

    assert!(coordinator.abandon(game.id, host.id).await.unwrap());
    let finished = coordinator.get_game(game.id).await.unwrap();
    assert_eq!(finished.status, GameStatus::Abandoned);
    assert_eq!(finished.winner, Some(Color::Black));
    assert!(finished.chat.is_empty());

    assert_eq!(stats(&coordinator, host.id).await, (1, 0, 1, 0));
    assert_eq!(stats(&coordinator, joiner.id).await, (1, 1, 0, 0));

    // Re-invoking is a no-op; nothing double-applies.
    assert!(!coordinator.abandon(game.id, host.id).await.unwrap());
    assert_eq!(stats(&coordinator, host.id).await, (1, 0, 1, 0));
    assert_eq!(coordinator.player_history(host.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn stale_heartbeat_forfeits_on_fetch_and_sweep() {
    let coordinator = coordinator();
    let host = coordinator.guest().await.unwrap();
    let joiner = coordinator.guest().await.unwrap();
    let game = hosted_game(&coordinator, &host, &joiner).await;

    coordinator.heartbeat(host.id).await.unwrap();
    coordinator.heartbeat(joiner.id).await.unwrap();
    assert_eq!(
        coordinator.fetch_game(game.id).await.unwrap().status,
        GameStatus::Ongoing
    );

    // Age the host's heartbeat past the threshold.
    coordinator
        .entities()
        .update::<PlayerRecord, _, _>(RecordKind::Player, &host.id.to_string(), |p| {
            p.last_seen = Utc::now() - Duration::seconds(300);
            Ok(())
        })
        .await
        .unwrap();

    let fetched = coordinator.fetch_game(game.id).await.unwrap();
    assert_eq!(fetched.status, GameStatus::Abandoned);
    assert_eq!(fetched.winner, Some(Color::Black));

    // The sweep finds nothing left to do.
    assert_eq!(coordinator.sweep_abandoned().await.unwrap(), 0);
}

#[tokio::test]
async fn invitations_create_games_and_clean_up() {
    let coordinator = coordinator();
    let anna = coordinator.register("Anna", "secret99").await.unwrap();
    let bo = coordinator.register("Bodil", "secret99").await.unwrap();

    let err = coordinator.send_invitation(anna.id, anna.id).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));

    let game_id = coordinator.send_invitation(anna.id, bo.id).await.unwrap();

    let bo_view = coordinator.get_player(bo.id).await.unwrap();
    assert_eq!(bo_view.incoming_invitations.len(), 1);
    assert_eq!(bo_view.incoming_invitations[0].game_id, game_id);
    assert_eq!(bo_view.incoming_invitations[0].from_name, "Anna");
    assert_eq!(
        coordinator.get_player(anna.id).await.unwrap().current_game,
        Some(game_id)
    );

    // Joining consumes the invitation.
    coordinator.join_game(game_id, bo.id).await.unwrap();
    let bo_view = coordinator.get_player(bo.id).await.unwrap();
    assert!(bo_view.incoming_invitations.is_empty());
    assert_eq!(bo_view.current_game, Some(game_id));

    // Declining a second invitation removes it without touching the game.
    let second = coordinator.send_invitation(anna.id, bo.id).await.unwrap();
    let view = coordinator.decline_invitation(bo.id, second).await.unwrap();
    assert!(view.incoming_invitations.is_empty());
    assert_eq!(
        coordinator.get_game(second).await.unwrap().status,
        GameStatus::Waiting
    );
}

#[tokio::test]
async fn friend_graph_stays_symmetric() {
    let coordinator = coordinator();
    let anna = coordinator.register("Anna", "secret99").await.unwrap();
    let bo = coordinator.register("Bodil", "secret99").await.unwrap();
    let cleo = coordinator.register("Cleo", "secret99").await.unwrap();

    let err = coordinator
        .send_friend_request(anna.id, anna.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));

    coordinator.send_friend_request(anna.id, bo.id).await.unwrap();
    // Re-sending collapses into the existing request.
    coordinator.send_friend_request(anna.id, bo.id).await.unwrap();

    let bo_view = coordinator.get_player(bo.id).await.unwrap();
    assert_eq!(bo_view.incoming_friend_requests.len(), 1);
    assert_eq!(bo_view.incoming_friend_requests[0].from_name, "Anna");
    assert_eq!(
        coordinator.get_player(anna.id).await.unwrap().sent_friend_requests,
        vec![bo.id]
    );

    coordinator.accept_friend_request(bo.id, anna.id).await.unwrap();
    let anna_view = coordinator.get_player(anna.id).await.unwrap();
    let bo_view = coordinator.get_player(bo.id).await.unwrap();
    assert_eq!(anna_view.friends, vec![bo.id]);
    assert_eq!(bo_view.friends, vec![anna.id]);
    assert!(anna_view.sent_friend_requests.is_empty());
    assert!(bo_view.incoming_friend_requests.is_empty());

    // Declining leaves no trace on either side.
    coordinator.send_friend_request(cleo.id, anna.id).await.unwrap();
    coordinator.decline_friend_request(anna.id, cleo.id).await.unwrap();
    assert!(coordinator
        .get_player(anna.id)
        .await
        .unwrap()
        .incoming_friend_requests
        .is_empty());
    assert!(coordinator
        .get_player(cleo.id)
        .await
        .unwrap()
        .sent_friend_requests
        .is_empty());

    let friends = coordinator.list_friends(anna.id).await.unwrap();
    assert_eq!(friends.len(), 1);
    assert_eq!(friends[0].id, bo.id);

    coordinator.remove_friend(anna.id, bo.id).await.unwrap();
    assert!(coordinator.get_player(anna.id).await.unwrap().friends.is_empty());
    assert!(coordinator.get_player(bo.id).await.unwrap().friends.is_empty());
}
