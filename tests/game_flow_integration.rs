//! Integration tests for room flow.
//!
//! These drive whole hands through the async room actor: joining,
//! dealing, acting, settlement, dealer rotation, add-ons, and view
//! redaction.

use holdem_engine::table::{RoomActor, RoomConfig, RoomEvent, RoomHandle};
use holdem_engine::{Action, Chips, EngineError, Phase, PlayerId, ValidAction};

fn spawn_room(config: RoomConfig) -> RoomHandle {
    let (actor, handle) = RoomActor::new(config);
    tokio::spawn(actor.run());
    handle
}

/// Check or call every decision until the hand settles.
async fn check_it_down(handle: &RoomHandle, players: &[PlayerId], version: u32) {
    for _ in 0..40 {
        let view = handle.view(players[0]).await.unwrap();
        if view.phase == Phase::Showdown {
            return;
        }
        let Some(seat) = view.current_seat else {
            return;
        };
        let actor = view
            .seats
            .iter()
            .find(|s| s.seat == seat)
            .map(|s| s.player_id)
            .unwrap();
        let actions = handle.valid_actions(actor).await.unwrap();
        let action = if actions.contains(&ValidAction::Check) {
            Action::Check
        } else {
            Action::Call
        };
        let result = handle.take_action(actor, version, action).await.unwrap();
        if result.hand_complete {
            return;
        }
    }
    panic!("hand failed to terminate");
}

async fn total_chips(handle: &RoomHandle, viewer: PlayerId) -> Chips {
    let view = handle.view(viewer).await.unwrap();
    view.seats.iter().map(|s| s.chips).sum()
}

#[tokio::test]
async fn test_cannot_start_hand_with_one_player() {
    let handle = spawn_room(RoomConfig::default());
    handle.join().await.unwrap();
    assert_eq!(
        handle.start_hand().await.unwrap_err(),
        EngineError::NotEnoughPlayers
    );
}

#[tokio::test]
async fn test_full_hand_conserves_chips() {
    let handle = spawn_room(RoomConfig::default());
    let mut players = Vec::new();
    for _ in 0..3 {
        players.push(handle.join().await.unwrap().0);
    }
    let version = handle.start_hand().await.unwrap();
    check_it_down(&handle, &players, version).await;

    assert_eq!(total_chips(&handle, players[0]).await, 3000);
}

#[tokio::test]
async fn test_dealer_rotates_between_hands() {
    let handle = spawn_room(RoomConfig::default());
    let mut events = handle.subscribe();
    let mut players = Vec::new();
    for _ in 0..3 {
        players.push(handle.join().await.unwrap().0);
    }

    let mut dealers = Vec::new();
    for _ in 0..3 {
        let version = handle.next_hand().await.unwrap();
        check_it_down(&handle, &players, version).await;
        while let Ok(event) = events.try_recv() {
            if let RoomEvent::HandStarted { dealer_seat, .. } = event {
                dealers.push(dealer_seat);
            }
        }
    }
    assert_eq!(dealers, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_many_hands_never_create_or_destroy_chips() {
    let handle = spawn_room(RoomConfig::default());
    let mut players = Vec::new();
    for _ in 0..4 {
        players.push(handle.join().await.unwrap().0);
    }
    for _ in 0..10 {
        let version = handle.next_hand().await.unwrap();
        check_it_down(&handle, &players, version).await;
        assert_eq!(total_chips(&handle, players[0]).await, 4000);
    }
}

#[tokio::test]
async fn test_hole_cards_are_redacted_until_showdown() {
    let handle = spawn_room(RoomConfig::default());
    let (alice, _) = handle.join().await.unwrap();
    let (bob, _) = handle.join().await.unwrap();
    let version = handle.start_hand().await.unwrap();

    let view = handle.view(alice).await.unwrap();
    for seat in &view.seats {
        if seat.player_id == alice {
            assert!(seat.hole_cards.is_some());
        } else {
            assert!(seat.hole_cards.is_none());
        }
    }

    check_it_down(&handle, &[alice, bob], version).await;
    let view = handle.view(alice).await.unwrap();
    // Nobody folded on a check-down, so both hands show at showdown.
    assert_eq!(view.phase, Phase::Showdown);
    assert!(view.seats.iter().all(|s| s.hole_cards.is_some()));
}

#[tokio::test]
async fn test_folded_hands_stay_hidden_at_showdown() {
    let handle = spawn_room(RoomConfig::default());
    let (alice, _) = handle.join().await.unwrap();
    let (bob, _) = handle.join().await.unwrap();
    let (carol, _) = handle.join().await.unwrap();
    let version = handle.start_hand().await.unwrap();

    handle.take_action(alice, version, Action::Fold).await.unwrap();
    check_it_down(&handle, &[alice, bob, carol], version).await;

    let view = handle.view(bob).await.unwrap();
    let alice_seat = view.seats.iter().find(|s| s.player_id == alice).unwrap();
    assert!(alice_seat.is_folded);
    assert!(alice_seat.hole_cards.is_none());
}

#[tokio::test]
async fn test_addon_approval_credits_between_hands() {
    let handle = spawn_room(RoomConfig::default());
    let (alice, _) = handle.join().await.unwrap();
    handle.join().await.unwrap();

    let request_id = handle.request_addon(alice, 500).await.unwrap();
    handle.resolve_addon(request_id, true).await.unwrap();

    handle.start_hand().await.unwrap();
    let view = handle.view(alice).await.unwrap();
    let alice_seat = view.seats.iter().find(|s| s.player_id == alice).unwrap();
    // Stack was credited before the blinds came out of it.
    assert_eq!(
        alice_seat.chips + alice_seat.total_contributed,
        1000 + 500
    );
}

#[tokio::test]
async fn test_addon_approved_mid_hand_waits_for_settlement() {
    let handle = spawn_room(RoomConfig::default());
    let (alice, _) = handle.join().await.unwrap();
    let (bob, _) = handle.join().await.unwrap();
    let version = handle.start_hand().await.unwrap();

    let request_id = handle.request_addon(alice, 500).await.unwrap();
    handle.resolve_addon(request_id, true).await.unwrap();

    // Mid-hand the stack is untouched.
    let view = handle.view(alice).await.unwrap();
    let alice_seat = view.seats.iter().find(|s| s.player_id == alice).unwrap();
    assert!(alice_seat.chips + alice_seat.total_contributed <= 1000);

    check_it_down(&handle, &[alice, bob], version).await;
    assert_eq!(total_chips(&handle, alice).await, 2500);
}

#[tokio::test]
async fn test_rejected_and_unknown_addons() {
    let handle = spawn_room(RoomConfig::default());
    let (alice, _) = handle.join().await.unwrap();
    handle.join().await.unwrap();

    let request_id = handle.request_addon(alice, 500).await.unwrap();
    handle.resolve_addon(request_id, false).await.unwrap();
    // A resolved request cannot be resolved again.
    assert_eq!(
        handle.resolve_addon(request_id, true).await.unwrap_err(),
        EngineError::UnknownAddonRequest
    );

    handle.start_hand().await.unwrap();
    // The blinds are already in the pot; counting posted chips alongside
    // the stacks shows the rejected add-on credited nothing.
    let view = handle.view(alice).await.unwrap();
    let behind_and_posted: Chips = view
        .seats
        .iter()
        .map(|s| s.chips + s.total_contributed)
        .sum();
    assert_eq!(behind_and_posted, 2000);
}

#[tokio::test]
async fn test_leave_between_hands_frees_the_seat() {
    let handle = spawn_room(RoomConfig::default());
    let (alice, _) = handle.join().await.unwrap();
    handle.join().await.unwrap();
    handle.leave(alice).await.unwrap();

    // Only bob is left, so no hand can start.
    assert_eq!(
        handle.start_hand().await.unwrap_err(),
        EngineError::NotEnoughPlayers
    );
    // Alice's seat 0 is free again for the next joiner.
    let (_, seat) = handle.join().await.unwrap();
    assert_eq!(seat, 0);
}

#[tokio::test]
async fn test_closed_room_rejects_messages() {
    let handle = spawn_room(RoomConfig::default());
    handle.close().await.unwrap();
    // Give the actor task a chance to exit.
    tokio::task::yield_now().await;
    assert_eq!(handle.join().await.unwrap_err(), EngineError::RoomClosed);
}
