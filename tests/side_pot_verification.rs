//! Side pot allocation tests.
//!
//! These verify pot distribution across all-in layering scenarios, both
//! directly against the allocator and end-to-end through betting:
//! - every chip contributed is paid out (conservation)
//! - nobody wins more than the pots they are eligible for
//! - folded players fund pots but cannot win them

use holdem_engine::game::pot::allocate;
use holdem_engine::{
    Action, Blinds, Chips, Deck, GameSnapshot, Phase, Player, PlayerHand, PlayerId, ValidAction,
};
use proptest::prelude::*;

/// Deal unique hole cards and a board from one deck, then override each
/// player's contribution and fold flag.
fn rig_hands(entries: &[(Chips, bool)]) -> (Vec<PlayerHand>, Vec<holdem_engine::Card>) {
    let mut deck = Deck::new();
    deck.shuffle();
    let hands = entries
        .iter()
        .map(|&(contributed, folded)| {
            let cards = deck.deal(2).unwrap();
            let mut ph = PlayerHand::new(PlayerId::new_v4(), [cards[0], cards[1]]);
            ph.total_contributed = contributed;
            ph.is_folded = folded;
            ph
        })
        .collect();
    let board = deck.deal(5).unwrap();
    (hands, board)
}

/// The most a player can win: their own stake matched against every
/// other player, chip for chip.
fn max_winnable(hands: &[PlayerHand], winner: &PlayerHand) -> Chips {
    hands
        .iter()
        .map(|ph| ph.total_contributed.min(winner.total_contributed))
        .sum()
}

#[test]
fn test_short_all_in_main_pot_is_capped() {
    // Player 0 all-in for $50, players 1 and 2 put in $100 each. The
    // short stack can win at most $150 no matter what they hold.
    let (hands, board) = rig_hands(&[(50, false), (100, false), (100, false)]);
    let payouts = allocate(&hands, &board);

    let total: Chips = payouts.iter().map(|p| p.amount).sum();
    assert_eq!(total, 250);
    for payout in &payouts {
        let winner = hands
            .iter()
            .find(|ph| ph.player_id == payout.player_id)
            .unwrap();
        assert!(payout.amount <= max_winnable(&hands, winner));
    }
}

#[test]
fn test_four_way_all_in_layers_three_side_pots() {
    // Stakes 25 / 75 / 150 / 150 layer into pots of 100, 150, and 150.
    let (hands, board) = rig_hands(&[(25, false), (75, false), (150, false), (150, false)]);
    let payouts = allocate(&hands, &board);

    let total: Chips = payouts.iter().map(|p| p.amount).sum();
    assert_eq!(total, 400);
    for payout in &payouts {
        let winner = hands
            .iter()
            .find(|ph| ph.player_id == payout.player_id)
            .unwrap();
        assert!(!winner.is_folded);
        assert!(payout.amount <= max_winnable(&hands, winner));
        assert!(payout.hand.is_some());
    }
}

#[test]
fn test_all_in_cascade_through_betting_conserves_chips() {
    // Three stacks shove preflop; the engine layers the pots itself.
    let players = vec![Player::new(0, 80), Player::new(1, 200), Player::new(2, 500)];
    let mut game =
        GameSnapshot::start_hand(Blinds { small: 10, big: 20 }, players, None, 1).unwrap();

    while game.hand.phase != Phase::Showdown {
        let seat = game.hand.current_seat.unwrap();
        game.apply_action(seat, Action::AllIn).unwrap();
    }

    assert_eq!(game.hand.pot, 0);
    assert_eq!(game.hand.community_cards.len(), 5);
    let total: Chips = game.players.iter().map(|p| p.chips).sum();
    assert_eq!(total, 780);
    // The short stack can at most triple up.
    assert!(game.player_by_seat(0).unwrap().chips <= 240);
}

#[test]
fn test_fold_out_after_all_in_still_pays_correctly() {
    // Seat 0 shoves short, seat 1 calls, seat 2 folds its big blind.
    let players = vec![Player::new(0, 60), Player::new(1, 400), Player::new(2, 400)];
    let mut game =
        GameSnapshot::start_hand(Blinds { small: 10, big: 20 }, players, None, 1).unwrap();

    game.apply_action(0, Action::AllIn).unwrap();
    game.apply_action(1, Action::Call).unwrap();
    let result = game.apply_action(2, Action::Fold).unwrap();

    // One caller against one all-in: nothing left to bet, the board runs.
    assert!(result.hand_complete);
    assert_eq!(game.hand.community_cards.len(), 5);
    let total: Chips = game.players.iter().map(|p| p.chips).sum();
    assert_eq!(total, 860);
    // The folded big blind lost exactly 20.
    assert_eq!(game.player_by_seat(2).unwrap().chips, 380);
}

#[test]
fn test_heads_up_check_down_splits_or_awards_everything() {
    let players = vec![Player::new(0, 300), Player::new(1, 300)];
    let mut game =
        GameSnapshot::start_hand(Blinds { small: 10, big: 20 }, players, None, 1).unwrap();

    let mut done = false;
    while !done {
        let seat = game.hand.current_seat.unwrap();
        let actions = game.valid_actions(seat).unwrap();
        let action = if actions.contains(&ValidAction::Check) {
            Action::Check
        } else {
            Action::Call
        };
        done = game.apply_action(seat, action).unwrap().hand_complete;
    }
    let total: Chips = game.players.iter().map(|p| p.chips).sum();
    assert_eq!(total, 600);
}

#[test]
fn test_sole_live_player_collects_uncalled_excess() {
    // Everyone else folded: the last live hand takes the whole pot
    // without a showdown, even the part its own stake never matched.
    let (hands, board) = rig_hands(&[(1, false), (2, true)]);
    let payouts = allocate(&hands, &board);

    assert_eq!(payouts.len(), 1);
    assert_eq!(payouts[0].player_id, hands[0].player_id);
    assert_eq!(payouts[0].amount, 3);
    assert!(payouts[0].hand.is_none());
}

proptest! {
    #[test]
    fn test_allocation_conserves_every_chip(
        entries in prop::collection::vec((0u32..=500, prop::bool::ANY), 2..=6)
            .prop_filter("at least one live stake", |entries| {
                entries.iter().any(|&(c, folded)| c > 0 && !folded)
            }),
    ) {
        let (hands, board) = rig_hands(&entries);
        let payouts = allocate(&hands, &board);

        let contributed: Chips = entries.iter().map(|&(c, _)| c).sum();
        let paid: Chips = payouts.iter().map(|p| p.amount).sum();
        prop_assert_eq!(contributed, paid);
    }

    #[test]
    fn test_no_payout_exceeds_eligibility(
        // With a single live player the pot goes over uncontested,
        // uncalled excess included, so the matching bound only holds
        // once at least two hands reach showdown.
        entries in prop::collection::vec((1u32..=500, prop::bool::ANY), 2..=6)
            .prop_filter("at least two live stakes", |entries| {
                entries.iter().filter(|&&(_, folded)| !folded).count() >= 2
            }),
    ) {
        let (hands, board) = rig_hands(&entries);
        let payouts = allocate(&hands, &board);

        for payout in &payouts {
            let winner = hands
                .iter()
                .find(|ph| ph.player_id == payout.player_id)
                .unwrap();
            prop_assert!(payout.amount <= max_winnable(&hands, winner));
        }
    }

    #[test]
    fn test_live_players_win_every_contested_level(
        stakes in prop::collection::vec(1u32..=300, 2..=6),
    ) {
        // Nobody folded, so every chip must land on a live player with a
        // showdown hand attached.
        let entries: Vec<(Chips, bool)> = stakes.iter().map(|&c| (c, false)).collect();
        let (hands, board) = rig_hands(&entries);
        let payouts = allocate(&hands, &board);

        for payout in &payouts {
            prop_assert!(payout.hand.is_some());
            prop_assert!(hands.iter().any(|ph| ph.player_id == payout.player_id));
        }
    }
}
