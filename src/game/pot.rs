//! Pot allocation, including side pots.
//!
//! Side pots are never materialized as separate structures during betting.
//! At settlement the pot is reconstructed from each player's
//! `total_contributed`: every distinct contribution total is a level, the
//! chips between two adjacent levels form a slice, and each slice is
//! awarded to the best live hand among the players who reached it. Folded
//! players fund slices but can never win one.

use serde::{Deserialize, Serialize};

use super::entities::{Card, Chips, PlayerHand, PlayerId};
use super::eval::{self, HandValue};

/// One player's winnings at settlement. `hand` is present only when the
/// pot was won at showdown.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Payout {
    pub player_id: PlayerId,
    pub amount: Chips,
    pub hand: Option<HandValue>,
}

/// Split the whole pot among its winners.
///
/// `player_hands` must be in ascending seat order; odd chips that do not
/// divide evenly go to the earliest-seated winners, which keeps the split
/// deterministic. The amounts always sum to the total contributed.
#[must_use]
pub fn allocate(player_hands: &[PlayerHand], community_cards: &[Card]) -> Vec<Payout> {
    let live: Vec<&PlayerHand> = player_hands.iter().filter(|ph| !ph.is_folded).collect();

    // Uncontested: the last player standing takes everything, cards unseen.
    if let [winner] = live.as_slice() {
        let total: Chips = player_hands.iter().map(|ph| ph.total_contributed).sum();
        return vec![Payout {
            player_id: winner.player_id,
            amount: total,
            hand: None,
        }];
    }

    let ranked: Vec<(PlayerId, HandValue)> = live
        .iter()
        .map(|ph| {
            (
                ph.player_id,
                eval::evaluate(&ph.hole_cards, community_cards),
            )
        })
        .collect();

    let mut levels: Vec<Chips> = player_hands
        .iter()
        .map(|ph| ph.total_contributed)
        .filter(|&c| c > 0)
        .collect();
    levels.sort_unstable();
    levels.dedup();

    // Accumulate per player, preserving seat order for the payout list.
    let mut amounts: Vec<(PlayerId, Chips)> = Vec::new();
    let mut credit = |player_id: PlayerId, amount: Chips| {
        if let Some(entry) = amounts.iter_mut().find(|(id, _)| *id == player_id) {
            entry.1 += amount;
        } else {
            amounts.push((player_id, amount));
        }
    };

    let mut previous = 0;
    for level in levels {
        let contributors = player_hands
            .iter()
            .filter(|ph| ph.total_contributed > previous)
            .count() as Chips;
        let slice = (level - previous) * contributors;

        let eligible: Vec<&(PlayerId, HandValue)> = ranked
            .iter()
            .filter(|(id, _)| {
                player_hands
                    .iter()
                    .any(|ph| ph.player_id == *id && ph.total_contributed >= level)
            })
            .collect();

        let winners: Vec<PlayerId> = if eligible.is_empty() {
            // Every contributor who reached this level folded; their chips
            // go back to them rather than vanishing.
            player_hands
                .iter()
                .filter(|ph| ph.total_contributed >= level)
                .map(|ph| ph.player_id)
                .collect()
        } else {
            let hands: Vec<HandValue> = eligible.iter().map(|(_, h)| h.clone()).collect();
            eval::best_hands(&hands)
                .into_iter()
                .map(|i| eligible[i].0)
                .collect()
        };

        let n = winners.len() as Chips;
        let share = slice / n;
        let remainder = slice % n;
        for (i, winner) in winners.iter().enumerate() {
            let extra = Chips::from((i as Chips) < remainder);
            credit(*winner, share + extra);
        }
        previous = level;
    }

    amounts
        .into_iter()
        .filter(|&(_, amount)| amount > 0)
        .map(|(player_id, amount)| Payout {
            player_id,
            amount,
            hand: ranked
                .iter()
                .find(|(id, _)| *id == player_id)
                .map(|(_, hand)| hand.clone()),
        })
        .collect()
}
