//! Best-five-of-seven hand evaluation.
//!
//! Showdown hands are ranked by brute force: enumerate all C(7,5) = 21
//! five-card subsets, score each one, keep the maximum. 21 evaluations per
//! player per showdown is nowhere near worth optimizing past.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use super::entities::{Card, VALUE_ACE, Value};

/// Hand categories from weakest to strongest.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum HandCategory {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "high card",
            Self::OnePair => "one pair",
            Self::TwoPair => "two pair",
            Self::ThreeOfAKind => "three of a kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full house",
            Self::FourOfAKind => "four of a kind",
            Self::StraightFlush => "straight flush",
            Self::RoyalFlush => "royal flush",
        };
        write!(f, "{repr}")
    }
}

/// An evaluated hand: its category, the tie-break value vector
/// (most-significant first), and the winning five-card subset.
///
/// Equality and ordering compare category and values only; the concrete
/// cards are presentation data. Two hands that tie card-for-card compare
/// equal even when built from different suits.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HandValue {
    pub category: HandCategory,
    pub values: Vec<Value>,
    pub cards: Vec<Card>,
}

impl PartialEq for HandValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HandValue {}

impl Ord for HandValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.category.cmp(&other.category) {
            Ordering::Equal => {}
            ord => return ord,
        }
        for (mine, theirs) in self.values.iter().zip(&other.values) {
            match mine.cmp(theirs) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        // Elements past the shorter vector are treated as absent; the tie
        // stands if everything present was equal.
        Ordering::Equal
    }
}

impl PartialOrd for HandValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for HandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category)
    }
}

/// Rank the best five-card hand available from hole plus community cards.
///
/// Meaningful with five or more total cards (a live showdown always
/// supplies 2 + 5 = 7); fewer cards rank as a partial hand so callers can
/// still compare, the way preflop bot heuristics do.
#[must_use]
pub fn evaluate(hole_cards: &[Card], community_cards: &[Card]) -> HandValue {
    let mut all = Vec::with_capacity(7);
    all.extend_from_slice(hole_cards);
    all.extend_from_slice(community_cards);
    evaluate_cards(&all)
}

/// Rank a set of up to seven cards by its best five-card subset.
#[must_use]
pub fn evaluate_cards(cards: &[Card]) -> HandValue {
    five_card_subsets(cards)
        .into_iter()
        .map(|subset| evaluate_five(&subset))
        .max()
        .unwrap_or(HandValue {
            category: HandCategory::HighCard,
            values: Vec::new(),
            cards: Vec::new(),
        })
}

/// Indices of the best hand(s) among `hands`; more than one index means a
/// card-for-card tie. Indices come back in input order.
#[must_use]
pub fn best_hands(hands: &[HandValue]) -> Vec<usize> {
    let Some(best) = hands.iter().max() else {
        return Vec::new();
    };
    hands
        .iter()
        .enumerate()
        .filter(|&(_, hand)| hand.cmp(best) == Ordering::Equal)
        .map(|(i, _)| i)
        .collect()
}

/// All five-card subsets, or the input itself when it has five or fewer
/// cards.
fn five_card_subsets(cards: &[Card]) -> Vec<Vec<Card>> {
    let n = cards.len();
    if n <= 5 {
        return if n == 0 { Vec::new() } else { vec![cards.to_vec()] };
    }
    let mut subsets = Vec::with_capacity(21);
    for a in 0..n - 4 {
        for b in a + 1..n - 3 {
            for c in b + 1..n - 2 {
                for d in c + 1..n - 1 {
                    for e in d + 1..n {
                        subsets.push(vec![cards[a], cards[b], cards[c], cards[d], cards[e]]);
                    }
                }
            }
        }
    }
    subsets
}

fn evaluate_five(cards: &[Card]) -> HandValue {
    let mut ranks: Vec<Value> = cards.iter().map(|card| card.0).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.len() == 5 && cards.iter().all(|card| card.1 == cards[0].1);

    let mut distinct = ranks.clone();
    distinct.dedup();
    let straight_high = straight_high_card(&distinct);

    let mut sorted_cards = cards.to_vec();
    sorted_cards.sort_unstable_by(|a, b| b.cmp(a));

    if let (true, Some(high)) = (is_flush, straight_high) {
        let category = if high == VALUE_ACE {
            HandCategory::RoyalFlush
        } else {
            HandCategory::StraightFlush
        };
        return HandValue {
            category,
            values: vec![high],
            cards: sorted_cards,
        };
    }

    // Count ranks, ordered by count descending then rank descending.
    let mut rank_counts: BTreeMap<Value, usize> = BTreeMap::new();
    for &rank in &ranks {
        *rank_counts.entry(rank).or_default() += 1;
    }
    let mut counts: Vec<(Value, usize)> = rank_counts.into_iter().collect();
    counts.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));

    let (category, values) = match counts.as_slice() {
        [(quad, 4), rest @ ..] => (
            HandCategory::FourOfAKind,
            std::iter::once(*quad)
                .chain(rest.iter().map(|(v, _)| *v))
                .collect(),
        ),
        [(trips, 3), (pair, 2), ..] => (HandCategory::FullHouse, vec![*trips, *pair]),
        _ if is_flush => (HandCategory::Flush, ranks.clone()),
        _ if straight_high.is_some() => {
            // straight_high checked above
            (HandCategory::Straight, vec![straight_high.unwrap_or(0)])
        }
        [(trips, 3), rest @ ..] => (
            HandCategory::ThreeOfAKind,
            std::iter::once(*trips)
                .chain(rest.iter().map(|(v, _)| *v))
                .collect(),
        ),
        [(hi, 2), (lo, 2), rest @ ..] => (
            HandCategory::TwoPair,
            [*hi, *lo]
                .into_iter()
                .chain(rest.iter().map(|(v, _)| *v))
                .collect(),
        ),
        [(pair, 2), rest @ ..] => (
            HandCategory::OnePair,
            std::iter::once(*pair)
                .chain(rest.iter().map(|(v, _)| *v))
                .collect(),
        ),
        _ => (HandCategory::HighCard, ranks.clone()),
    };

    HandValue {
        category,
        values,
        cards: sorted_cards,
    }
}

/// The high card of a straight formed by `distinct` (descending, deduped)
/// ranks, or `None`. The wheel A-5-4-3-2 counts with high card 5, not 14.
fn straight_high_card(distinct: &[Value]) -> Option<Value> {
    if distinct.len() != 5 {
        return None;
    }
    if distinct[0] - distinct[4] == 4 {
        return Some(distinct[0]);
    }
    if distinct == [VALUE_ACE, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}
