use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::constants;
use super::errors::{EngineError, EngineResult};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Spade,
    Heart,
    Diamond,
    Club,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Diamond, Suit::Club];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Spade => "♠",
            Self::Heart => "♥",
            Self::Diamond => "♦",
            Self::Club => "♣",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values. Deuce is 2, ace is always stored high
/// as 14; the evaluator handles the ace-low wheel straight itself.
pub type Value = u8;

pub const VALUE_MIN: Value = 2;
pub const VALUE_ACE: Value = 14;

/// A card is a tuple of a value (2u8 ... ace=14u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            14 => "A".to_string(),
            13 => "K".to_string(),
            12 => "Q".to_string(),
            11 => "J".to_string(),
            10 => "T".to_string(),
            v => v.to_string(),
        };
        write!(f, "{value}{}", self.1)
    }
}

/// Type alias for whole chips. All bets and stacks are integral; there is
/// nothing smaller than one chip to argue over.
pub type Chips = u32;

/// Type alias for seat positions at the table.
pub type SeatIndex = usize;

/// Monotonically increasing hand number within a room. Backs latest-hand
/// lookup and optimistic concurrency rejection.
pub type HandVersion = u32;

/// Opaque player identity. The session layer that maps tokens to ids
/// lives outside the engine.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerId(Uuid);

impl PlayerId {
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An ordered run of undealt cards, consumed front-to-back.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// The canonical 52-card sequence, deterministic order.
    #[must_use]
    pub fn new() -> Self {
        let mut cards = Vec::with_capacity(constants::DECK_SIZE);
        for suit in Suit::ALL {
            for value in VALUE_MIN..=VALUE_ACE {
                cards.push(Card(value, suit));
            }
        }
        Self { cards }
    }

    /// Uniformly random permutation (Fisher-Yates via `rand`).
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut rand::rng());
    }

    /// Remove and return the first `n` cards.
    pub fn deal(&mut self, n: usize) -> EngineResult<Vec<Card>> {
        if n > self.cards.len() {
            return Err(EngineError::InsufficientCards {
                requested: n,
                remaining: self.cards.len(),
            });
        }
        Ok(self.cards.drain(..n).collect())
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Blinds {
    pub small: Chips,
    pub big: Chips,
}

impl fmt::Display for Blinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}/{}", self.small, self.big)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

/// Betting round stage. Strictly forward; `Showdown` is terminal for
/// the hand.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Phase {
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Preflop => Self::Flop,
            Self::Flop => Self::Turn,
            Self::Turn => Self::River,
            Self::River | Self::Showdown => Self::Showdown,
        }
    }

    /// Community cards dealt when entering this phase.
    #[must_use]
    pub fn cards_on_entry(self) -> usize {
        match self {
            Self::Flop => 3,
            Self::Turn | Self::River => 1,
            Self::Preflop | Self::Showdown => 0,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
        };
        write!(f, "{repr}")
    }
}

/// A seated player. The chip stack is mutated only by blind posting,
/// action processing, pot payout, and add-on approval.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub seat: SeatIndex,
    pub chips: Chips,
    pub connected: bool,
}

impl Player {
    #[must_use]
    pub fn new(seat: SeatIndex, chips: Chips) -> Self {
        Self {
            id: PlayerId::new_v4(),
            seat,
            chips,
            connected: true,
        }
    }
}

/// One played-out round of poker.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Hand {
    pub version: HandVersion,
    pub dealer_seat: SeatIndex,
    pub phase: Phase,
    /// Shared cards, 0 to 5, append-only within a hand.
    pub community_cards: Vec<Card>,
    /// Total chips committed this hand.
    pub pot: Chips,
    /// Highest total round-bet facing players this betting round.
    pub current_bet: Chips,
    /// Size of the most recent raise increment; floors the next minimum
    /// raise.
    pub last_raise: Chips,
    /// Seat to act, or `None` when no action is pending.
    pub current_seat: Option<SeatIndex>,
    pub deck: Deck,
    /// Anchor for the caller-side turn countdown.
    pub turn_start_time: DateTime<Utc>,
}

/// Per-player state for one hand. `current_bet` resets every betting
/// round; `total_contributed` accumulates across rounds and drives the
/// side-pot math, so it must never be reset mid-hand. `is_folded` and
/// `is_all_in` are monotonic within a hand.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerHand {
    pub player_id: PlayerId,
    pub hole_cards: [Card; 2],
    pub current_bet: Chips,
    pub total_contributed: Chips,
    pub has_acted: bool,
    pub is_folded: bool,
    pub is_all_in: bool,
}

impl PlayerHand {
    #[must_use]
    pub fn new(player_id: PlayerId, hole_cards: [Card; 2]) -> Self {
        Self {
            player_id,
            hole_cards,
            current_bet: 0,
            total_contributed: 0,
            has_acted: false,
            is_folded: false,
            is_all_in: false,
        }
    }
}

/// A player action as submitted. `Raise` carries the new total bet-to
/// amount for the round, not an increment.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Fold,
    Check,
    Call,
    Raise(Chips),
    AllIn,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Fold => "folds".to_string(),
            Self::Check => "checks".to_string(),
            Self::Call => "calls".to_string(),
            Self::Raise(amount) => format!("raises to ${amount}"),
            Self::AllIn => "goes all-in".to_string(),
        };
        write!(f, "{repr}")
    }
}

/// An action offer with its legal amount bounds, as presented to the
/// seat to act.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidAction {
    Fold,
    Check,
    /// The bounded call amount: min(owed, stack).
    Call(Chips),
    /// Legal raise-to range; the max is going fully all-in.
    Raise { min: Chips, max: Chips },
    /// The player's entire remaining stack.
    AllIn(Chips),
}

impl fmt::Display for ValidAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Fold => "fold".to_string(),
            Self::Check => "check".to_string(),
            Self::Call(amount) => format!("call (== ${amount})"),
            Self::Raise { min, max } => format!("raise (${min}..=${max})"),
            Self::AllIn(amount) => format!("all-in (== ${amount})"),
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddonStatus {
    Pending,
    Approved,
    Rejected,
}

/// An out-of-band chip top-up awaiting host approval. Orthogonal to the
/// betting engine; approval credits the stack directly.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AddonRequest {
    pub id: Uuid,
    pub player_id: PlayerId,
    pub amount: Chips,
    pub status: AddonStatus,
    pub requested_at: DateTime<Utc>,
}

impl AddonRequest {
    #[must_use]
    pub fn new(player_id: PlayerId, amount: Chips) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_id,
            amount,
            status: AddonStatus::Pending,
            requested_at: Utc::now(),
        }
    }
}

/// Full state of one hand in flight: the seated players, the hand record,
/// and the per-player hand records. The engine takes this snapshot,
/// mutates it atomically per action, and signals completion; everything
/// around it (storage, fan-out) is the caller's concern.
///
/// `players` and `player_hands` are kept in ascending seat order of their
/// owners. Players without a `PlayerHand` entry (joined broke or
/// mid-hand) are seated but not dealt in.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub blinds: Blinds,
    pub players: Vec<Player>,
    pub hand: Hand,
    pub player_hands: Vec<PlayerHand>,
}

impl GameSnapshot {
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn player_by_seat(&self, seat: SeatIndex) -> Option<&Player> {
        self.players.iter().find(|p| p.seat == seat)
    }

    #[must_use]
    pub fn seat_of(&self, id: PlayerId) -> Option<SeatIndex> {
        self.player(id).map(|p| p.seat)
    }

    #[must_use]
    pub fn player_hand(&self, id: PlayerId) -> Option<&PlayerHand> {
        self.player_hands.iter().find(|ph| ph.player_id == id)
    }

    #[must_use]
    pub fn player_hand_by_seat(&self, seat: SeatIndex) -> Option<&PlayerHand> {
        let player = self.player_by_seat(seat)?;
        self.player_hand(player.id)
    }

    /// Players still contesting the pot.
    #[must_use]
    pub fn non_folded_count(&self) -> usize {
        self.player_hands.iter().filter(|ph| !ph.is_folded).count()
    }

    /// Seats eligible to act: dealt in, not folded, not all-in. Ascending
    /// seat order.
    #[must_use]
    pub fn eligible_seats(&self) -> Vec<SeatIndex> {
        let mut seats: Vec<SeatIndex> = self
            .player_hands
            .iter()
            .filter(|ph| !ph.is_folded && !ph.is_all_in)
            .filter_map(|ph| self.seat_of(ph.player_id))
            .collect();
        seats.sort_unstable();
        seats
    }

    /// Sum of every player's contribution this hand. Equals `hand.pot`
    /// at all times before payout.
    #[must_use]
    pub fn total_contributed(&self) -> Chips {
        self.player_hands.iter().map(|ph| ph.total_contributed).sum()
    }

    /// Per-viewer projection. Hole cards other than the viewer's own are
    /// redacted until showdown; folded hands stay hidden even then.
    #[must_use]
    pub fn view_for(&self, viewer: PlayerId) -> HandView {
        let seats = self
            .players
            .iter()
            .map(|p| {
                let ph = self.player_hand(p.id);
                let showing = p.id == viewer
                    || (self.hand.phase == Phase::Showdown
                        && ph.is_some_and(|ph| !ph.is_folded));
                SeatView {
                    player_id: p.id,
                    seat: p.seat,
                    chips: p.chips,
                    connected: p.connected,
                    round_bet: ph.map_or(0, |ph| ph.current_bet),
                    total_contributed: ph.map_or(0, |ph| ph.total_contributed),
                    has_acted: ph.is_some_and(|ph| ph.has_acted),
                    is_folded: ph.is_some_and(|ph| ph.is_folded),
                    is_all_in: ph.is_some_and(|ph| ph.is_all_in),
                    hole_cards: ph.filter(|_| showing).map(|ph| ph.hole_cards),
                }
            })
            .collect();
        HandView {
            version: self.hand.version,
            phase: self.hand.phase,
            pot: self.hand.pot,
            current_bet: self.hand.current_bet,
            last_raise: self.hand.last_raise,
            current_seat: self.hand.current_seat,
            community_cards: self.hand.community_cards.clone(),
            turn_start_time: self.hand.turn_start_time,
            seats,
        }
    }
}

/// One seat as a given viewer is allowed to see it.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SeatView {
    pub player_id: PlayerId,
    pub seat: SeatIndex,
    pub chips: Chips,
    pub connected: bool,
    pub round_bet: Chips,
    pub total_contributed: Chips,
    pub has_acted: bool,
    pub is_folded: bool,
    pub is_all_in: bool,
    pub hole_cards: Option<[Card; 2]>,
}

/// The hand as a given viewer is allowed to see it.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HandView {
    pub version: HandVersion,
    pub phase: Phase,
    pub pot: Chips,
    pub current_bet: Chips,
    pub last_raise: Chips,
    pub current_seat: Option<SeatIndex>,
    pub community_cards: Vec<Card>,
    pub turn_start_time: DateTime<Utc>,
    pub seats: Vec<SeatView>,
}
