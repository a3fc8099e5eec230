//! Engine error types.
//!
//! Every failure in this crate is a local, recoverable condition returned
//! as a typed result. A bad action request fails that one call and mutates
//! nothing; nothing here is fatal to the process driving the engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{Chips, HandVersion, PlayerId, SeatIndex};

/// Errors surfaced by the betting engine and hand lifecycle.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum EngineError {
    /// The action kind is not in the legal set right now.
    #[error("action is not available")]
    InvalidAction,
    /// The action kind is legal but the amount is out of bounds.
    #[error("amount ${amount} must be between ${min} and ${max}")]
    InvalidAmount {
        amount: Chips,
        min: Chips,
        max: Chips,
    },
    /// Submitted by a seat other than the seat to act.
    #[error("not your turn")]
    OutOfTurn,
    /// A concurrent writer lost the race; refetch and resubmit.
    #[error("stale hand state: expected version {expected}, got {got}")]
    StaleState {
        expected: HandVersion,
        got: HandVersion,
    },
    #[error("need 2+ players with chips")]
    NotEnoughPlayers,
    /// Deck exhausted. Unreachable given 52-card accounting for <= 9
    /// players, but checked so a bug fails loudly instead of dealing
    /// corrupt cards.
    #[error("not enough cards: requested {requested}, remaining {remaining}")]
    InsufficientCards { requested: usize, remaining: usize },
    #[error("seat {0} is not dealt into this hand")]
    SeatNotInHand(SeatIndex),
    #[error("player {0} is not in this room")]
    UnknownPlayer(PlayerId),
    #[error("no hand in progress")]
    NoActiveHand,
    #[error("a hand is already in progress")]
    HandInProgress,
    #[error("room is full")]
    RoomFull,
    #[error("room is closed")]
    RoomClosed,
    #[error("add-on request not found or already resolved")]
    UnknownAddonRequest,
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
