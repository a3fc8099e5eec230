//! Core poker engine: entities, betting state machine, hand evaluation,
//! pot allocation, and the hand lifecycle.
//!
//! Everything in this module is synchronous and deterministic given a
//! deck order; the async room layer in [`crate::table`] drives it.

pub mod betting;
pub mod constants;
pub mod entities;
pub mod errors;
pub mod eval;
pub mod lifecycle;
pub mod pot;

pub use betting::ActionResult;
pub use entities::{
    Action, AddonRequest, AddonStatus, Blinds, Card, Chips, Deck, GameSnapshot, Hand, HandVersion,
    HandView, Phase, Player, PlayerHand, PlayerId, RoomStatus, SeatIndex, SeatView, Suit,
    ValidAction, Value,
};
pub use errors::{EngineError, EngineResult};
pub use eval::{HandCategory, HandValue};
pub use pot::Payout;
