//! # Hold'em Engine
//!
//! An authoritative Texas Hold'em table engine: betting state machine,
//! seven-card hand evaluation, side-pot allocation, and hand lifecycle,
//! wrapped in an async room actor for serialized concurrent access.
//!
//! ## Architecture
//!
//! The engine core is a plain synchronous state machine over a
//! [`GameSnapshot`]: every submitted action is validated, applied
//! atomically, and resolved (turn passed, street dealt, board run out, or
//! pot settled) in one call. Randomness enters only at the shuffle.
//!
//! Concurrency lives one layer up. A [`table::RoomActor`] owns one
//! table's state inside a tokio task and processes messages from its
//! inbox strictly in order, so there is exactly one writer per hand.
//! Optimistic hand versioning rejects actions raced against a hand that
//! already moved on.
//!
//! ## Core Modules
//!
//! - [`game`]: entities, betting rules, hand evaluation, pots, lifecycle
//! - [`table`]: async room actors, join codes, and the turn clock
//!
//! ## Example
//!
//! ```
//! use holdem_engine::{Action, Blinds, GameSnapshot, Player};
//!
//! let players = vec![Player::new(0, 1000), Player::new(1, 1000)];
//! let blinds = Blinds { small: 10, big: 20 };
//! let mut game = GameSnapshot::start_hand(blinds, players, None, 1).unwrap();
//!
//! // Heads-up the dealer posts the small blind and acts first.
//! let seat = game.hand.current_seat.unwrap();
//! game.apply_action(seat, Action::Call).unwrap();
//! ```

/// Core game logic and entities.
pub mod game;
pub use game::{
    Action, ActionResult, AddonRequest, AddonStatus, Blinds, Card, Chips, Deck, EngineError,
    EngineResult, GameSnapshot, Hand, HandCategory, HandValue, HandVersion, HandView, Payout,
    Phase, Player, PlayerHand, PlayerId, RoomStatus, SeatIndex, SeatView, Suit, ValidAction,
    Value, constants,
};

/// Async room hosting on top of the engine.
pub mod table;
pub use table::{RoomConfig, RoomHandle, RoomManager};
