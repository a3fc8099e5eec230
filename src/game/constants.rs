//! Table-size and timing constants shared across the engine.

/// Number of cards in a standard deck.
pub const DECK_SIZE: usize = 52;

/// Private cards dealt to each player.
pub const HOLE_CARDS: usize = 2;

/// Maximum number of community cards on the board.
pub const BOARD_SIZE: usize = 5;

/// Hard cap on seats at a table. With 9 players, a full deal consumes
/// 9 * 2 + 5 = 23 cards, so the deck can never run dry.
pub const MAX_SEATS: usize = 9;

/// A hand needs at least this many players with chips.
pub const MIN_PLAYERS: usize = 2;

pub const DEFAULT_STARTING_STACK: u32 = 1000;
pub const DEFAULT_SMALL_BLIND: u32 = 10;
pub const DEFAULT_BIG_BLIND: u32 = 20;

/// Seconds a player has to act before the room folds for them.
pub const DEFAULT_TURN_SECONDS: u64 = 30;
