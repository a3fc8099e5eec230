//! Room configuration models.

use serde::{Deserialize, Serialize};

use crate::game::constants;
use crate::game::entities::{Blinds, Chips};

/// Room configuration, fixed at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Display name for the room
    pub name: String,

    /// Small blind amount
    pub small_blind: Chips,

    /// Big blind amount
    pub big_blind: Chips,

    /// Stack every player is seated with
    pub starting_stack: Chips,

    /// Maximum number of seats
    pub max_seats: usize,

    /// Seconds a player may sit on their turn before being folded
    pub turn_timeout_secs: u64,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            name: "Home Game".to_string(),
            small_blind: constants::DEFAULT_SMALL_BLIND,
            big_blind: constants::DEFAULT_BIG_BLIND,
            starting_stack: constants::DEFAULT_STARTING_STACK,
            max_seats: constants::MAX_SEATS,
            turn_timeout_secs: constants::DEFAULT_TURN_SECONDS,
        }
    }
}

impl RoomConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.small_blind == 0 {
            return Err("Small blind must be at least 1".to_string());
        }
        if self.big_blind <= self.small_blind {
            return Err("Big blind must be greater than small blind".to_string());
        }
        if self.starting_stack < self.big_blind {
            return Err("Starting stack must cover the big blind".to_string());
        }
        if self.max_seats < constants::MIN_PLAYERS || self.max_seats > constants::MAX_SEATS {
            return Err(format!(
                "Max seats must be between {} and {}",
                constants::MIN_PLAYERS,
                constants::MAX_SEATS
            ));
        }
        if self.turn_timeout_secs == 0 {
            return Err("Turn timeout must be at least 1 second".to_string());
        }
        Ok(())
    }

    /// Blind structure for dealing hands
    #[must_use]
    pub fn blinds(&self) -> Blinds {
        Blinds {
            small: self.small_blind,
            big: self.big_blind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RoomConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_blinds_rejected() {
        let config = RoomConfig {
            small_blind: 20,
            big_blind: 10,
            ..RoomConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_seat_bounds_enforced() {
        let config = RoomConfig {
            max_seats: 1,
            ..RoomConfig::default()
        };
        assert!(config.validate().is_err());
        let config = RoomConfig {
            max_seats: 10,
            ..RoomConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_starting_stack_must_cover_big_blind() {
        let config = RoomConfig {
            starting_stack: 10,
            ..RoomConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
