//! Room registry keyed by join code.

use std::collections::HashMap;

use rand::Rng;

use super::actor::{RoomActor, RoomHandle};
use super::config::RoomConfig;

const CODE_LENGTH: usize = 6;
const CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Spawns rooms and hands out their join codes. Codes are short so they
/// can be read out loud; ambiguous characters (0/O, 1/I) are excluded.
#[derive(Default)]
pub struct RoomManager {
    rooms: HashMap<String, RoomHandle>,
}

impl RoomManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config, spawn a room task, and register it under a
    /// fresh join code.
    pub fn create_room(&mut self, config: RoomConfig) -> Result<(String, RoomHandle), String> {
        config.validate()?;
        let code = loop {
            let candidate = generate_code();
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        let (actor, handle) = RoomActor::new(config);
        tokio::spawn(actor.run());
        log::info!("Created room {code}");
        self.rooms.insert(code.clone(), handle.clone());
        Ok((code, handle))
    }

    /// Look up a running room by its join code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<RoomHandle> {
        self.rooms.get(&code.to_uppercase()).cloned()
    }

    /// Drop a room from the registry. The actor itself shuts down once
    /// every handle is gone or it is explicitly closed.
    pub fn remove(&mut self, code: &str) -> Option<RoomHandle> {
        self.rooms.remove(&code.to_uppercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| {
            let i = rng.random_range(0..CODE_CHARSET.len());
            char::from(CODE_CHARSET[i])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_use_the_unambiguous_charset() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| CODE_CHARSET.contains(&b)));
        }
    }

    #[tokio::test]
    async fn test_create_and_look_up_room() {
        let mut manager = RoomManager::new();
        let (code, _) = manager.create_room(RoomConfig::default()).unwrap();
        assert!(manager.get(&code).is_some());
        assert!(manager.get(&code.to_lowercase()).is_some());
        assert!(manager.get("XXXXXX").is_none());
        assert_eq!(manager.len(), 1);

        manager.remove(&code);
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let mut manager = RoomManager::new();
        let config = RoomConfig {
            big_blind: 5,
            ..RoomConfig::default()
        };
        assert!(manager.create_room(config).is_err());
        assert!(manager.is_empty());
    }
}
