//! Room hosting: async actors wrapping the game engine.
//!
//! Each room runs in its own tokio task with an mpsc inbox, making it the
//! single writer for its hand state; callers talk to it through a cloned
//! [`RoomHandle`]. The [`RoomManager`] spawns rooms and maps join codes
//! to handles.

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{RoomActor, RoomHandle};
pub use config::RoomConfig;
pub use manager::RoomManager;
pub use messages::{RoomEvent, RoomMessage};
