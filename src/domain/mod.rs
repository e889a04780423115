//! Domain layer for the buzzer game.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod value_object;

pub use entity::{GameState, GameStatus, Player, Room, Track};
pub use error::ValueObjectError;
pub use value_object::{MIN_PASSWORD_LEN, PlayerName, RoomName};
