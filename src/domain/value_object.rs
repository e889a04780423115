//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ValueObjectError;

/// Minimum accepted room passphrase length.
pub const MIN_PASSWORD_LEN: usize = 4;

/// Room name value object.
///
/// The display form keeps the caller's casing (trimmed); the lookup `key()`
/// is trimmed and lower-cased, which is what makes room names unique
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomName(String);

impl RoomName {
    /// Create a new RoomName from raw client input.
    ///
    /// The input is trimmed; an empty or over-long result is rejected.
    pub fn new(raw: &str) -> Result<Self, ValueObjectError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::RoomNameEmpty);
        }
        let len = trimmed.chars().count();
        if len > 50 {
            return Err(ValueObjectError::RoomNameTooLong {
                max: 50,
                actual: len,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the display form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive registry key.
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Player display name value object.
///
/// Two names identify the same player when their `key()` forms match. Two
/// distinct people with identical display names cannot coexist in one room;
/// this is an accepted product constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerName(String);

impl PlayerName {
    /// Create a new PlayerName from raw client input (trimmed).
    pub fn new(raw: &str) -> Result<Self, ValueObjectError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::PlayerNameEmpty);
        }
        let len = trimmed.chars().count();
        if len > 50 {
            return Err(ValueObjectError::PlayerNameTooLong {
                max: 50,
                actual: len,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the display form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical identity key: trimmed, lower-cased.
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    /// Canonical key for an arbitrary stored name string.
    pub fn key_of(raw: &str) -> String {
        raw.trim().to_lowercase()
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
