//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Object validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// Room name validation error
    #[error("Room name cannot be empty")]
    RoomNameEmpty,

    /// Room name too long error
    #[error("Room name cannot exceed {max} characters (got {actual})")]
    RoomNameTooLong { max: usize, actual: usize },

    /// Player name validation error
    #[error("Player name cannot be empty")]
    PlayerNameEmpty,

    /// Player name too long error
    #[error("Player name cannot exceed {max} characters (got {actual})")]
    PlayerNameTooLong { max: usize, actual: usize },

    /// Passphrase too short error
    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}
