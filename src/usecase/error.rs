use thiserror::Error;

use crate::domain::ValueObjectError;

/// Why a join was refused. The display text is what the client receives in
/// the `join_error` payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinError {
    #[error("Room name is required")]
    RoomNameRequired,

    #[error("{0}")]
    InvalidName(#[from] ValueObjectError),

    /// Unknown room or wrong passphrase; deliberately indistinguishable.
    #[error("Invalid room or password")]
    Unauthorized,

    #[error("Name is already taken in this room")]
    NameInUse,

    /// The transport dropped while the join was in flight.
    #[error("Connection is no longer open")]
    ConnectionClosed,
}
