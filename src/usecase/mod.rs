//! Use case layer: the join and departure flows that coordinate the room
//! registry with the connection registry.

pub mod error;
pub mod join_room;
pub mod leave_room;

pub use error::JoinError;
pub use join_room::{JoinOutcome, JoinRoomUseCase};
pub use leave_room::{LeaveOutcome, LeaveRoomUseCase};
