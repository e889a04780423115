//! Infrastructure layer: persistence, room lifecycle and wire DTOs.

pub mod connections;
pub mod dto;
pub mod ledger;
pub mod registry;
pub mod room;
pub mod track_source;

pub use connections::{ConnId, ConnectionRegistry, IdentityError};
pub use ledger::{LedgerRecord, ScoreLedger};
pub use registry::{RegistryError, RoomRegistry};
pub use room::GameRoom;
pub use track_source::{BuiltinTracks, TrackSource, TrackSourceError};
