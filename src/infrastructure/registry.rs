//! Room registry: creates, authenticates, enumerates and closes rooms.
//!
//! Registry structure (the name → entry map) is guarded by a single mutex
//! distinct from every room's own boundary: create/close never interleave
//! with each other, and never block gameplay inside other rooms. Room
//! handles are cloned out of the map before any room state is touched.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::{GameState, RoomName};
use crate::infrastructure::ledger::ScoreLedger;
use crate::infrastructure::room::GameRoom;
use crate::infrastructure::track_source::{TrackSource, TrackSourceError};

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Duplicate room name while an entry is open.
    #[error("Room already exists")]
    RoomExists,

    /// Passphrase hashing failed; the entry is not created.
    #[error("Failed to hash passphrase: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

struct RoomEntry {
    password_hash: String,
    room: Arc<GameRoom>,
    created_at: DateTime<Utc>,
}

/// Read-only listing row for operator tooling. Passphrase hashes are never
/// part of any snapshot type.
#[derive(Debug, Clone, Serialize)]
pub struct RoomSummary {
    pub name: String,
    pub created_at: String,
    pub player_count: usize,
    pub track_count: usize,
    pub current_track_id: Option<String>,
    pub status: crate::domain::GameStatus,
}

/// Detailed room snapshot for operator tooling.
#[derive(Debug, Clone, Serialize)]
pub struct RoomDetail {
    pub name: String,
    pub created_at: String,
    #[serde(flatten)]
    pub state: GameState,
    pub player_count: usize,
    pub track_count: usize,
}

/// Process-wide room registry. Constructed once at startup and shared by
/// handle; rooms it creates share one score ledger and one track source.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<String, RoomEntry>>,
    ledger: Arc<ScoreLedger>,
    track_source: Arc<dyn TrackSource>,
}

impl RoomRegistry {
    pub fn new(ledger: Arc<ScoreLedger>, track_source: Arc<dyn TrackSource>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            ledger,
            track_source,
        }
    }

    /// Create a room under the given name, seeded with the default track
    /// set. Fails without mutation when the name key is already taken; at
    /// most one of two concurrent creates for the same name wins.
    pub async fn create_room(&self, name: &RoomName, password: &str) -> Result<(), RegistryError> {
        let key = name.key();
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(&key) {
            return Err(RegistryError::RoomExists);
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        let room = Arc::new(GameRoom::new(
            self.track_source.default_tracks(),
            self.ledger.clone(),
        ));
        rooms.insert(
            key.clone(),
            RoomEntry {
                password_hash,
                room,
                created_at: Utc::now(),
            },
        );
        tracing::info!("Room '{}' created", key);
        Ok(())
    }

    /// Authenticate into a room. This is the sole passphrase gate; sessions
    /// past it are not re-checked per message. The stored bcrypt hash is
    /// verified with constant-time comparison semantics.
    pub async fn join_room(&self, name: &RoomName, password: &str) -> Option<Arc<GameRoom>> {
        let rooms = self.rooms.lock().await;
        let entry = rooms.get(&name.key())?;
        if bcrypt::verify(password, &entry.password_hash).unwrap_or(false) {
            Some(entry.room.clone())
        } else {
            None
        }
    }

    /// Fetch a room handle without a passphrase check. For administrative
    /// collaborators and already-authenticated sessions only.
    pub async fn get_room(&self, name: &RoomName) -> Option<Arc<GameRoom>> {
        let rooms = self.rooms.lock().await;
        rooms.get(&name.key()).map(|entry| entry.room.clone())
    }

    pub async fn room_exists(&self, name: &RoomName) -> bool {
        self.rooms.lock().await.contains_key(&name.key())
    }

    /// Close a room; its in-memory state is discarded (scores were mirrored
    /// to the ledger by prior room operations). The name becomes available
    /// again.
    pub async fn close_room(&self, name: &RoomName) -> bool {
        let removed = self.rooms.lock().await.remove(&name.key()).is_some();
        if removed {
            tracing::info!("Room '{}' closed", name.key());
        }
        removed
    }

    /// List all open rooms. Room state is sampled after the registry lock is
    /// released so enumeration never stalls gameplay.
    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        let handles: Vec<(String, String, Arc<GameRoom>)> = {
            let rooms = self.rooms.lock().await;
            rooms
                .iter()
                .map(|(key, entry)| {
                    (
                        key.clone(),
                        entry.created_at.to_rfc3339(),
                        entry.room.clone(),
                    )
                })
                .collect()
        };

        let mut summaries = Vec::with_capacity(handles.len());
        for (name, created_at, room) in handles {
            let state = room.snapshot().await;
            summaries.push(RoomSummary {
                name,
                created_at,
                player_count: state.players.len(),
                track_count: state.tracks.len(),
                current_track_id: state.current_track_id,
                status: state.status,
            });
        }
        summaries
    }

    /// Resolve a playlist through the track source and replace the room's
    /// track list with the result. `Ok(None)` when the room is unknown;
    /// the returned snapshot is what clients should be resynced with.
    pub async fn load_playlist(
        &self,
        name: &RoomName,
        playlist_url: &str,
    ) -> Result<Option<GameState>, TrackSourceError> {
        let Some(room) = self.get_room(name).await else {
            return Ok(None);
        };
        let tracks = self.track_source.fetch(playlist_url).await?;
        tracing::info!(
            "Loaded {} tracks into room '{}'",
            tracks.len(),
            name.key()
        );
        Ok(Some(room.update_tracks(tracks).await))
    }

    /// Detailed snapshot of one room, or `None` when unknown.
    pub async fn get_room_info(&self, name: &RoomName) -> Option<RoomDetail> {
        let (key, created_at, room) = {
            let rooms = self.rooms.lock().await;
            let entry = rooms.get(&name.key())?;
            (
                name.key(),
                entry.created_at.to_rfc3339(),
                entry.room.clone(),
            )
        };

        let state = room.snapshot().await;
        let player_count = state.players.len();
        let track_count = state.tracks.len();
        Some(RoomDetail {
            name: key,
            created_at,
            state,
            player_count,
            track_count,
        })
    }
}
