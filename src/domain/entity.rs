//! Core domain models for the buzzer game.
//!
//! `Room` here is the pure, synchronous game state machine. The serialized
//! access boundary (one `tokio::sync::Mutex` per room) and the score-ledger
//! write-through live in `infrastructure::room::GameRoom`; nothing at this
//! layer performs I/O or locking.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::value_object::PlayerName;

/// A playable track. Immutable once constructed; a room's track list is
/// replaced wholesale, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A player known to a room. The id is stable across reconnects; the entry
/// stays in the roster after a disconnect so the score survives a drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub score: i64,
}

/// Playback status of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Stopped,
    Playing,
    Paused,
    Preview2,
    Preview5,
}

/// Full state snapshot broadcast to clients on join and resync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub tracks: Vec<Track>,
    pub track_order: Vec<String>,
    pub current_track_id: Option<String>,
    pub status: GameStatus,
    pub buzz_queue: Vec<String>,
    pub players: HashMap<String, Player>,
}

/// One game's authoritative state: track rotation, current track, status,
/// buzz queue and player roster.
///
/// Invariants:
/// - `current_track_id` is `None` iff the track list is empty, otherwise a
///   member of `track_order`;
/// - `buzz_queue` holds only roster ids, in strict FIFO order, no duplicates;
/// - entering `Stopped` always empties the buzz queue.
#[derive(Debug, Clone)]
pub struct Room {
    pub tracks: Vec<Track>,
    pub track_order: Vec<String>,
    pub current_track_id: Option<String>,
    pub status: GameStatus,
    pub buzz_queue: Vec<String>,
    pub players: HashMap<String, Player>,
}

impl Room {
    /// Create a room seeded with the given track list.
    pub fn new(tracks: Vec<Track>) -> Self {
        let mut room = Self {
            tracks,
            track_order: Vec::new(),
            current_track_id: None,
            status: GameStatus::Stopped,
            buzz_queue: Vec::new(),
            players: HashMap::new(),
        };
        room.reset_rotation();
        room
    }

    /// Rebuild the play order as a uniformly random permutation of the
    /// current track ids, point at its first element (or none when empty),
    /// force `Stopped` and clear the buzz queue.
    pub fn reset_rotation(&mut self) {
        self.track_order = self.tracks.iter().map(|t| t.id.clone()).collect();
        self.track_order.shuffle(&mut rand::thread_rng());
        self.current_track_id = self.track_order.first().cloned();
        self.status = GameStatus::Stopped;
        self.buzz_queue.clear();
    }

    /// Copy out a full state snapshot.
    pub fn snapshot(&self) -> GameState {
        GameState {
            tracks: self.tracks.clone(),
            track_order: self.track_order.clone(),
            current_track_id: self.current_track_id.clone(),
            status: self.status,
            buzz_queue: self.buzz_queue.clone(),
            players: self.players.clone(),
        }
    }

    /// Look up a roster entry by canonical name key.
    pub fn find_player_by_name(&self, name_key: &str) -> Option<&Player> {
        self.players
            .values()
            .find(|p| PlayerName::key_of(&p.name) == name_key)
    }

    /// Insert (or re-insert) a roster entry.
    pub fn insert_player(&mut self, player: Player) {
        self.players.insert(player.id.clone(), player);
    }

    /// Remove a player from the roster and purge them from the buzz queue.
    pub fn remove_player(&mut self, player_id: &str) -> Option<Player> {
        let removed = self.players.remove(player_id);
        self.buzz_queue.retain(|id| id != player_id);
        removed
    }

    /// Append a buzz to the queue. Rejected when the player is not on the
    /// roster or already queued. The first buzz into an empty queue pauses
    /// playback.
    pub fn record_buzz(&mut self, player_id: &str) -> bool {
        if !self.players.contains_key(player_id) {
            return false;
        }
        if self.buzz_queue.iter().any(|id| id == player_id) {
            return false;
        }
        let first_buzz = self.buzz_queue.is_empty();
        self.buzz_queue.push(player_id.to_string());
        if first_buzz {
            self.status = GameStatus::Paused;
        }
        true
    }

    /// Award one point, clear the whole buzz queue and stop playback.
    pub fn set_winner(&mut self, player_id: &str) -> Option<Player> {
        let player = self.players.get_mut(player_id)?;
        player.score += 1;
        let winner = player.clone();
        self.buzz_queue.clear();
        self.status = GameStatus::Stopped;
        Some(winner)
    }

    /// Manual score correction; `delta` may be negative and the score may go
    /// below zero. Status and queue are untouched.
    pub fn adjust_score(&mut self, player_id: &str, delta: i64) -> Option<Player> {
        let player = self.players.get_mut(player_id)?;
        player.score += delta;
        Some(player.clone())
    }

    /// Set playback status. Stopping always forgets who had buzzed.
    pub fn set_status(&mut self, status: GameStatus) {
        self.status = status;
        if status == GameStatus::Stopped {
            self.buzz_queue.clear();
        }
    }

    /// Advance to the next track in play order, wrapping to the first after
    /// the last. A current id missing from the order is treated as index -1,
    /// so the result is the first entry. Always stops and clears the queue.
    pub fn next_track(&mut self) {
        if self.track_order.is_empty() {
            return;
        }
        let idx = self
            .track_order
            .iter()
            .position(|id| Some(id) == self.current_track_id.as_ref())
            .map(|i| i as i64)
            .unwrap_or(-1);
        let next_idx = ((idx + 1) as usize) % self.track_order.len();
        self.current_track_id = Some(self.track_order[next_idx].clone());
        self.status = GameStatus::Stopped;
        self.buzz_queue.clear();
    }

    /// Select a specific track as current. Unknown ids are silently ignored
    /// so `current_track_id` never points at a nonexistent track.
    pub fn select_track(&mut self, track_id: &str) -> bool {
        if !self.tracks.iter().any(|t| t.id == track_id) {
            return false;
        }
        self.current_track_id = Some(track_id.to_string());
        self.status = GameStatus::Stopped;
        self.buzz_queue.clear();
        true
    }

    /// Replace the track list wholesale and rebuild the rotation.
    pub fn update_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.reset_rotation();
    }

    /// The track the room currently points at.
    pub fn current_track(&self) -> Option<&Track> {
        let current = self.current_track_id.as_ref()?;
        self.tracks.iter().find(|t| &t.id == current)
    }
}
