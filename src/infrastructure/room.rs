//! `GameRoom`: a domain `Room` behind its serialized-access boundary.
//!
//! Every mutating operation locks the room's single `tokio::sync::Mutex`,
//! reads and writes the state as one atomic step, and mirrors score-bearing
//! changes into the `ScoreLedger` before the lock is released. Callers
//! receive a copied delta (or snapshot) so broadcasts happen after the
//! boundary is released; no operation can observe a partially-updated room.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{GameState, GameStatus, Player, PlayerName, Room, Track};
use crate::infrastructure::ledger::ScoreLedger;

/// Queue and status right after an accepted buzz.
#[derive(Debug, Clone)]
pub struct BuzzAccepted {
    pub queue: Vec<String>,
    pub status: GameStatus,
}

/// Current track and status after a rotation change.
#[derive(Debug, Clone)]
pub struct TrackAdvance {
    pub current_track_id: Option<String>,
    pub status: GameStatus,
}

/// Result of a manual score adjustment.
#[derive(Debug, Clone)]
pub struct ScoreUpdate {
    pub player: Player,
    pub players: HashMap<String, Player>,
    pub current_track: Option<Track>,
}

/// Result of awarding the current round.
#[derive(Debug, Clone)]
pub struct Award {
    pub player: Player,
    pub players: HashMap<String, Player>,
    pub queue: Vec<String>,
    pub status: GameStatus,
    pub current_track: Option<Track>,
}

/// One room's authoritative state plus its exclusion boundary.
pub struct GameRoom {
    state: Mutex<Room>,
    ledger: Arc<ScoreLedger>,
}

impl GameRoom {
    pub fn new(tracks: Vec<Track>, ledger: Arc<ScoreLedger>) -> Self {
        Self {
            state: Mutex::new(Room::new(tracks)),
            ledger,
        }
    }

    /// Full state snapshot for `state` broadcasts.
    pub async fn snapshot(&self) -> GameState {
        self.state.lock().await.snapshot()
    }

    /// Join a player by display name.
    ///
    /// Returns `None` when the name is already held by a currently connected
    /// player (`active_ids` is the set of player ids with a live connection
    /// in this room). Otherwise reuses the roster entry, falls back to the
    /// ledger's historical record, or mints a fresh player, in that order.
    /// Every successful path flushes the roster to the ledger before
    /// returning, so the persisted score never lags a committed join.
    ///
    /// The second tuple element is true when an existing identity was reused.
    pub async fn add_or_reconnect_player(
        &self,
        name: &PlayerName,
        active_ids: &HashSet<String>,
    ) -> Option<(Player, bool)> {
        let mut state = self.state.lock().await;
        let name_key = name.key();

        if let Some(existing) = state.find_player_by_name(&name_key) {
            if active_ids.contains(&existing.id) {
                // Two live sessions must never share a display name.
                return None;
            }
            let player = existing.clone();
            self.ledger.save(&state.players);
            return Some((player, true));
        }

        if let Some(record) = self.ledger.find_by_name(&name_key) {
            // Reconnection across a restart: restore historical id and score.
            let player = Player {
                id: record.id,
                name: name.as_str().to_string(),
                score: record.score,
            };
            state.insert_player(player.clone());
            self.ledger.save(&state.players);
            return Some((player, true));
        }

        let player = Player {
            id: Uuid::new_v4().to_string(),
            name: name.as_str().to_string(),
            score: 0,
        };
        state.insert_player(player.clone());
        self.ledger.save(&state.players);
        Some((player, false))
    }

    /// Remove a player from the roster and buzz queue. Scores are flushed
    /// before removal so an interruption mid-operation loses nothing.
    /// Returns the removed player and the snapshot to resync clients with.
    pub async fn remove_player(&self, player_id: &str) -> Option<(Player, GameState)> {
        let mut state = self.state.lock().await;
        if state.players.contains_key(player_id) {
            self.ledger.save(&state.players);
        }
        let removed = state.remove_player(player_id)?;
        Some((removed, state.snapshot()))
    }

    /// Record a buzz; `None` means rejected (unknown player or duplicate).
    pub async fn record_buzz(&self, player_id: &str) -> Option<BuzzAccepted> {
        let mut state = self.state.lock().await;
        if !state.record_buzz(player_id) {
            return None;
        }
        Some(BuzzAccepted {
            queue: state.buzz_queue.clone(),
            status: state.status,
        })
    }

    /// Award one point to the given player, clear the queue and stop.
    pub async fn set_winner(&self, player_id: &str) -> Option<Award> {
        let mut state = self.state.lock().await;
        let player = state.set_winner(player_id)?;
        self.ledger.save(&state.players);
        Some(Award {
            player,
            players: state.players.clone(),
            queue: state.buzz_queue.clone(),
            status: state.status,
            current_track: state.current_track().cloned(),
        })
    }

    /// Moderator's manual correction path; independent of the winner flow.
    pub async fn adjust_score(&self, player_id: &str, delta: i64) -> Option<ScoreUpdate> {
        let mut state = self.state.lock().await;
        let player = state.adjust_score(player_id, delta)?;
        self.ledger.save(&state.players);
        Some(ScoreUpdate {
            player,
            players: state.players.clone(),
            current_track: state.current_track().cloned(),
        })
    }

    /// Set playback status; returns the resulting status for broadcast.
    pub async fn set_status(&self, status: GameStatus) -> GameStatus {
        let mut state = self.state.lock().await;
        state.set_status(status);
        state.status
    }

    /// Advance the rotation by one (circular).
    pub async fn next_track(&self) -> TrackAdvance {
        let mut state = self.state.lock().await;
        state.next_track();
        TrackAdvance {
            current_track_id: state.current_track_id.clone(),
            status: state.status,
        }
    }

    /// Select a specific track; `None` when the id is unknown (silent no-op).
    pub async fn select_track(&self, track_id: &str) -> Option<TrackAdvance> {
        let mut state = self.state.lock().await;
        if !state.select_track(track_id) {
            return None;
        }
        Some(TrackAdvance {
            current_track_id: state.current_track_id.clone(),
            status: state.status,
        })
    }

    /// Replace the track list wholesale; returns the snapshot to broadcast.
    pub async fn update_tracks(&self, tracks: Vec<Track>) -> GameState {
        let mut state = self.state.lock().await;
        state.update_tracks(tracks);
        state.snapshot()
    }

    /// Player count for operator tooling.
    pub async fn player_count(&self) -> usize {
        self.state.lock().await.players.len()
    }
}
