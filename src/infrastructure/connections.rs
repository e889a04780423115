//! Connection registry: live transport connections and room-scoped fan-out.
//!
//! Every websocket gets an outbound `mpsc::UnboundedSender<String>` whose
//! receiver side is drained by that connection's forwarding task. Dropping
//! the sender (kick, room close, prune) ends the forwarding task, which
//! closes the transport. All maps live behind one mutex; the guard is never
//! held across an await point.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tokio::sync::{Mutex, mpsc::UnboundedSender};

use crate::infrastructure::dto::websocket::{Role, ServerEvent};

pub type ConnId = u64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The connection is no longer registered (already pruned).
    #[error("Connection is not registered")]
    UnknownConnection,

    /// Another live connection in the room already holds this player id.
    /// This is what resolves two simultaneous same-name joins to exactly
    /// one winner.
    #[error("Player is already connected in this room")]
    PlayerAlreadyActive,
}

/// What a closed connection was, for player-removal side effects.
#[derive(Debug, Clone)]
pub struct DisconnectInfo {
    pub player_id: Option<String>,
    pub room_name: Option<String>,
}

struct ConnectionRecord {
    sender: UnboundedSender<String>,
    player_id: Option<String>,
    role: Option<Role>,
    room_name: Option<String>,
}

#[derive(Default)]
struct Inner {
    next_id: ConnId,
    active: HashMap<ConnId, ConnectionRecord>,
    rooms: HashMap<String, Vec<ConnId>>,
}

impl Inner {
    fn remove(&mut self, conn: ConnId) -> Option<ConnectionRecord> {
        let record = self.active.remove(&conn)?;
        if let Some(room) = &record.room_name
            && let Some(bucket) = self.rooms.get_mut(room)
        {
            bucket.retain(|id| *id != conn);
            if bucket.is_empty() {
                self.rooms.remove(room);
            }
        }
        Some(record)
    }
}

/// Process-wide map of live connections, constructed once at startup.
pub struct ConnectionRegistry {
    inner: Mutex<Inner>,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Register a freshly accepted connection; identity is unresolved until
    /// a successful join.
    pub async fn connect(&self, sender: UnboundedSender<String>) -> ConnId {
        let mut inner = self.inner.lock().await;
        let conn = inner.next_id;
        inner.next_id += 1;
        inner.active.insert(
            conn,
            ConnectionRecord {
                sender,
                player_id: None,
                role: None,
                room_name: None,
            },
        );
        conn
    }

    /// Resolve a connection's identity after a successful join and index it
    /// under its room for fan-out. Called exactly once per connection.
    ///
    /// A claimed player id that is already active on another connection in
    /// the same room is rejected atomically.
    pub async fn set_identity(
        &self,
        conn: ConnId,
        player_id: Option<String>,
        role: Role,
        room_key: &str,
    ) -> Result<(), IdentityError> {
        let mut inner = self.inner.lock().await;
        if !inner.active.contains_key(&conn) {
            return Err(IdentityError::UnknownConnection);
        }

        if let Some(claimed) = &player_id {
            let taken = inner
                .rooms
                .get(room_key)
                .into_iter()
                .flatten()
                .filter(|id| **id != conn)
                .any(|id| {
                    inner
                        .active
                        .get(id)
                        .and_then(|r| r.player_id.as_ref())
                        .is_some_and(|pid| pid == claimed)
                });
            if taken {
                return Err(IdentityError::PlayerAlreadyActive);
            }
        }

        let record = inner
            .active
            .get_mut(&conn)
            .ok_or(IdentityError::UnknownConnection)?;
        record.player_id = player_id;
        record.role = Some(role);
        record.room_name = Some(room_key.to_string());

        let bucket = inner.rooms.entry(room_key.to_string()).or_default();
        if !bucket.contains(&conn) {
            bucket.push(conn);
        }
        Ok(())
    }

    /// Drop a connection; returns what it was so the caller can perform
    /// player-removal side effects. The room's fan-out bucket disappears
    /// with its last connection.
    pub async fn disconnect(&self, conn: ConnId) -> Option<DisconnectInfo> {
        let mut inner = self.inner.lock().await;
        let record = inner.remove(conn)?;
        Some(DisconnectInfo {
            player_id: record.player_id,
            room_name: record.room_name,
        })
    }

    /// Player ids with at least one live connection in the room. This is
    /// the set the join collision guard consults: "active" means "has an
    /// open connection", not "is on the roster".
    pub async fn active_player_ids(&self, room_key: &str) -> HashSet<String> {
        let inner = self.inner.lock().await;
        inner
            .rooms
            .get(room_key)
            .into_iter()
            .flatten()
            .filter_map(|conn| inner.active.get(conn))
            .filter_map(|record| record.player_id.clone())
            .collect()
    }

    /// Send one serialized event to a single connection. The registry holds
    /// the only sender for a connection, so a kicked or closed session is
    /// unreachable here; returns false in that case.
    pub async fn send_to(&self, conn: ConnId, json: String) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.active.get(&conn) {
            Some(record) => {
                if record.sender.send(json).is_err() {
                    inner.remove(conn);
                    return false;
                }
                true
            }
            None => false,
        }
    }

    /// Fan an event out to every connection in the room (or process-wide
    /// when no room is given). A connection that fails to receive is treated
    /// as already disconnected and pruned; delivery to the remaining targets
    /// is never interrupted.
    pub async fn broadcast(&self, event: &ServerEvent, room_key: Option<&str>) {
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize broadcast event: {}", e);
                return;
            }
        };

        let mut inner = self.inner.lock().await;
        let targets: Vec<ConnId> = match room_key {
            Some(room) => inner.rooms.get(room).cloned().unwrap_or_default(),
            None => inner.active.keys().copied().collect(),
        };

        let mut dead = Vec::new();
        for conn in targets {
            if let Some(record) = inner.active.get(&conn)
                && record.sender.send(json.clone()).is_err()
            {
                dead.push(conn);
            }
        }
        for conn in dead {
            tracing::debug!("Pruning dead connection {} during broadcast", conn);
            inner.remove(conn);
        }
    }

    /// Drop every connection bound to the given player in the room. The
    /// forwarding task sees its channel close and shuts the transport.
    pub async fn kick_player(&self, room_key: &str, player_id: &str) -> bool {
        let mut inner = self.inner.lock().await;
        let matches: Vec<ConnId> = inner
            .rooms
            .get(room_key)
            .into_iter()
            .flatten()
            .filter(|conn| {
                inner
                    .active
                    .get(conn)
                    .and_then(|r| r.player_id.as_deref())
                    .is_some_and(|pid| pid == player_id)
            })
            .copied()
            .collect();
        for conn in &matches {
            inner.remove(*conn);
        }
        !matches.is_empty()
    }

    /// Drop every connection of a room (used when the room is closed).
    pub async fn close_room(&self, room_key: &str) {
        let mut inner = self.inner.lock().await;
        let conns = inner.rooms.remove(room_key).unwrap_or_default();
        for conn in conns {
            inner.active.remove(&conn);
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.lock().await.active.len()
    }
}
