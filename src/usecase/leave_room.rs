//! Disconnect flow: unregister the connection and, when it carried a player
//! identity, remove that player from the room roster.

use std::sync::Arc;

use crate::domain::{GameState, Player, RoomName};
use crate::infrastructure::connections::{ConnId, ConnectionRegistry};
use crate::infrastructure::registry::RoomRegistry;

/// What the protocol handler broadcasts after a departure.
pub struct LeaveOutcome {
    pub room_key: String,
    /// `Some` when a roster entry was actually removed; spectators and
    /// moderators leave no trace.
    pub removed: Option<(Player, GameState)>,
}

pub struct LeaveRoomUseCase {
    registry: Arc<RoomRegistry>,
    connections: Arc<ConnectionRegistry>,
}

impl LeaveRoomUseCase {
    pub fn new(registry: Arc<RoomRegistry>, connections: Arc<ConnectionRegistry>) -> Self {
        Self {
            registry,
            connections,
        }
    }

    /// Idempotent: a connection already gone (kicked, room closed) yields
    /// `None` and no side effects, so the disconnect path never duplicates
    /// a departure broadcast.
    pub async fn execute(&self, conn: ConnId) -> Option<LeaveOutcome> {
        let info = self.connections.disconnect(conn).await?;
        let room_key = info.room_name?;

        let removed = match info.player_id {
            Some(player_id) => {
                let room_name = RoomName::new(&room_key).ok()?;
                let room = self.registry.get_room(&room_name).await?;
                let removed = room.remove_player(&player_id).await;
                if removed.is_some() {
                    tracing::info!("Player '{}' left room '{}'", player_id, room_key);
                }
                removed
            }
            None => None,
        };

        Some(LeaveOutcome { room_key, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::dto::websocket::Role;
    use crate::infrastructure::ledger::ScoreLedger;
    use crate::infrastructure::track_source::BuiltinTracks;
    use crate::usecase::join_room::JoinRoomUseCase;
    use tempfile::tempdir;
    use tokio::sync::mpsc;

    struct Fixture {
        join: JoinRoomUseCase,
        leave: LeaveRoomUseCase,
        registry: Arc<RoomRegistry>,
        connections: Arc<ConnectionRegistry>,
        _dir: tempfile::TempDir,
    }

    async fn fixture_with_room() -> Fixture {
        let dir = tempdir().unwrap();
        let ledger = Arc::new(ScoreLedger::new(dir.path().join("scores.json")));
        let registry = Arc::new(RoomRegistry::new(ledger, Arc::new(BuiltinTracks)));
        registry
            .create_room(&RoomName::new("quiz").unwrap(), "abcd")
            .await
            .unwrap();
        let connections = Arc::new(ConnectionRegistry::new());
        Fixture {
            join: JoinRoomUseCase::new(registry.clone(), connections.clone()),
            leave: LeaveRoomUseCase::new(registry.clone(), connections.clone()),
            registry,
            connections,
            _dir: dir,
        }
    }

    async fn connect(connections: &ConnectionRegistry) -> (ConnId, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (connections.connect(tx).await, rx)
    }

    #[tokio::test]
    async fn test_player_departure_removes_roster_entry() {
        // given: Ana joined as a player
        let f = fixture_with_room().await;
        let (conn, _rx) = connect(&f.connections).await;
        f.join
            .execute(conn, "Ana", Role::Player, Some("quiz"), "abcd")
            .await
            .unwrap();

        // when:
        let outcome = f.leave.execute(conn).await.unwrap();

        // then: roster entry gone, snapshot reflects the removal
        assert_eq!(outcome.room_key, "quiz");
        let (player, snapshot) = outcome.removed.unwrap();
        assert_eq!(player.name, "Ana");
        assert!(snapshot.players.is_empty());

        let room = f
            .registry
            .get_room(&RoomName::new("quiz").unwrap())
            .await
            .unwrap();
        assert_eq!(room.player_count().await, 0);
    }

    #[tokio::test]
    async fn test_spectator_departure_removes_nothing() {
        let f = fixture_with_room().await;
        let (conn, _rx) = connect(&f.connections).await;
        f.join
            .execute(conn, "", Role::Spectator, Some("quiz"), "abcd")
            .await
            .unwrap();

        let outcome = f.leave.execute(conn).await.unwrap();

        assert!(outcome.removed.is_none());
    }

    #[tokio::test]
    async fn test_disconnect_before_join_yields_nothing() {
        let f = fixture_with_room().await;
        let (conn, _rx) = connect(&f.connections).await;

        assert!(f.leave.execute(conn).await.is_none());
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        // given: a kicked connection (already unregistered)
        let f = fixture_with_room().await;
        let (conn, _rx) = connect(&f.connections).await;
        let outcome = f
            .join
            .execute(conn, "Ana", Role::Player, Some("quiz"), "abcd")
            .await
            .unwrap();
        let player_id = outcome.player.unwrap().0.id;
        f.connections.kick_player("quiz", &player_id).await;

        // when: the socket task runs its disconnect cleanup afterwards
        let result = f.leave.execute(conn).await;

        // then: no second departure is produced
        assert!(result.is_none());
    }
}
