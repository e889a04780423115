//! Join flow: authenticate into a room, resolve the player identity and
//! bind the connection to the room for fan-out.

use std::sync::Arc;

use crate::domain::{Player, PlayerName, RoomName};
use crate::infrastructure::connections::{ConnId, ConnectionRegistry, IdentityError};
use crate::infrastructure::dto::websocket::Role;
use crate::infrastructure::registry::RoomRegistry;
use crate::infrastructure::room::GameRoom;
use crate::usecase::error::JoinError;

/// What the protocol handler needs after a successful join.
pub struct JoinOutcome {
    pub room: Arc<GameRoom>,
    pub room_key: String,
    /// `Some((player, reused))` for the player role, `None` for moderators
    /// and spectators.
    pub player: Option<(Player, bool)>,
}

pub struct JoinRoomUseCase {
    registry: Arc<RoomRegistry>,
    connections: Arc<ConnectionRegistry>,
}

impl JoinRoomUseCase {
    pub fn new(registry: Arc<RoomRegistry>, connections: Arc<ConnectionRegistry>) -> Self {
        Self {
            registry,
            connections,
        }
    }

    pub async fn execute(
        &self,
        conn: ConnId,
        name: &str,
        role: Role,
        room_name: Option<&str>,
        password: &str,
    ) -> Result<JoinOutcome, JoinError> {
        let room_name = RoomName::new(room_name.ok_or(JoinError::RoomNameRequired)?)?;
        let room = self
            .registry
            .join_room(&room_name, password)
            .await
            .ok_or(JoinError::Unauthorized)?;
        let room_key = room_name.key();

        if role != Role::Player {
            self.bind(conn, None, role, &room_key).await?;
            return Ok(JoinOutcome {
                room,
                room_key,
                player: None,
            });
        }

        let player_name = PlayerName::new(name)?;
        let active = self.connections.active_player_ids(&room_key).await;
        let (player, reused) = room
            .add_or_reconnect_player(&player_name, &active)
            .await
            .ok_or(JoinError::NameInUse)?;
        self.bind(conn, Some(player.id.clone()), role, &room_key)
            .await?;

        tracing::info!(
            "Player '{}' joined room '{}' (reused: {})",
            player.name,
            room_key,
            reused
        );
        Ok(JoinOutcome {
            room,
            room_key,
            player: Some((player, reused)),
        })
    }

    async fn bind(
        &self,
        conn: ConnId,
        player_id: Option<String>,
        role: Role,
        room_key: &str,
    ) -> Result<(), JoinError> {
        self.connections
            .set_identity(conn, player_id, role, room_key)
            .await
            .map_err(|e| match e {
                // Two sessions raced for the same name; the identity claim
                // is the single arbiter.
                IdentityError::PlayerAlreadyActive => JoinError::NameInUse,
                IdentityError::UnknownConnection => JoinError::ConnectionClosed,
            })
    }
}
