//! WebSocket session handler.
//!
//! Each accepted socket is split into a forwarding task (drains the
//! connection's mpsc channel into the sink) and a receive task (parses and
//! dispatches client messages). When either side ends the other is aborted,
//! then the departure cleanup runs once. Room mutations happen inside the
//! room's own boundary; every broadcast below is emitted after that
//! boundary is released.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::infrastructure::connections::ConnId;
use crate::infrastructure::dto::websocket::{ClientMessage, Role, ServerEvent, TrackInfo};
use crate::infrastructure::room::GameRoom;
use crate::ui::state::AppState;
use crate::usecase::{JoinRoomUseCase, LeaveRoomUseCase};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let conn = state.connections.connect(tx).await;
    let (mut sink, mut stream) = socket.split();

    // Forward the outbound channel into the socket. A closed channel means
    // the connection was pruned, kicked or its room closed.
    let mut send_task = tokio::spawn(async move {
        while let Some(json) = rx.recv().await {
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut session = Session::new(conn, state.clone());
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = stream.next().await {
            match msg {
                Message::Text(text) => session.handle(&text).await,
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    let leave = LeaveRoomUseCase::new(state.registry.clone(), state.connections.clone());
    if let Some(outcome) = leave.execute(conn).await
        && let Some((player, snapshot)) = outcome.removed
    {
        state
            .connections
            .broadcast(
                &ServerEvent::PlayerLeave {
                    player_id: player.id,
                },
                Some(&outcome.room_key),
            )
            .await;
        state
            .connections
            .broadcast(&ServerEvent::State(snapshot), Some(&outcome.room_key))
            .await;
    }
}

/// Per-connection protocol state. `room` is set by the first successful
/// join and never changes afterwards.
struct Session {
    conn: ConnId,
    state: AppState,
    room: Option<(Arc<GameRoom>, String)>,
}

impl Session {
    fn new(conn: ConnId, state: AppState) -> Self {
        Self {
            conn,
            state,
            room: None,
        }
    }

    /// Direct reply to this connection only. The connection registry holds
    /// the sole sender, so a session kicked mid-message simply stops being
    /// reachable; the receive loop ends when the transport closes.
    async fn reply(&self, event: &ServerEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            self.state.connections.send_to(self.conn, json).await;
        }
    }

    async fn broadcast(&self, event: &ServerEvent, room_key: &str) {
        self.state.connections.broadcast(event, Some(room_key)).await;
    }

    async fn handle(&mut self, text: &str) {
        let msg: ClientMessage = match serde_json::from_str(text) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!("Unparseable client message: {}", e);
                self.reply(&ServerEvent::Error {
                    message: "Invalid message".to_string(),
                })
                .await;
                return;
            }
        };

        match msg {
            ClientMessage::Join {
                name,
                role,
                room_name,
                password,
            } => {
                self.on_join(&name, role, room_name.as_deref(), &password)
                    .await;
            }
            other => {
                let Some((room, room_key)) = self.room.clone() else {
                    self.reply(&ServerEvent::Error {
                        message: "You must join a room first".to_string(),
                    })
                    .await;
                    return;
                };
                self.dispatch(other, room, &room_key).await;
            }
        }
    }

    /// Gameplay messages, valid only after a join.
    async fn dispatch(&self, msg: ClientMessage, room: Arc<GameRoom>, room_key: &str) {
        match msg {
            ClientMessage::Join { .. } => {}
            ClientMessage::Buzz { player_id } => {
                if let Some(accepted) = room.record_buzz(&player_id).await {
                    self.broadcast(
                        &ServerEvent::Buzzer {
                            queue: accepted.queue,
                        },
                        room_key,
                    )
                    .await;
                    self.broadcast(
                        &ServerEvent::Control {
                            status: accepted.status,
                        },
                        room_key,
                    )
                    .await;
                }
            }
            ClientMessage::Control { action } => {
                let status = room.set_status(action.status()).await;
                self.broadcast(&ServerEvent::Control { status }, room_key)
                    .await;
            }
            ClientMessage::SetWinner { player_id } => {
                if let Some(award) = room.set_winner(&player_id).await {
                    self.broadcast(
                        &ServerEvent::Scores {
                            players: award.players,
                        },
                        room_key,
                    )
                    .await;
                    self.broadcast(&ServerEvent::Buzzer { queue: award.queue }, room_key)
                        .await;
                    self.broadcast(
                        &ServerEvent::Control {
                            status: award.status,
                        },
                        room_key,
                    )
                    .await;
                    self.broadcast(
                        &ServerEvent::PointAwarded {
                            player_id: award.player.id,
                            player_name: award.player.name,
                            points: 1,
                            track: award.current_track.as_ref().map(TrackInfo::from_track),
                        },
                        room_key,
                    )
                    .await;
                }
            }
            ClientMessage::AdjustScore { player_id, points } => {
                if let Some(update) = room.adjust_score(&player_id, points).await {
                    self.broadcast(
                        &ServerEvent::Scores {
                            players: update.players,
                        },
                        room_key,
                    )
                    .await;
                    self.broadcast(
                        &ServerEvent::PointAwarded {
                            player_id: update.player.id,
                            player_name: update.player.name,
                            points,
                            track: update.current_track.as_ref().map(TrackInfo::from_track),
                        },
                        room_key,
                    )
                    .await;
                }
            }
            ClientMessage::NextTrack => {
                let advance = room.next_track().await;
                self.broadcast(
                    &ServerEvent::TrackChanged {
                        current_track_id: advance.current_track_id,
                    },
                    room_key,
                )
                .await;
                self.broadcast(
                    &ServerEvent::Control {
                        status: advance.status,
                    },
                    room_key,
                )
                .await;
            }
            ClientMessage::SelectTrack { track_id } => {
                // unknown track ids are dropped without a broadcast
                if let Some(advance) = room.select_track(&track_id).await {
                    self.broadcast(
                        &ServerEvent::TrackChanged {
                            current_track_id: advance.current_track_id,
                        },
                        room_key,
                    )
                    .await;
                    self.broadcast(
                        &ServerEvent::Control {
                            status: advance.status,
                        },
                        room_key,
                    )
                    .await;
                }
            }
            ClientMessage::RemovePlayer { player_id } => {
                if let Some((removed, snapshot)) = room.remove_player(&player_id).await {
                    self.broadcast(
                        &ServerEvent::PlayerLeave {
                            player_id: removed.id,
                        },
                        room_key,
                    )
                    .await;
                    self.broadcast(&ServerEvent::State(snapshot), room_key).await;
                }
            }
        }
    }

    async fn on_join(&mut self, name: &str, role: Role, room_name: Option<&str>, password: &str) {
        if self.room.is_some() {
            self.reply(&ServerEvent::Error {
                message: "Already joined a room".to_string(),
            })
            .await;
            return;
        }

        let usecase = JoinRoomUseCase::new(
            self.state.registry.clone(),
            self.state.connections.clone(),
        );
        let outcome = match usecase
            .execute(self.conn, name, role, room_name, password)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                self.reply(&ServerEvent::JoinError {
                    message: e.to_string(),
                })
                .await;
                return;
            }
        };

        // announce first, then ack, then resync; the joiner sees their own
        // announcement through the room broadcast
        match &outcome.player {
            Some((player, reused)) => {
                let announce = if *reused {
                    ServerEvent::PlayerRejoin(player.clone())
                } else {
                    ServerEvent::PlayerJoin(player.clone())
                };
                self.broadcast(&announce, &outcome.room_key).await;
                self.reply(&ServerEvent::JoinAck {
                    player_id: Some(player.id.clone()),
                    is_reused: Some(*reused),
                })
                .await;
            }
            None => {
                self.reply(&ServerEvent::JoinAck {
                    player_id: None,
                    is_reused: None,
                })
                .await;
            }
        }
        self.reply(&ServerEvent::State(outcome.room.snapshot().await))
            .await;
        self.room = Some((outcome.room, outcome.room_key));
    }
}
