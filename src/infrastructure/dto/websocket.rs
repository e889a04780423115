//! WebSocket message DTOs for the buzzer protocol.
//!
//! Field casing follows the original wire contract: envelope tags and the
//! join fields are snake_case, entity references inside payloads are
//! camelCase (`playerId`, `trackId`, `currentTrackId`, `isReused`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{GameState, GameStatus, Player, Track};

/// Role a connection asks for at join time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Player,
    Moderator,
    Spectator,
}

/// Moderator playback control actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Play,
    Pause,
    Stop,
    Preview2,
    Preview5,
}

impl ControlAction {
    /// The status a control action drives the room into.
    pub fn status(self) -> GameStatus {
        match self {
            ControlAction::Play => GameStatus::Playing,
            ControlAction::Pause => GameStatus::Paused,
            ControlAction::Stop => GameStatus::Stopped,
            ControlAction::Preview2 => GameStatus::Preview2,
            ControlAction::Preview5 => GameStatus::Preview5,
        }
    }
}

/// Inbound client messages, discriminated by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join {
        #[serde(default)]
        name: String,
        #[serde(default)]
        role: Role,
        #[serde(default)]
        room_name: Option<String>,
        #[serde(default)]
        password: String,
    },
    Buzz {
        #[serde(rename = "playerId")]
        player_id: String,
    },
    Control {
        action: ControlAction,
    },
    SetWinner {
        #[serde(rename = "playerId")]
        player_id: String,
    },
    AdjustScore {
        #[serde(rename = "playerId")]
        player_id: String,
        #[serde(default)]
        points: i64,
    },
    NextTrack,
    SelectTrack {
        #[serde(rename = "trackId")]
        track_id: String,
    },
    RemovePlayer {
        #[serde(rename = "playerId")]
        player_id: String,
    },
}

/// Current-track digest attached to `point_awarded` events. The stored title
/// is split once on " - " into title and artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub title: String,
    pub artist: String,
}

impl TrackInfo {
    pub fn from_track(track: &Track) -> Self {
        match track.title.split_once(" - ") {
            Some((title, artist)) => Self {
                title: title.to_string(),
                artist: artist.to_string(),
            },
            None => Self {
                title: track.title.clone(),
                artist: track
                    .artist
                    .clone()
                    .unwrap_or_else(|| "Unknown artist".to_string()),
            },
        }
    }
}

/// Outbound events; serialized as `{"type": ..., "payload": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    State(GameState),
    JoinAck {
        #[serde(rename = "playerId")]
        player_id: Option<String>,
        #[serde(rename = "isReused", skip_serializing_if = "Option::is_none")]
        is_reused: Option<bool>,
    },
    JoinError {
        message: String,
    },
    Error {
        message: String,
    },
    PlayerJoin(Player),
    PlayerRejoin(Player),
    PlayerLeave {
        #[serde(rename = "playerId")]
        player_id: String,
    },
    PlayerBanned {
        #[serde(rename = "playerId")]
        player_id: String,
        #[serde(rename = "playerName")]
        player_name: String,
    },
    Buzzer {
        queue: Vec<String>,
    },
    Control {
        status: GameStatus,
    },
    TrackChanged {
        #[serde(rename = "currentTrackId")]
        current_track_id: Option<String>,
    },
    Scores {
        players: HashMap<String, Player>,
    },
    PointAwarded {
        #[serde(rename = "playerId")]
        player_id: String,
        #[serde(rename = "playerName")]
        player_name: String,
        points: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        track: Option<TrackInfo>,
    },
}
