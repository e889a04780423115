//! HTTP API request/response DTOs for the administrative surface.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomRequest {
    pub room_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinRoomRequest {
    pub room_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminAuthRequest {
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminPasswordRequest {
    pub admin_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloseRoomRequest {
    pub room_name: String,
    pub admin_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BanPlayerRequest {
    pub room_name: String,
    pub player_id: String,
    pub admin_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadPlaylistRequest {
    pub room_name: String,
    pub playlist_url: String,
    pub admin_password: String,
}

/// Generic success envelope for room lifecycle endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct RoomActionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomExistsResponse {
    pub exists: bool,
    pub room_name: String,
}
