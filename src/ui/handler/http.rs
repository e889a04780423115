//! HTTP handlers: room lifecycle and the administrator surface.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::domain::{MIN_PASSWORD_LEN, RoomName, ValueObjectError};
use crate::infrastructure::dto::http::{
    AdminAuthRequest, AdminPasswordRequest, BanPlayerRequest, CloseRoomRequest, CreateRoomRequest,
    JoinRoomRequest, LoadPlaylistRequest, RoomActionResponse, RoomExistsResponse,
};
use crate::infrastructure::dto::websocket::ServerEvent;
use crate::infrastructure::registry::RegistryError;
use crate::infrastructure::track_source::TrackSourceError;
use crate::ui::state::AppState;

/// API error taxonomy; rendered as `{"detail": "..."}` with the mapped
/// status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!("Internal error: {}", detail);
        }
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

impl From<ValueObjectError> for ApiError {
    fn from(e: ValueObjectError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::RoomExists => ApiError::Conflict(e.to_string()),
            RegistryError::Hash(_) => ApiError::Internal(e.to_string()),
        }
    }
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn create_room(
    State(state): State<AppState>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = RoomName::new(&req.room_name)?;
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValueObjectError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        }
        .into());
    }

    state.registry.create_room(&name, &req.password).await?;
    Ok(Json(RoomActionResponse {
        success: true,
        message: "Room created".to_string(),
        room_name: Some(name.key()),
    }))
}

pub async fn join_room(
    State(state): State<AppState>,
    Json(req): Json<JoinRoomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = RoomName::new(&req.room_name)?;
    state
        .registry
        .join_room(&name, &req.password)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Invalid room or password".to_string()))?;

    Ok(Json(RoomActionResponse {
        success: true,
        message: "Password accepted".to_string(),
        room_name: Some(name.key()),
    }))
}

pub async fn check_room(
    State(state): State<AppState>,
    Path(room_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let name = RoomName::new(&room_name)?;
    let exists = state.registry.room_exists(&name).await;
    Ok(Json(RoomExistsResponse {
        exists,
        room_name: name.key(),
    }))
}

fn require_admin(state: &AppState, password: &str) -> Result<(), ApiError> {
    if state.admin.verify(password) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized(
            "Invalid admin password".to_string(),
        ))
    }
}

pub async fn admin_auth(
    State(state): State<AppState>,
    Json(req): Json<AdminAuthRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &req.password)?;
    Ok(Json(json!({ "success": true })))
}

pub async fn admin_list_rooms(
    State(state): State<AppState>,
    Json(req): Json<AdminPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &req.admin_password)?;
    let rooms = state.registry.list_rooms().await;
    Ok(Json(json!({ "rooms": rooms })))
}

pub async fn admin_room_detail(
    State(state): State<AppState>,
    Path(room_name): Path<String>,
    Json(req): Json<AdminPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &req.admin_password)?;
    let name = RoomName::new(&room_name)?;
    let detail = state
        .registry
        .get_room_info(&name)
        .await
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;
    Ok(Json(detail))
}

pub async fn admin_close_room(
    State(state): State<AppState>,
    Json(req): Json<CloseRoomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &req.admin_password)?;
    let name = RoomName::new(&req.room_name)?;
    if !state.registry.close_room(&name).await {
        return Err(ApiError::NotFound("Room not found".to_string()));
    }
    state.connections.close_room(&name.key()).await;

    Ok(Json(RoomActionResponse {
        success: true,
        message: "Room closed".to_string(),
        room_name: Some(name.key()),
    }))
}

pub async fn admin_load_playlist(
    State(state): State<AppState>,
    Json(req): Json<LoadPlaylistRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &req.admin_password)?;
    let name = RoomName::new(&req.room_name)?;

    let snapshot = state
        .registry
        .load_playlist(&name, &req.playlist_url)
        .await
        .map_err(|e| match e {
            TrackSourceError::Unsupported(_) => ApiError::Validation(e.to_string()),
            TrackSourceError::Fetch(_) => ApiError::Internal(e.to_string()),
        })?
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;

    let room_key = name.key();
    state
        .connections
        .broadcast(&ServerEvent::State(snapshot), Some(&room_key))
        .await;

    Ok(Json(RoomActionResponse {
        success: true,
        message: "Playlist loaded".to_string(),
        room_name: Some(room_key),
    }))
}

pub async fn admin_ban_player(
    State(state): State<AppState>,
    Json(req): Json<BanPlayerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &req.admin_password)?;
    let name = RoomName::new(&req.room_name)?;
    let room = state
        .registry
        .get_room(&name)
        .await
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;

    let (banned, snapshot) = room
        .remove_player(&req.player_id)
        .await
        .ok_or_else(|| ApiError::NotFound("Player not found".to_string()))?;

    // Dropping the connection first keeps the banned session from seeing
    // its own departure broadcasts.
    let room_key = name.key();
    state.connections.kick_player(&room_key, &banned.id).await;
    state
        .connections
        .broadcast(
            &ServerEvent::PlayerBanned {
                player_id: banned.id.clone(),
                player_name: banned.name.clone(),
            },
            Some(&room_key),
        )
        .await;
    state
        .connections
        .broadcast(&ServerEvent::State(snapshot), Some(&room_key))
        .await;

    tracing::info!("Player '{}' banned from room '{}'", banned.name, room_key);
    Ok(Json(RoomActionResponse {
        success: true,
        message: format!("Player '{}' banned", banned.name),
        room_name: Some(room_key),
    }))
}
