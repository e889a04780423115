//! UI layer: axum router, shared state and the HTTP/WebSocket handlers.

pub mod handler;
pub mod state;

use std::net::SocketAddr;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use state::AppState;

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handler::http::health))
        .route("/api/rooms/create", post(handler::http::create_room))
        .route("/api/rooms/join", post(handler::http::join_room))
        .route("/api/rooms/check/{room_name}", get(handler::http::check_room))
        .route("/api/admin/auth", post(handler::http::admin_auth))
        .route("/api/admin/rooms", post(handler::http::admin_list_rooms))
        .route(
            "/api/admin/rooms/close",
            post(handler::http::admin_close_room),
        )
        .route(
            "/api/admin/rooms/{room_name}",
            post(handler::http::admin_room_detail),
        )
        .route(
            "/api/admin/players/ban",
            post(handler::http::admin_ban_player),
        )
        .route(
            "/api/admin/tracks/load",
            post(handler::http::admin_load_playlist),
        )
        .route("/ws", get(handler::websocket::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: &Config, state: AppState) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app_router(state)).await
}
