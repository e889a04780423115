use std::net::SocketAddr;
use std::sync::Arc;

use tempfile::TempDir;

use music_buzzer::infrastructure::{BuiltinTracks, ConnectionRegistry, RoomRegistry, ScoreLedger};
use music_buzzer::ui;
use music_buzzer::ui::state::{AdminAuth, AppState};

pub const ADMIN_PASSWORD: &str = "admin123";

/// A full server on an ephemeral port with its own ledger file.
pub struct TestServer {
    pub addr: SocketAddr,
    _dir: TempDir,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Arc::new(ScoreLedger::new(dir.path().join("scores.json")));
        let state = AppState {
            registry: Arc::new(RoomRegistry::new(ledger, Arc::new(BuiltinTracks))),
            connections: Arc::new(ConnectionRegistry::new()),
            admin: AdminAuth::new(None, ADMIN_PASSWORD.to_string()),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = ui::app_router(state);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, _dir: dir }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Create a room through the public API.
    pub async fn create_room(&self, room_name: &str, password: &str) {
        let response = reqwest::Client::new()
            .post(self.url("/api/rooms/create"))
            .json(&serde_json::json!({"room_name": room_name, "password": password}))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }
}
