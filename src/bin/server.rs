use std::process::exit;
use std::sync::Arc;

use clap::Parser;

use music_buzzer::config::Config;
use music_buzzer::infrastructure::{BuiltinTracks, ConnectionRegistry, RoomRegistry, ScoreLedger};
use music_buzzer::ui::state::{AdminAuth, AppState};
use music_buzzer::{logger, ui};

#[tokio::main]
async fn main() {
    logger::setup_logger("music_buzzer=info,tower_http=info");
    let config = Config::parse();

    let ledger = Arc::new(ScoreLedger::new(config.scores_file.clone()));
    let state = AppState {
        registry: Arc::new(RoomRegistry::new(ledger, Arc::new(BuiltinTracks))),
        connections: Arc::new(ConnectionRegistry::new()),
        admin: AdminAuth::new(
            config.admin_password_hash.clone(),
            config.admin_password.clone(),
        ),
    };

    if let Err(e) = ui::run(&config, state).await {
        tracing::error!("Server error: {}", e);
        exit(1);
    }
}
