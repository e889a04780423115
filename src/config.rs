use std::path::PathBuf;

use clap::Parser;

/// Server configuration, from command line arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "music-buzzer-server", version, about = "Multi-room music buzzer game server")]
pub struct Config {
    /// Port to listen on.
    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    /// Path of the persistent score file.
    #[arg(long, default_value = "scores.json")]
    pub scores_file: PathBuf,

    /// Administrator password (dev fallback when no hash is configured).
    #[arg(long, default_value = "admin123")]
    pub admin_password: String,

    /// bcrypt hash of the administrator password; takes precedence over
    /// the plain password when set.
    #[arg(long)]
    pub admin_password_hash: Option<String>,
}
