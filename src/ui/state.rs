use std::sync::Arc;

use crate::infrastructure::connections::ConnectionRegistry;
use crate::infrastructure::registry::RoomRegistry;

/// Administrator passphrase check for the `/api/admin` surface. A bcrypt
/// hash takes precedence when configured; the plain password is the dev
/// fallback.
#[derive(Clone)]
pub struct AdminAuth {
    password_hash: Option<String>,
    password_plain: String,
}

impl AdminAuth {
    pub fn new(password_hash: Option<String>, password_plain: String) -> Self {
        Self {
            password_hash,
            password_plain,
        }
    }

    pub fn verify(&self, password: &str) -> bool {
        match &self.password_hash {
            Some(hash) => bcrypt::verify(password, hash).unwrap_or(false),
            None => password == self.password_plain,
        }
    }
}

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
    pub connections: Arc<ConnectionRegistry>,
    pub admin: AdminAuth,
}
