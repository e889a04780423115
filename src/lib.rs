//! Real-time multi-room music buzzer game server.
//!
//! Players join passphrase-protected rooms over WebSocket, buzz in while a
//! track plays, and moderators award points. Scores are mirrored to a JSON
//! ledger so identities and totals survive disconnects and restarts.
//!
//! Layering:
//! - `domain`: pure game rules (`Room`, value objects), no IO.
//! - `infrastructure`: score ledger, room/connection registries, wire DTOs.
//! - `usecase`: join and departure flows.
//! - `ui`: axum router, HTTP and WebSocket handlers.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logger;
pub mod ui;
pub mod usecase;
