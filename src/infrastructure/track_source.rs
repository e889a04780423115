//! Track source seam.
//!
//! Playlist ingestion (Spotify/YouTube importers, OAuth, transcoding) lives
//! outside this engine. The core consumes it through one narrow contract:
//! resolve a playlist locator into a track list, which is then fed to
//! `GameRoom::update_tracks` wholesale.

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::domain::Track;

#[derive(Debug, Error)]
pub enum TrackSourceError {
    #[error("playlist source not supported: {0}")]
    Unsupported(String),

    #[error("playlist fetch failed: {0}")]
    Fetch(String),
}

/// External collaborator contract for track lists.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// Track set a freshly created room is seeded with.
    fn default_tracks(&self) -> Vec<Track>;

    /// Resolve a playlist locator into a track list. The engine treats the
    /// result as opaque and only replaces a room's track list with it.
    async fn fetch(&self, playlist_url: &str) -> Result<Vec<Track>, TrackSourceError>;
}

/// Built-in source: a fixed demo track set, no external lookups.
pub struct BuiltinTracks;

#[async_trait]
impl TrackSource for BuiltinTracks {
    fn default_tracks(&self) -> Vec<Track> {
        ["t1", "t2", "t3"]
            .iter()
            .enumerate()
            .map(|(i, id)| Track {
                id: id.to_string(),
                title: format!("Track {}", i + 1),
                url: format!(
                    "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-{}.mp3",
                    i + 1
                ),
                artist: None,
                image_url: None,
            })
            .collect()
    }

    async fn fetch(&self, playlist_url: &str) -> Result<Vec<Track>, TrackSourceError> {
        Err(TrackSourceError::Unsupported(playlist_url.to_string()))
    }
}
