//! Score ledger: durable, name-keyed score persistence.
//!
//! A small JSON file mirrors every room's roster so a player who reconnects
//! (even across a process restart) gets their id and score back. Entries are
//! merged by canonical player name, never keyed by connection, and data older
//! than the freshness window is discarded on load.
//!
//! Ledger I/O is best-effort: read or write failures are logged and degrade
//! to "no history" / "no flush". No error here is ever fatal.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

use crate::domain::{Player, value_object::PlayerName};

/// How long persisted scores stay valid.
fn freshness_window() -> Duration {
    Duration::days(1)
}

/// One persisted score entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub id: String,
    pub name: String,
    pub score: i64,
}

/// On-disk layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(default)]
    players: HashMap<String, LedgerRecord>,
}

#[derive(Debug, Error)]
enum LedgerError {
    #[error("failed to read ledger file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse ledger file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// File-backed score ledger.
///
/// The internal mutex makes `save`'s read-merge-write cycle atomic with
/// respect to concurrent flushes from different rooms. The guard is never
/// held across an await point.
pub struct ScoreLedger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ScoreLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all persisted records, keyed by player id. Missing, corrupt or
    /// stale data yields an empty map.
    pub fn load(&self) -> HashMap<String, LedgerRecord> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.read_fresh()
    }

    /// Look up a historical record by canonical name key.
    pub fn find_by_name(&self, name_key: &str) -> Option<LedgerRecord> {
        self.load()
            .into_values()
            .find(|record| PlayerName::key_of(&record.name) == name_key)
    }

    /// Flush a roster, merging by name: a record whose name matches an
    /// existing entry updates that entry in place (preserving its historical
    /// id), unrelated names are never touched.
    pub fn save(&self, players: &HashMap<String, Player>) {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut existing = self.read_fresh();

        for player in players.values() {
            let name_key = PlayerName::key_of(&player.name);
            let matched = existing
                .values_mut()
                .find(|record| PlayerName::key_of(&record.name) == name_key);
            match matched {
                Some(record) => {
                    record.name = player.name.clone();
                    record.score = player.score;
                }
                None => {
                    existing.insert(
                        player.id.clone(),
                        LedgerRecord {
                            id: player.id.clone(),
                            name: player.name.clone(),
                            score: player.score,
                        },
                    );
                }
            }
        }

        let file = LedgerFile {
            timestamp: Some(Utc::now().to_rfc3339()),
            players: existing,
        };
        match serde_json::to_string_pretty(&file) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    tracing::error!("Failed to write score ledger {:?}: {}", self.path, e);
                }
            }
            Err(e) => {
                tracing::error!("Failed to serialize score ledger: {}", e);
            }
        }
    }

    fn read_fresh(&self) -> HashMap<String, LedgerRecord> {
        if !self.path.exists() {
            return HashMap::new();
        }
        match self.try_read() {
            Ok(file) => {
                if let Some(ts) = &file.timestamp {
                    match DateTime::parse_from_rfc3339(ts) {
                        Ok(saved_at) => {
                            if Utc::now() - saved_at.with_timezone(&Utc) > freshness_window() {
                                tracing::info!("Discarding stale score ledger (older than 1 day)");
                                return HashMap::new();
                            }
                        }
                        Err(e) => {
                            tracing::warn!("Unreadable ledger timestamp '{}': {}", ts, e);
                            return HashMap::new();
                        }
                    }
                }
                file.players
            }
            Err(e) => {
                tracing::warn!("Failed to load score ledger {:?}: {}", self.path, e);
                HashMap::new()
            }
        }
    }

    fn try_read(&self) -> Result<LedgerFile, LedgerError> {
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn roster(entries: &[(&str, &str, i64)]) -> HashMap<String, Player> {
        entries
            .iter()
            .map(|(id, name, score)| {
                (
                    id.to_string(),
                    Player {
                        id: id.to_string(),
                        name: name.to_string(),
                        score: *score,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        // given:
        let dir = tempdir().unwrap();
        let ledger = ScoreLedger::new(dir.path().join("scores.json"));

        // when:
        ledger.save(&roster(&[("p1", "Ana", 3)]));
        let loaded = ledger.load();

        // then:
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["p1"].name, "Ana");
        assert_eq!(loaded["p1"].score, 3);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let ledger = ScoreLedger::new(dir.path().join("missing.json"));
        assert!(ledger.load().is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(&path, "{not json").unwrap();

        let ledger = ScoreLedger::new(path);
        assert!(ledger.load().is_empty());
    }

    #[test]
    fn test_merge_by_name_preserves_historical_id() {
        // given: a ledger entry written under the original id
        let dir = tempdir().unwrap();
        let ledger = ScoreLedger::new(dir.path().join("scores.json"));
        ledger.save(&roster(&[("p1", "Ana", 3)]));

        // when: the same name flushes again under a fresh id
        ledger.save(&roster(&[("p9", "ANA", 5)]));

        // then: still keyed by the historical id, score updated
        let loaded = ledger.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["p1"].id, "p1");
        assert_eq!(loaded["p1"].score, 5);
    }

    #[test]
    fn test_merge_never_touches_unrelated_names() {
        let dir = tempdir().unwrap();
        let ledger = ScoreLedger::new(dir.path().join("scores.json"));
        ledger.save(&roster(&[("p1", "Ana", 3), ("p2", "Bob", 7)]));

        ledger.save(&roster(&[("p1", "Ana", 4)]));

        let loaded = ledger.load();
        assert_eq!(loaded["p1"].score, 4);
        assert_eq!(loaded["p2"].score, 7);
    }

    #[test]
    fn test_negative_score_reaches_disk() {
        let dir = tempdir().unwrap();
        let ledger = ScoreLedger::new(dir.path().join("scores.json"));

        ledger.save(&roster(&[("p1", "Ana", -2)]));

        assert_eq!(ledger.find_by_name("ana").unwrap().score, -2);
    }

    #[test]
    fn test_stale_data_is_discarded() {
        // given: a file stamped two days ago
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.json");
        let stale = Utc::now() - Duration::days(2);
        let json = serde_json::json!({
            "timestamp": stale.to_rfc3339(),
            "players": {
                "p1": {"id": "p1", "name": "Ana", "score": 3}
            }
        });
        std::fs::write(&path, json.to_string()).unwrap();

        // when / then:
        let ledger = ScoreLedger::new(path);
        assert!(ledger.load().is_empty());
    }

    #[test]
    fn test_find_by_name_uses_canonical_key() {
        let dir = tempdir().unwrap();
        let ledger = ScoreLedger::new(dir.path().join("scores.json"));
        ledger.save(&roster(&[("p1", "Ana", 1)]));

        assert!(ledger.find_by_name("ana").is_some());
        assert!(ledger.find_by_name(&PlayerName::key_of("  ANA ")).is_some());
        assert!(ledger.find_by_name("bob").is_none());
    }
}
