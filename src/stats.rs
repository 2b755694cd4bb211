//! Progress bookkeeping. The session only reports events; this module owns
//! the best-ever records and their JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StatsError;

/// Receiver for the events a session produces.
pub trait StatsRecorder {
    /// Ensures a default record exists for the level.
    fn on_level_loaded(&mut self, level_id: &str);
    fn on_restart(&mut self);
    fn on_hint_used(&mut self);
    fn on_level_won(&mut self, level_id: &str, moves: u32, elapsed_secs: u64, stars: u8);

    /// Best-ever record for display, if the recorder keeps one.
    fn level_record(&self, _level_id: &str) -> Option<LevelStats> {
        None
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelStats {
    pub wins: u32,
    pub best_moves: Option<u32>,
    pub best_time_sec: Option<u64>,
    pub stars: u8,
}

impl LevelStats {
    fn record_win(&mut self, moves: u32, elapsed_secs: u64, stars: u8) {
        self.wins += 1;
        if self.best_moves.is_none_or(|best| moves < best) {
            self.best_moves = Some(moves);
        }
        if self.best_time_sec.is_none_or(|best| elapsed_secs < best) {
            self.best_time_sec = Some(elapsed_secs);
        }
        self.stars = self.stars.max(stars);
    }
}

/// Contents of the stats file. Missing fields fall back to defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsFile {
    pub levels: BTreeMap<String, LevelStats>,
    pub total_restarts: u32,
    pub total_hints: u32,
}

/// JSON-backed recorder. With no path it only keeps stats in memory.
#[derive(Debug, Default)]
pub struct StatsStore {
    path: Option<PathBuf>,
    data: StatsFile,
}

impl StatsStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Reads `path`, starting fresh if the file is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match Self::read(&path) {
            Ok(data) => data,
            Err(err) => {
                if path.exists() {
                    warn!(path = %path.display(), error = %err, "Stats file unreadable, starting fresh");
                } else {
                    debug!(path = %path.display(), "No stats file yet");
                }
                StatsFile::default()
            }
        };
        Self {
            path: Some(path),
            data,
        }
    }

    fn read(path: &Path) -> Result<StatsFile, StatsError> {
        let content = std::fs::read_to_string(path).map_err(|e| StatsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), StatsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(path, content).map_err(|e| StatsError::Io {
            path: path.clone(),
            source: e,
        })
    }

    fn persist(&self) {
        if let Err(err) = self.save() {
            warn!(error = %err, "Failed to save stats");
        }
    }

    pub fn data(&self) -> &StatsFile {
        &self.data
    }

    fn ensure_level(&mut self, level_id: &str) -> &mut LevelStats {
        self.data.levels.entry(level_id.to_string()).or_default()
    }
}

impl StatsRecorder for StatsStore {
    fn on_level_loaded(&mut self, level_id: &str) {
        self.ensure_level(level_id);
        self.persist();
    }

    fn on_restart(&mut self) {
        self.data.total_restarts += 1;
        self.persist();
    }

    fn on_hint_used(&mut self) {
        self.data.total_hints += 1;
        self.persist();
    }

    fn on_level_won(&mut self, level_id: &str, moves: u32, elapsed_secs: u64, stars: u8) {
        self.ensure_level(level_id)
            .record_win(moves, elapsed_secs, stars);
        debug!(level_id, moves, elapsed_secs, stars, "Recorded win");
        self.persist();
    }

    fn level_record(&self, level_id: &str) -> Option<LevelStats> {
        self.data.levels.get(level_id).cloned()
    }
}
