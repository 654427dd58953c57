use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{History, RepositoryRecord};

pub const DEFAULT_HISTORY_FILE: &str = "github_trending_history.json";
pub const DEFAULT_SNAPSHOT_FILE: &str = "github_trending_repos.json";

/// Persisted set of repositories already reported.
pub trait HistoryStore: Send + Sync {
    /// Never fails: anything unreadable is treated as an empty history.
    fn load(&self) -> History;

    /// Replaces whatever was stored before with `history`.
    fn save(&self, history: &History) -> Result<(), SaveHistoryError>;
}

#[derive(Debug, Error)]
pub enum SaveHistoryError {
    #[error("CreateDir {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialize: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },

    #[error("Write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Rename {}: {source}", path.display())]
    Rename {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// History kept as one indented JSON object in a file.
#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self) -> History {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("No history at {}, starting empty", self.path.display());
                return History::new();
            }
            Err(err) => {
                warn!(
                    "Error reading {}, starting with empty history: {err}",
                    self.path.display()
                );
                return History::new();
            }
        };

        match serde_json::from_str::<History>(&text) {
            Ok(mut history) => {
                history.values_mut().for_each(RepositoryRecord::fill_derived);
                debug!(
                    "Loaded {} repositories from {}",
                    history.len(),
                    self.path.display()
                );
                history
            }
            Err(err) => {
                warn!(
                    "Error parsing {}, starting with empty history: {err}",
                    self.path.display()
                );
                History::new()
            }
        }
    }

    fn save(&self, history: &History) -> Result<(), SaveHistoryError> {
        write_json_atomically(&self.path, history)?;
        debug!("Saved {} repositories to {}", history.len(), self.path.display());
        Ok(())
    }
}

/// Stateless mode: every run starts from nothing, so every repository on the
/// page counts as new. Optionally keeps a copy of the latest run on disk.
#[derive(Debug, Clone, Default)]
pub struct SnapshotHistoryStore {
    snapshot_file: Option<PathBuf>,
}

impl SnapshotHistoryStore {
    pub fn new(snapshot_file: Option<PathBuf>) -> Self {
        Self { snapshot_file }
    }
}

impl HistoryStore for SnapshotHistoryStore {
    fn load(&self) -> History {
        History::new()
    }

    fn save(&self, history: &History) -> Result<(), SaveHistoryError> {
        match &self.snapshot_file {
            Some(path) => {
                write_json_atomically(path, history)?;
                info!(
                    "Saved snapshot of {} repositories to {}",
                    history.len(),
                    path.display()
                );
                Ok(())
            }
            None => Ok(()),
        }
    }
}

// Written to a sibling `.tmp` file then renamed over the target; a crash
// mid-write leaves the previous file intact.
fn write_json_atomically(path: &Path, history: &History) -> Result<(), SaveHistoryError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| SaveHistoryError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let json = serde_json::to_string_pretty(history)?;

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, json).map_err(|source| SaveHistoryError::Write {
        path: tmp_path.clone(),
        source,
    })?;

    fs::rename(&tmp_path, path).map_err(|source| SaveHistoryError::Rename {
        path: path.to_path_buf(),
        source,
    })
}
