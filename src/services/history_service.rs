use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    error::StoreError,
    models::{
        history::{HistoryDocument, HistoryRecord, Sample},
        leaderboard::LeaderboardEntry,
    },
};

/// Appends one sample per snapshot entry. Users missing from the snapshot keep
/// their series untouched and nobody is ever removed.
pub fn merge_snapshot(
    mut history: HistoryDocument,
    entries: &[LeaderboardEntry],
    at: DateTime<Utc>,
) -> HistoryDocument {
    for entry in entries {
        let record = history
            .entry(entry.user_id.clone())
            .or_insert_with(|| HistoryRecord::new(entry.name.clone()));
        record.name = entry.name.clone();
        record.data.push(Sample(at, entry.seconds()));
    }
    history
}

/// File-backed store holding one JSON document per track.
///
/// Every track has its own lock: readers share it, the update path holds it
/// exclusively across load, merge and save. Documents are replaced through a
/// temp file and rename so a reader never observes a half-written file.
pub struct HistoryService {
    dir: PathBuf,
    locks: Vec<RwLock<()>>,
}

impl HistoryService {
    pub fn new(dir: impl Into<PathBuf>, track_count: usize) -> Self {
        Self {
            dir: dir.into(),
            locks: (0..track_count).map(|_| RwLock::new(())).collect(),
        }
    }

    pub fn path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{index}.json"))
    }

    /// Returns `None` when the track has no document yet.
    pub async fn read(&self, index: usize) -> Result<Option<HistoryDocument>, StoreError> {
        let Some(lock) = self.locks.get(index) else {
            return Ok(None);
        };
        let _guard = lock.read().await;
        load(&self.path(index)).await
    }

    pub async fn exists(&self, index: usize) -> bool {
        tokio::fs::try_exists(self.path(index)).await.unwrap_or(false)
    }

    /// Loads the document (empty if missing), applies `apply` and writes it back.
    /// A corrupt document is left on disk and reported instead of overwritten.
    pub async fn update<F>(&self, index: usize, apply: F) -> Result<HistoryDocument, StoreError>
    where
        F: FnOnce(HistoryDocument) -> HistoryDocument,
    {
        let path = self.path(index);
        let Some(lock) = self.locks.get(index) else {
            return Err(StoreError::Io {
                path,
                source: io::Error::new(io::ErrorKind::NotFound, "no such track"),
            });
        };
        let _guard = lock.write().await;

        let current = load(&path).await?.unwrap_or_default();
        let updated = apply(current);
        save(&self.dir, &path, &updated).await?;
        Ok(updated)
    }
}

async fn load(path: &Path) -> Result<Option<HistoryDocument>, StoreError> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

async fn save(dir: &Path, path: &Path, history: &HistoryDocument) -> Result<(), StoreError> {
    let body = serde_json::to_vec_pretty(history)?;
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    Ok(())
}
