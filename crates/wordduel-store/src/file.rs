//! Win store backed by a JSON file.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use wordduel_protocol::LeaderboardEntry;

use crate::{StoreError, WinStore, rank};

/// On-disk layout: `{"wins": {"alice": 3, "bob": 1}}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct WinTable {
    #[serde(default)]
    wins: HashMap<String, u32>,
}

/// Win counts kept in a JSON file.
///
/// The whole table is held in memory and rewritten on every win. Writes
/// go to a sibling `.tmp` file first and are renamed into place, so a
/// crash mid-write leaves the previous table intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    table: Mutex<WinTable>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty table; it
    /// is created on the first win.
    ///
    /// # Errors
    /// - [`StoreError::Io`] if the file exists but can't be read
    /// - [`StoreError::Corrupt`] if it isn't a win table
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let table = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => WinTable::default(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => WinTable::default(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        tracing::info!(path = %path.display(), players = table.wins.len(), "win store opened");
        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, table: &WinTable) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(table).map_err(StoreError::Encode)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

impl WinStore for JsonFileStore {
    async fn record_win(&self, username: &str) -> Result<(), StoreError> {
        // Held across the write so concurrent wins land in order.
        let mut table = self.table.lock().await;
        *table.wins.entry(username.to_string()).or_default() += 1;
        if let Err(e) = self.persist(&table).await {
            // Keep memory in step with disk.
            if let Some(count) = table.wins.get_mut(username) {
                *count -= 1;
                if *count == 0 {
                    table.wins.remove(username);
                }
            }
            return Err(e);
        }
        tracing::debug!(%username, "win recorded");
        Ok(())
    }

    async fn top_players(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        Ok(rank(&self.table.lock().await.wins, limit))
    }

    async fn wins_for(&self, username: &str) -> Result<u32, StoreError> {
        Ok(self
            .table
            .lock()
            .await
            .wins
            .get(username)
            .copied()
            .unwrap_or(0))
    }
}
