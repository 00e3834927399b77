//! In-process win store.

use std::collections::HashMap;

use tokio::sync::Mutex;
use wordduel_protocol::LeaderboardEntry;

use crate::{StoreError, WinStore, rank};

/// Win counts held in memory. Lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    wins: Mutex<HashMap<String, u32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WinStore for MemoryStore {
    async fn record_win(&self, username: &str) -> Result<(), StoreError> {
        let mut wins = self.wins.lock().await;
        *wins.entry(username.to_string()).or_default() += 1;
        Ok(())
    }

    async fn top_players(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        Ok(rank(&*self.wins.lock().await, limit))
    }

    async fn wins_for(&self, username: &str) -> Result<u32, StoreError> {
        Ok(self.wins.lock().await.get(username).copied().unwrap_or(0))
    }
}
