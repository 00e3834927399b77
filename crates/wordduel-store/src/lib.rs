//! Win persistence for WordDuel.
//!
//! The session server credits match winners and serves the leaderboard
//! through the [`WinStore`] trait. Two stores ship with the crate:
//!
//! - [`MemoryStore`] keeps counts for the life of the process
//! - [`JsonFileStore`] keeps them in a JSON file across restarts
//!
//! # Degrading gracefully
//!
//! Store failures are returned, never panicked on. The session layer
//! decides what they mean: a failed [`record_win`](WinStore::record_win)
//! is logged and the match result still stands, a failed
//! [`top_players`](WinStore::top_players) becomes an empty leaderboard.

#![allow(async_fn_in_trait)]

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;

use std::collections::HashMap;

use wordduel_protocol::LeaderboardEntry;

/// Leaderboard size used when none is configured.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Counts wins per username.
///
/// # Trait bounds
///
/// - `Send + Sync` → one store is shared by every connection task.
/// - `'static` → it lives as long as the server.
///
/// # Example
///
/// ```rust
/// use wordduel_protocol::LeaderboardEntry;
/// use wordduel_store::{StoreError, WinStore};
///
/// /// Forgets everything. Handy when a deployment has no leaderboard.
/// struct NullStore;
///
/// impl WinStore for NullStore {
///     async fn record_win(&self, _username: &str) -> Result<(), StoreError> {
///         Ok(())
///     }
///
///     async fn top_players(&self, _limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
///         Ok(Vec::new())
///     }
///
///     async fn wins_for(&self, _username: &str) -> Result<u32, StoreError> {
///         Ok(0)
///     }
/// }
/// ```
pub trait WinStore: Send + Sync + 'static {
    /// Adds one win to `username`, creating the row if needed.
    fn record_win(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Up to `limit` players, most wins first. Equal counts are ordered
    /// by username.
    fn top_players(
        &self,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<LeaderboardEntry>, StoreError>> + Send;

    /// Wins recorded for `username`; 0 if they have none.
    fn wins_for(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<u32, StoreError>> + Send;
}

/// Orders a win table into leaderboard rows.
pub(crate) fn rank(wins: &HashMap<String, u32>, limit: usize) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<LeaderboardEntry> = wins
        .iter()
        .map(|(username, wins)| LeaderboardEntry {
            username: username.clone(),
            wins: *wins,
        })
        .collect();
    rows.sort_by(|a, b| b.wins.cmp(&a.wins).then_with(|| a.username.cmp(&b.username)));
    rows.truncate(limit);
    rows
}
