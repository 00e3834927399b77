//! Word source for WordDuel.
//!
//! Supplies, per mode (word length 5, 6 or 7):
//!
//! - a **secret pool** that round words are drawn from, and
//! - an **acceptable-guesses pool** used to validate what players type.
//!
//! Both are plain lookups with no state beyond the loaded lists. Pools
//! are reference-counted, so a room can hold on to its mode's pool for
//! lazy draws without copying the list.

mod error;
mod lists;

pub use error::WordError;
pub use lists::WordLists;

use std::sync::Arc;

use rand::seq::IndexedRandom;

/// Word lengths the game supports.
pub const SUPPORTED_MODES: [u8; 3] = [5, 6, 7];

/// Returns `true` if `mode` is one of [`SUPPORTED_MODES`].
pub fn is_supported_mode(mode: u8) -> bool {
    SUPPORTED_MODES.contains(&mode)
}

/// Supplies word pools by mode.
///
/// Unsupported modes yield an empty pool. Callers must treat an empty
/// secret pool as a configuration error rather than carry on.
pub trait WordSource: Send + Sync + 'static {
    /// The pool secret words are drawn from.
    fn words_for(&self, mode: u8) -> WordPool;

    /// The pool of words a player may submit as a guess.
    fn acceptable_guesses_for(&self, mode: u8) -> WordPool;
}

/// An immutable, cheaply cloneable list of equal-length uppercase words.
#[derive(Debug, Clone, Default)]
pub struct WordPool(Arc<[String]>);

impl WordPool {
    /// Builds a pool from already-normalized words.
    pub fn new(words: Vec<String>) -> Self {
        Self(words.into())
    }

    /// Returns the words in load order.
    pub fn words(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, word: &str) -> bool {
        let word = word.trim().to_ascii_uppercase();
        self.0.iter().any(|w| *w == word)
    }

    /// Draws one word uniformly at random. `None` if the pool is empty.
    pub fn pick_random(&self) -> Option<&str> {
        pick_random(&self.0)
    }
}

/// Draws one word uniformly at random from `pool`.
///
/// Returns `None` for an empty pool; there is nothing sensible to draw.
pub fn pick_random(pool: &[String]) -> Option<&str> {
    pool.choose(&mut rand::rng()).map(String::as_str)
}
