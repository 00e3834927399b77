//! File-backed word lists.

use std::collections::HashMap;
use std::path::Path;

use crate::{SUPPORTED_MODES, WordError, WordPool, WordSource};

/// Secret and acceptable-guess pools for every supported mode.
///
/// On disk, each mode has two flat files (one word per line):
///
/// | mode | secret words           | acceptable guesses           |
/// |------|------------------------|------------------------------|
/// | 5    | `fiveletterwords.txt`  | `longerfiveletterwords.txt`  |
/// | 6    | `sixletterwords.txt`   | `longersixletterwords.txt`   |
/// | 7    | `sevenletterwords.txt` | `longersevenletterwords.txt` |
#[derive(Debug, Clone, Default)]
pub struct WordLists {
    secret: HashMap<u8, WordPool>,
    acceptable: HashMap<u8, WordPool>,
}

impl WordLists {
    /// Creates an empty set of lists. Every mode yields an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the pools for one mode.
    ///
    /// Words are normalized the same way as [`load`](Self::load): trimmed,
    /// upper-cased, and dropped if blank or not `mode` letters long.
    /// Secret words are always acceptable guesses.
    pub fn with_mode<S, A>(mut self, mode: u8, secret: S, acceptable: A) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        let secret = normalize(mode, secret);
        let mut accepted = normalize(mode, acceptable);
        for word in &secret {
            if !accepted.contains(word) {
                accepted.push(word.clone());
            }
        }
        self.secret.insert(mode, WordPool::new(secret));
        self.acceptable.insert(mode, WordPool::new(accepted));
        self
    }

    /// Loads all supported modes from `dir`.
    ///
    /// # Errors
    /// Returns [`WordError::Io`] if any of the six files is unreadable.
    pub async fn load(dir: impl AsRef<Path>) -> Result<Self, WordError> {
        let dir = dir.as_ref();
        let mut lists = Self::new();
        for mode in SUPPORTED_MODES {
            let name = mode_name(mode);
            let secret = read_list(&dir.join(format!("{name}letterwords.txt"))).await?;
            let acceptable =
                read_list(&dir.join(format!("longer{name}letterwords.txt"))).await?;
            lists = lists.with_mode(mode, secret.lines(), acceptable.lines());
        }
        tracing::info!(dir = %dir.display(), "word lists loaded");
        Ok(lists)
    }

    /// Checks that every supported mode can actually be played.
    ///
    /// # Errors
    /// Returns [`WordError::EmptyPool`] for the first mode whose secret
    /// pool is empty.
    pub fn validate(&self) -> Result<(), WordError> {
        for mode in SUPPORTED_MODES {
            let secret = self.words_for(mode);
            if secret.is_empty() {
                return Err(WordError::EmptyPool(mode));
            }
            tracing::debug!(
                mode,
                secret = secret.len(),
                acceptable = self.acceptable_guesses_for(mode).len(),
                "word pool ready"
            );
        }
        Ok(())
    }
}

impl WordSource for WordLists {
    fn words_for(&self, mode: u8) -> WordPool {
        self.secret.get(&mode).cloned().unwrap_or_default()
    }

    fn acceptable_guesses_for(&self, mode: u8) -> WordPool {
        self.acceptable.get(&mode).cloned().unwrap_or_default()
    }
}

fn mode_name(mode: u8) -> &'static str {
    match mode {
        5 => "five",
        6 => "six",
        7 => "seven",
        _ => "unsupported",
    }
}

async fn read_list(path: &Path) -> Result<String, WordError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| WordError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn normalize<I>(mode: u8, words: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| w.as_ref().trim().to_ascii_uppercase())
        .filter(|w| {
            w.chars().count() == usize::from(mode)
                && w.chars().all(|c| c.is_ascii_alphabetic())
        })
        .collect()
}
