//! # WordDuel
//!
//! Session server for a two-player, round-based word-guessing game.
//!
//! Players connect over TCP and exchange newline-delimited JSON
//! envelopes. One player creates a room under a code, the other joins
//! with it, and both race through the same secret words while the
//! server scores every round and names the winner.
//!
//! ```text
//! Transport (line TCP) → Protocol (Envelope ↔ request/response)
//!     → Session Server (this crate) → Room actors → Win store
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wordduel::prelude::*;
//!
//! # async fn run() -> Result<(), WordDuelError> {
//! let words = WordLists::load("words").await?;
//! words.validate()?;
//!
//! let server = WordDuelServerBuilder::new()
//!     .bind("127.0.0.1:55555")
//!     .build(words, MemoryStore::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::WordDuelError;
pub use server::{DEFAULT_BIND_ADDR, ServerConfig, WordDuelServer, WordDuelServerBuilder};

pub mod prelude {
    //! The types needed to configure and run a server.

    pub use crate::{ServerConfig, WordDuelError, WordDuelServer, WordDuelServerBuilder};
    pub use wordduel_store::{JsonFileStore, MemoryStore, WinStore};
    pub use wordduel_words::{WordLists, WordSource};
}
