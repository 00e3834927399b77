use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wordduel::prelude::*;
use wordduel::DEFAULT_BIND_ADDR;
use wordduel_store::DEFAULT_LEADERBOARD_LIMIT;

/// Session server for two-player word duels.
#[derive(Parser, Debug)]
#[command(name = "wordduel-server", author, version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "WORDDUEL_BIND", default_value = DEFAULT_BIND_ADDR)]
    bind: String,

    /// Directory holding the word lists
    #[arg(long, env = "WORDDUEL_WORDS", default_value = "words")]
    words: PathBuf,

    /// JSON file for win counts; kept in memory when omitted
    #[arg(long, env = "WORDDUEL_LEADERBOARD")]
    leaderboard: Option<PathBuf>,

    /// Rows returned for a leaderboard request
    #[arg(long, default_value_t = DEFAULT_LEADERBOARD_LIMIT)]
    leaderboard_limit: usize,

    /// Close connections that stay silent this many seconds
    #[arg(long, env = "WORDDUEL_IDLE_TIMEOUT_SECS")]
    idle_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    match serve(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn serve(args: Args) -> Result<(), WordDuelError> {
    let words = WordLists::load(&args.words).await?;
    words.validate()?;

    let builder = WordDuelServerBuilder::new()
        .bind(&args.bind)
        .leaderboard_limit(args.leaderboard_limit)
        .idle_timeout(args.idle_timeout_secs.map(Duration::from_secs));

    match &args.leaderboard {
        Some(path) => {
            let store = JsonFileStore::open(path).await?;
            builder.build(words, store).await?.run().await
        }
        None => {
            tracing::info!("no leaderboard file given, win counts are kept in memory");
            builder.build(words, MemoryStore::new()).await?.run().await
        }
    }
}
