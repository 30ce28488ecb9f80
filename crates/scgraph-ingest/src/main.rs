//! scgraph-ingest - SoundCloud follower graph ingestion

use anyhow::{Context, Result};
use clap::Parser;
use scgraph_common::logging::{init_logging, LogConfig, LogLevel};
use scgraph_common::types::{AccountId, CandidateAccount};
use scgraph_ingest::candidates::{CandidateSource, ExplicitCandidates, PgCandidateSource};
use scgraph_ingest::config::IngestConfig;
use scgraph_ingest::pipeline::{FollowerGraphPipeline, RunSummary};
use scgraph_ingest::soundcloud::HttpSoundcloudClient;
use scgraph_ingest::storage::{FollowerStore, MemoryStore, PgFollowerStore};
use sqlx::PgPool;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "scgraph-ingest")]
#[command(author, version, about = "Record notable followers of SoundCloud artists")]
struct Cli {
    /// Process at most this many candidates
    #[arg(short, long)]
    limit: Option<usize>,

    /// Process these account ids instead of querying the candidate table
    #[arg(short, long = "account", value_name = "ID")]
    accounts: Vec<AccountId>,

    /// Keep results in memory instead of writing to the database
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = log_config(cli.verbose)?;
    let _guard = init_logging(&log_config)?;

    let started = Instant::now();

    // Explicit accounts with a dry run need no database at all
    let require_database = !(cli.dry_run && !cli.accounts.is_empty());
    let config = IngestConfig::load(require_database).context("Failed to load configuration")?;

    let pool = match &config.database {
        Some(db) if require_database => Some(
            db.create_pool()
                .await
                .context("Failed to connect to database")?,
        ),
        _ => None,
    };

    let candidates = load_candidates(&cli, pool.as_ref()).await?;

    let client =
        HttpSoundcloudClient::new(config.api.clone()).context("Failed to build HTTP client")?;

    let summary = match (&pool, cli.dry_run) {
        (Some(pool), false) => {
            run(client, PgFollowerStore::new(pool.clone()), &config, &candidates).await
        },
        _ => {
            info!("Dry run, results are kept in memory");
            run(client, MemoryStore::new(), &config, &candidates).await
        },
    };

    debug!(
        candidates = summary.candidates,
        artists = summary.artists,
        non_artists = summary.non_artists,
        unresolvable = summary.unresolvable,
        persistence_failures = summary.persistence_failures,
        pages_fetched = summary.pages_fetched,
        pages_failed = summary.pages_failed,
        malformed_records = summary.malformed_records,
        profiles_inserted = summary.profiles_inserted,
        edges_inserted = summary.edges_inserted,
        "Run summary"
    );

    if let Some(pool) = pool {
        pool.close().await;
    }

    info!(
        "Done at {} after {:.1?}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        started.elapsed()
    );

    Ok(())
}

/// Logging settings from the verbose flag, overridden by `LOG_*` variables
///
/// `.env` is loaded first so its `LOG_*` entries count as environment.
fn log_config(verbose: bool) -> Result<LogConfig> {
    dotenvy::dotenv().ok();

    let level = if verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    LogConfig::builder()
        .level(level)
        .log_file_prefix("scgraph-ingest")
        .build()
        .merge_env()
}

async fn load_candidates(cli: &Cli, pool: Option<&PgPool>) -> Result<Vec<CandidateAccount>> {
    let mut candidates = if !cli.accounts.is_empty() {
        ExplicitCandidates::new(cli.accounts.clone())
            .fetch_candidates()
            .await?
    } else {
        let pool = pool.context("Candidate query needs a database connection")?;
        PgCandidateSource::new(pool.clone())
            .fetch_candidates()
            .await
            .context("Failed to query candidate accounts")?
    };

    if let Some(limit) = cli.limit {
        candidates.truncate(limit);
    }

    Ok(candidates)
}

async fn run<S: FollowerStore>(
    client: HttpSoundcloudClient,
    store: S,
    config: &IngestConfig,
    candidates: &[CandidateAccount],
) -> RunSummary {
    let pipeline = FollowerGraphPipeline::new(client, store, config.api.clone(), config.ranking);
    pipeline.run(candidates).await
}
