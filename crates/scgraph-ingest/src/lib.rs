//! SoundCloud follower graph ingestion
//!
//! Walks candidate artist accounts, keeps the ones that have published
//! tracks, pages through their followers and records the most followed of
//! them as ranked artist-follower edges.
//!
//! # Example
//!
//! ```no_run
//! use scgraph_ingest::config::{ApiConfig, RankingConfig};
//! use scgraph_ingest::pipeline::FollowerGraphPipeline;
//! use scgraph_ingest::soundcloud::HttpSoundcloudClient;
//! use scgraph_ingest::storage::MemoryStore;
//! use scgraph_common::types::{AccountId, CandidateAccount};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api_config = ApiConfig::new("https://api-v2.soundcloud.com", "client_id=abc");
//!     let client = HttpSoundcloudClient::new(api_config.clone())?;
//!     let pipeline = FollowerGraphPipeline::new(
//!         client,
//!         MemoryStore::new(),
//!         api_config,
//!         RankingConfig::default(),
//!     );
//!
//!     let candidates = vec![CandidateAccount::explicit(AccountId::new(123))];
//!     let summary = pipeline.run(&candidates).await;
//!     println!("{} edges stored", summary.edges_inserted);
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod candidates;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod ranker;
pub mod soundcloud;
pub mod storage;

pub use error::{IngestError, Result};
pub use pipeline::{FollowerGraphPipeline, RunSummary};
