//! Platform API access: transport, artist classification, follower
//! pagination and record normalization.
//!
//! # Example
//! ```no_run
//! use scgraph_ingest::config::ApiConfig;
//! use scgraph_ingest::soundcloud::{ArtistClassifier, FollowerPaginator, HttpSoundcloudClient};
//! use scgraph_common::types::AccountId;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ApiConfig::from_env()?;
//! let client = HttpSoundcloudClient::new(config.clone())?;
//!
//! let artist = AccountId::new(1234);
//! if ArtistClassifier::new(&client, &config).classify(artist).await.is_artist() {
//!     let fetched = FollowerPaginator::new(&client, &config, artist).collect_records().await;
//!     println!("{} raw follower records", fetched.records.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod client;
pub mod models;
pub mod normalizer;
pub mod paginator;

// Re-export commonly used types
pub use classifier::ArtistClassifier;
pub use client::{HttpSoundcloudClient, SoundcloudApi};
pub use models::{FollowersPage, UserPayload};
pub use normalizer::normalize;
pub use paginator::{FetchedFollowers, FollowerPaginator};
