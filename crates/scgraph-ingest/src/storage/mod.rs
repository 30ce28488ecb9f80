//! Persistence gateway for follower profiles and artist-follower rank edges
//!
//! Both writes are check-then-insert and never update:
//!
//! - a profile is keyed by its external id; the first stored version wins
//! - an edge is keyed by the full `(artist_id, follower_id, rank)` triple, so a
//!   follower whose rank moves between runs gains an extra row instead of
//!   having the old one rewritten
//!
//! Each insert commits on its own. An interrupted run leaves whole rows only.

use async_trait::async_trait;

use crate::error::Result;
use scgraph_common::types::{ArtistFollowerEdge, FollowerProfile};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgFollowerStore;

#[async_trait]
pub trait FollowerStore: Send + Sync {
    /// Insert the profile unless one with the same external id exists
    ///
    /// Returns `true` when a row was written.
    async fn ensure_profile(&self, profile: &FollowerProfile) -> Result<bool>;

    /// Insert the edge unless the exact triple exists
    ///
    /// Returns `true` when a row was written.
    async fn ensure_edge(&self, edge: &ArtistFollowerEdge) -> Result<bool>;
}
