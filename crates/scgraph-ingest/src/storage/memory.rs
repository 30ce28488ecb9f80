//! In-process follower store used for dry runs

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use super::FollowerStore;
use crate::error::Result;
use scgraph_common::types::{AccountId, ArtistFollowerEdge, FollowerProfile};

#[derive(Default)]
struct Tables {
    profiles: HashMap<AccountId, FollowerProfile>,
    edges: HashSet<ArtistFollowerEdge>,
    /// Edges in insertion order
    edge_log: Vec<ArtistFollowerEdge>,
}

/// Same semantics as the Postgres store, kept in memory
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn profile(&self, id: AccountId) -> Option<FollowerProfile> {
        self.tables().profiles.get(&id).cloned()
    }

    pub fn profile_count(&self) -> usize {
        self.tables().profiles.len()
    }

    /// Stored edges, oldest first
    pub fn edges(&self) -> Vec<ArtistFollowerEdge> {
        self.tables().edge_log.clone()
    }

    pub fn edge_count(&self) -> usize {
        self.tables().edge_log.len()
    }
}

#[async_trait]
impl FollowerStore for MemoryStore {
    async fn ensure_profile(&self, profile: &FollowerProfile) -> Result<bool> {
        let account_id = profile.external_id.get();
        let mut tables = self.tables();
        if tables.profiles.contains_key(&profile.external_id) {
            debug!(account_id, "Follower profile already stored");
            return Ok(false);
        }
        tables.profiles.insert(profile.external_id, profile.clone());
        debug!(account_id, "Stored follower profile");
        Ok(true)
    }

    async fn ensure_edge(&self, edge: &ArtistFollowerEdge) -> Result<bool> {
        let artist_id = edge.artist_id.get();
        let follower_id = edge.follower_id.get();
        let mut tables = self.tables();
        if !tables.edges.insert(*edge) {
            debug!(artist_id, follower_id, rank = edge.rank, "Artist follower edge already stored");
            return Ok(false);
        }
        tables.edge_log.push(*edge);
        debug!(artist_id, follower_id, rank = edge.rank, "Stored artist follower edge");
        Ok(true)
    }
}
