//! Follower graph ingestion pipeline
//!
//! For each candidate, in order:
//!
//! ```text
//! Pending -> Classifying -> Skipped
//!                        -> Fetching -> Ranking -> Persisting -> Done
//! ```
//!
//! Only artists go past classification. Profiles are written before edges,
//! since edges point at follower ids. A failing candidate is logged and the
//! loop moves on; nothing is retried within a run and nothing marks a skipped
//! candidate, so the next run tries it again from scratch.

use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::config::{ApiConfig, RankingConfig};
use crate::error::Result;
use crate::ranker::Ranking;
use crate::soundcloud::{normalize, ArtistClassifier, FollowerPaginator, SoundcloudApi};
use crate::storage::FollowerStore;
use scgraph_common::types::{AccountId, ArtistStatus, CandidateAccount, FollowerProfile};

/// Where a candidate is in its processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateState {
    Pending,
    Classifying,
    Skipped,
    Fetching,
    Ranking,
    Persisting,
    Done,
}

/// Why a candidate ended without being fully processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NonArtist,
    Unresolvable,
    /// A write failed part-way; rows committed before it stay
    PersistenceFailed,
}

/// Per-artist counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistStats {
    pub pages_fetched: u32,
    pub pages_failed: u32,
    pub raw_records: usize,
    pub malformed_records: usize,
    pub profiles_inserted: usize,
    pub edges_ranked: usize,
    pub edges_inserted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    Skipped(SkipReason),
    Done(ArtistStats),
}

/// Counters for a whole run
///
/// Observability only: a run with skipped pages or candidates still
/// completes normally.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub candidates: usize,
    pub artists: usize,
    pub non_artists: usize,
    pub unresolvable: usize,
    pub persistence_failures: usize,
    pub pages_fetched: u32,
    pub pages_failed: u32,
    pub malformed_records: usize,
    pub profiles_inserted: usize,
    pub edges_inserted: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    fn record(&mut self, outcome: &CandidateOutcome) {
        self.candidates += 1;
        match outcome {
            CandidateOutcome::Skipped(SkipReason::NonArtist) => self.non_artists += 1,
            CandidateOutcome::Skipped(SkipReason::Unresolvable) => self.unresolvable += 1,
            CandidateOutcome::Skipped(SkipReason::PersistenceFailed) => {
                self.artists += 1;
                self.persistence_failures += 1;
            },
            CandidateOutcome::Done(stats) => {
                self.artists += 1;
                self.pages_fetched += stats.pages_fetched;
                self.pages_failed += stats.pages_failed;
                self.malformed_records += stats.malformed_records;
                self.profiles_inserted += stats.profiles_inserted;
                self.edges_inserted += stats.edges_inserted;
            },
        }
    }
}

/// Drives classify -> fetch -> rank -> persist over a candidate list
pub struct FollowerGraphPipeline<A, S> {
    api: A,
    store: S,
    api_config: ApiConfig,
    ranking: RankingConfig,
}

impl<A: SoundcloudApi, S: FollowerStore> FollowerGraphPipeline<A, S> {
    pub fn new(api: A, store: S, api_config: ApiConfig, ranking: RankingConfig) -> Self {
        Self {
            api,
            store,
            api_config,
            ranking,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process every candidate in order; never fails as a whole
    pub async fn run(&self, candidates: &[CandidateAccount]) -> RunSummary {
        let started = Instant::now();
        let mut summary = RunSummary::default();

        for (index, candidate) in candidates.iter().enumerate() {
            let outcome = self.process_candidate(index, candidate).await;
            summary.record(&outcome);
        }

        summary.elapsed = started.elapsed();
        summary
    }

    /// Run one candidate through the state machine
    pub async fn process_candidate(
        &self,
        index: usize,
        candidate: &CandidateAccount,
    ) -> CandidateOutcome {
        let artist_id = candidate.account_id;
        let mut state = CandidateState::Pending;

        info!(index, account_id = %artist_id, "Checking if account is an artist");
        transition(&mut state, CandidateState::Classifying, artist_id);

        let status = ArtistClassifier::new(&self.api, &self.api_config)
            .classify(artist_id)
            .await;

        let skip = match status {
            ArtistStatus::Artist => None,
            ArtistStatus::NonArtist => Some(SkipReason::NonArtist),
            ArtistStatus::Unresolvable => Some(SkipReason::Unresolvable),
        };
        if let Some(reason) = skip {
            transition(&mut state, CandidateState::Skipped, artist_id);
            debug!(account_id = %artist_id, reason = ?reason, "Skipping candidate");
            return CandidateOutcome::Skipped(reason);
        }

        transition(&mut state, CandidateState::Fetching, artist_id);
        info!(account_id = %artist_id, "Getting followers");
        let fetched = FollowerPaginator::new(&self.api, &self.api_config, artist_id)
            .collect_records()
            .await;

        let mut stats = ArtistStats {
            pages_fetched: fetched.pages_fetched,
            pages_failed: fetched.pages_failed,
            raw_records: fetched.records.len(),
            ..ArtistStats::default()
        };

        let profiles = normalize_records(artist_id, &fetched.records, &mut stats);

        transition(&mut state, CandidateState::Ranking, artist_id);
        info!(account_id = %artist_id, followers = profiles.len(), "Ranking notable followers");
        let ranking = Ranking::new(artist_id, profiles, self.ranking.rank_max);
        stats.edges_ranked = ranking.edges.len();

        transition(&mut state, CandidateState::Persisting, artist_id);
        if let Err(e) = self.persist(&ranking, &mut stats).await {
            error!(
                account_id = %artist_id,
                profiles_inserted = stats.profiles_inserted,
                edges_inserted = stats.edges_inserted,
                error = %e,
                "Persisting followers failed, moving to next candidate"
            );
            transition(&mut state, CandidateState::Skipped, artist_id);
            return CandidateOutcome::Skipped(SkipReason::PersistenceFailed);
        }

        transition(&mut state, CandidateState::Done, artist_id);
        info!(
            account_id = %artist_id,
            followers = ranking.profiles.len(),
            profiles_inserted = stats.profiles_inserted,
            edges_inserted = stats.edges_inserted,
            "Artist processed"
        );

        CandidateOutcome::Done(stats)
    }

    async fn persist(&self, ranking: &Ranking, stats: &mut ArtistStats) -> Result<()> {
        for profile in &ranking.profiles {
            if self.store.ensure_profile(profile).await? {
                stats.profiles_inserted += 1;
            }
        }

        for edge in &ranking.edges {
            if self.store.ensure_edge(edge).await? {
                stats.edges_inserted += 1;
            }
        }

        Ok(())
    }
}

fn normalize_records(
    artist_id: AccountId,
    records: &[serde_json::Value],
    stats: &mut ArtistStats,
) -> Vec<FollowerProfile> {
    let mut profiles = Vec::with_capacity(records.len());

    for (position, raw) in records.iter().enumerate() {
        match normalize(raw) {
            Ok(profile) => profiles.push(profile),
            Err(e) => {
                stats.malformed_records += 1;
                warn!(account_id = %artist_id, position, error = %e, "Skipping malformed follower record");
            },
        }
    }

    profiles
}

fn transition(state: &mut CandidateState, next: CandidateState, artist_id: AccountId) {
    debug!(account_id = %artist_id, from = ?*state, to = ?next, "Candidate state");
    *state = next;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use scgraph_common::types::ArtistFollowerEdge;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves one artist profile and one followers page per account id
    struct FakeApi {
        followers_calls: AtomicUsize,
    }

    #[async_trait]
    impl SoundcloudApi for FakeApi {
        async fn get_json(&self, url: &str) -> Result<Value> {
            if url.contains("/followers") {
                self.followers_calls.fetch_add(1, Ordering::SeqCst);
                return Ok(json!({
                    "collection": [
                        {"id": 11, "followers_count": 10, "avatar_url": null, "full_name": "b",
                         "city": null, "country_code": null},
                        {"id": 12, "full_name": "no counts"},
                        {"id": 13, "followers_count": 50, "avatar_url": null, "full_name": "a",
                         "city": "Oslo", "country_code": "NO", "track_count": 4}
                    ],
                    "next_href": null
                }));
            }
            if url.ends_with("/users/1") {
                return Ok(json!({"id": 1, "track_count": 3}));
            }
            if url.ends_with("/users/2") {
                return Ok(json!({"id": 2, "track_count": 0}));
            }
            Err(IngestError::network("connection refused"))
        }
    }

    /// Accepts profiles, rejects every edge
    struct BrokenEdges(MemoryStore);

    #[async_trait]
    impl FollowerStore for BrokenEdges {
        async fn ensure_profile(&self, profile: &FollowerProfile) -> Result<bool> {
            self.0.ensure_profile(profile).await
        }

        async fn ensure_edge(&self, _edge: &ArtistFollowerEdge) -> Result<bool> {
            Err(IngestError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    fn pipeline<S: FollowerStore>(store: S) -> FollowerGraphPipeline<FakeApi, S> {
        FollowerGraphPipeline::new(
            FakeApi {
                followers_calls: AtomicUsize::new(0),
            },
            store,
            ApiConfig::new("https://api.example.com", "client_id=x"),
            RankingConfig::default(),
        )
    }

    fn candidates(ids: &[i64]) -> Vec<CandidateAccount> {
        ids.iter()
            .map(|id| CandidateAccount::explicit(AccountId::new(*id)))
            .collect()
    }

    #[tokio::test]
    async fn test_artist_is_ranked_and_persisted() {
        let pipeline = pipeline(MemoryStore::new());

        let outcome = pipeline.process_candidate(0, &candidates(&[1])[0]).await;
        let CandidateOutcome::Done(stats) = outcome else {
            panic!("expected Done, got {:?}", outcome);
        };

        assert_eq!(stats.raw_records, 3);
        assert_eq!(stats.malformed_records, 1);
        assert_eq!(stats.profiles_inserted, 2);
        assert_eq!(stats.edges_inserted, 2);

        let edges = pipeline.store().edges();
        assert_eq!(edges[0].follower_id, AccountId::new(13));
        assert_eq!(edges[0].rank, 1);
        assert_eq!(edges[1].follower_id, AccountId::new(11));
        assert_eq!(edges[1].rank, 2);
        assert!(pipeline.store().profile(AccountId::new(13)).unwrap().is_artist);
    }

    #[tokio::test]
    async fn test_non_artist_and_unresolvable_are_skipped() {
        let pipeline = pipeline(MemoryStore::new());

        let summary = pipeline.run(&candidates(&[2, 3])).await;
        assert_eq!(summary.candidates, 2);
        assert_eq!(summary.non_artists, 1);
        assert_eq!(summary.unresolvable, 1);
        assert_eq!(summary.artists, 0);
        assert_eq!(pipeline.api.followers_calls.load(Ordering::SeqCst), 0);
        assert_eq!(pipeline.store().profile_count(), 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_does_not_stop_run() {
        let pipeline = pipeline(BrokenEdges(MemoryStore::new()));

        let summary = pipeline.run(&candidates(&[1, 2])).await;
        assert_eq!(summary.candidates, 2);
        assert_eq!(summary.persistence_failures, 1);
        assert_eq!(summary.non_artists, 1);
        // profiles are written before edges and stay committed
        assert_eq!(pipeline.store().0.profile_count(), 2);
    }

    #[tokio::test]
    async fn test_second_run_writes_nothing_new() {
        let pipeline = pipeline(MemoryStore::new());

        let first = pipeline.run(&candidates(&[1])).await;
        assert_eq!(first.profiles_inserted, 2);
        assert_eq!(first.edges_inserted, 2);

        let second = pipeline.run(&candidates(&[1])).await;
        assert_eq!(second.profiles_inserted, 0);
        assert_eq!(second.edges_inserted, 0);
        assert_eq!(pipeline.store().edge_count(), 2);
    }
}
