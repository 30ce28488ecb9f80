//! Candidate artist accounts
//!
//! Candidates are platform links of type `7` on active artist cache rows
//! with a known follower count, most followed first.
//!
//! The link column is text. Ids are parsed row by row so one unusable link
//! is skipped without losing the rest of the list.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::error::Result;
use scgraph_common::types::{AccountId, CandidateAccount};

const QUERY_CANDIDATES: &str = r#"
    SELECT cu.account_id::TEXT, cac.ss_followers::BIGINT, cac.id::BIGINT
    FROM cm_url cu
    JOIN cm_artist_cache cac ON cac.id::INTEGER = cu.target_id::INTEGER
    WHERE type = '7'
      AND account_id IS NOT NULL
      AND active IS TRUE
      AND cac.ss_followers IS NOT NULL
    ORDER BY cac.ss_followers DESC
"#;

/// `(account_id, prior_follower_count, cache_row_id)` as selected
type CandidateRow = (String, Option<i64>, Option<i64>);

fn candidate_from_row(row: CandidateRow) -> Option<CandidateAccount> {
    let (account_id, prior_follower_count, cache_row_id) = row;

    match account_id.parse::<AccountId>() {
        Ok(account_id) => Some(CandidateAccount {
            account_id,
            prior_follower_count,
            cache_row_id,
        }),
        Err(e) => {
            warn!(
                account_id = %account_id,
                cache_row_id = ?cache_row_id,
                error = %e,
                "Skipping candidate with unusable account id"
            );
            None
        },
    }
}

#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Candidates in processing order
    async fn fetch_candidates(&self) -> Result<Vec<CandidateAccount>>;
}

pub struct PgCandidateSource {
    db: PgPool,
}

impl PgCandidateSource {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CandidateSource for PgCandidateSource {
    async fn fetch_candidates(&self) -> Result<Vec<CandidateAccount>> {
        let rows: Vec<CandidateRow> = sqlx::query_as(QUERY_CANDIDATES)
            .fetch_all(&self.db)
            .await?;

        let total = rows.len();
        let candidates: Vec<CandidateAccount> =
            rows.into_iter().filter_map(candidate_from_row).collect();

        info!(
            count = candidates.len(),
            skipped = total - candidates.len(),
            "Retrieved candidate accounts"
        );
        Ok(candidates)
    }
}

/// Accounts named explicitly (e.g. on the command line), in the given order
pub struct ExplicitCandidates {
    accounts: Vec<AccountId>,
}

impl ExplicitCandidates {
    pub fn new(accounts: Vec<AccountId>) -> Self {
        Self { accounts }
    }
}

#[async_trait]
impl CandidateSource for ExplicitCandidates {
    async fn fetch_candidates(&self) -> Result<Vec<CandidateAccount>> {
        let candidates: Vec<CandidateAccount> = self
            .accounts
            .iter()
            .copied()
            .map(CandidateAccount::explicit)
            .collect();

        info!(count = candidates.len(), "Using explicitly listed accounts");
        Ok(candidates)
    }
}
