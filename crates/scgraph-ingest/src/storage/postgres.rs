//! Postgres-backed follower store
//!
//! Statements run directly against the pool, so every insert is its own
//! transaction.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::FollowerStore;
use crate::error::Result;
use scgraph_common::types::{ArtistFollowerEdge, FollowerProfile};

const QUERY_PROFILE_EXISTS: &str = r#"
    SELECT account_id
    FROM soundcloud_user
    WHERE account_id = $1
"#;

const QUERY_INSERT_PROFILE: &str = r#"
    INSERT INTO soundcloud_user
        (account_id, avatar_url, full_name, followers_count, city, country_code, artist)
    VALUES
        ($1, $2, $3, $4, $5, $6, $7)
"#;

const QUERY_EDGE_EXISTS: &str = r#"
    SELECT artist_id
    FROM l_soundcloud_artist_user
    WHERE artist_id = $1
      AND user_id = $2
      AND rank = $3
"#;

const QUERY_INSERT_EDGE: &str = r#"
    INSERT INTO l_soundcloud_artist_user
        (artist_id, user_id, rank)
    VALUES
        ($1, $2, $3)
"#;

#[derive(Clone)]
pub struct PgFollowerStore {
    db: PgPool,
}

impl PgFollowerStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FollowerStore for PgFollowerStore {
    async fn ensure_profile(&self, profile: &FollowerProfile) -> Result<bool> {
        let account_id = profile.external_id.get();

        let existing = sqlx::query(QUERY_PROFILE_EXISTS)
            .bind(account_id)
            .fetch_optional(&self.db)
            .await?;

        if existing.is_some() {
            debug!(account_id, "Follower profile already stored");
            return Ok(false);
        }

        sqlx::query(QUERY_INSERT_PROFILE)
            .bind(account_id)
            .bind(&profile.avatar_url)
            .bind(&profile.display_name)
            .bind(profile.follower_count)
            .bind(&profile.city)
            .bind(&profile.country_code)
            .bind(profile.is_artist)
            .execute(&self.db)
            .await?;

        debug!(account_id, "Stored follower profile");
        Ok(true)
    }

    async fn ensure_edge(&self, edge: &ArtistFollowerEdge) -> Result<bool> {
        let artist_id = edge.artist_id.get();
        let follower_id = edge.follower_id.get();

        let existing = sqlx::query(QUERY_EDGE_EXISTS)
            .bind(artist_id)
            .bind(follower_id)
            .bind(edge.rank)
            .fetch_optional(&self.db)
            .await?;

        if existing.is_some() {
            debug!(artist_id, follower_id, rank = edge.rank, "Artist follower edge already stored");
            return Ok(false);
        }

        sqlx::query(QUERY_INSERT_EDGE)
            .bind(artist_id)
            .bind(follower_id)
            .bind(edge.rank)
            .execute(&self.db)
            .await?;

        debug!(artist_id, follower_id, rank = edge.rank, "Stored artist follower edge");
        Ok(true)
    }
}
