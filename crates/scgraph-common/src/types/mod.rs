//! Common types used across SCGraph

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// External platform account identifier
///
/// Identifiers share one space: an account can show up as a candidate
/// artist in one run and as somebody's follower in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for AccountId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AccountId {
    type Err = GraphError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| GraphError::InvalidAccountId(s.to_string()))
    }
}

/// An account believed to belong to an artist, as returned by the candidate source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateAccount {
    pub account_id: AccountId,

    /// Follower count recorded by an earlier process; drives candidate ordering
    pub prior_follower_count: Option<i64>,

    /// Row id of the cache entry the candidate was read from
    pub cache_row_id: Option<i64>,
}

impl CandidateAccount {
    /// Candidate supplied directly (e.g. from the command line) rather than queried
    pub fn explicit(account_id: AccountId) -> Self {
        Self {
            account_id,
            prior_follower_count: None,
            cache_row_id: None,
        }
    }
}

/// Canonical follower profile
///
/// Stored once per `external_id`; the first observation wins and later runs
/// never overwrite it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerProfile {
    pub external_id: AccountId,
    pub avatar_url: Option<String>,
    pub display_name: Option<String>,
    pub follower_count: i64,
    pub city: Option<String>,
    pub country_code: Option<String>,
    /// The follower has at least one published track
    pub is_artist: bool,
}

/// "`follower_id` is the `rank`-th most followed follower of `artist_id`"
///
/// For one artist the ranks form the sequence `1..=n` with no gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtistFollowerEdge {
    pub artist_id: AccountId,
    pub follower_id: AccountId,
    pub rank: i32,
}

/// Outcome of checking whether a candidate is an artist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtistStatus {
    /// Account has one or more published tracks
    Artist,
    NonArtist,
    /// Profile could not be fetched or decoded
    Unresolvable,
}

impl ArtistStatus {
    pub fn is_artist(self) -> bool {
        matches!(self, ArtistStatus::Artist)
    }
}

impl std::fmt::Display for ArtistStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtistStatus::Artist => write!(f, "artist"),
            ArtistStatus::NonArtist => write!(f, "non-artist"),
            ArtistStatus::Unresolvable => write!(f, "unresolvable"),
        }
    }
}
