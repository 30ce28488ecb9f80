//! Notable-follower ranking
//!
//! Followers are sorted by follower count, most followed first, and the top
//! `rank_max` get ranks `1..=n`. The sort is stable, so followers with equal
//! counts keep the order the API returned them in.

use scgraph_common::types::{AccountId, ArtistFollowerEdge, FollowerProfile};

/// Output of ranking one artist's followers
#[derive(Debug, Clone)]
pub struct Ranking {
    /// Every normalized follower, in API order
    pub profiles: Vec<FollowerProfile>,
    /// Top followers by follower count, rank 1 first
    pub edges: Vec<ArtistFollowerEdge>,
}

impl Ranking {
    pub fn new(artist_id: AccountId, profiles: Vec<FollowerProfile>, rank_max: usize) -> Self {
        let edges = rank_followers(artist_id, &profiles, rank_max);
        Self { profiles, edges }
    }
}

pub fn rank_followers(
    artist_id: AccountId,
    profiles: &[FollowerProfile],
    rank_max: usize,
) -> Vec<ArtistFollowerEdge> {
    let mut ordered: Vec<&FollowerProfile> = profiles.iter().collect();
    ordered.sort_by(|a, b| b.follower_count.cmp(&a.follower_count));

    (1..=i32::MAX)
        .zip(ordered.into_iter().take(rank_max))
        .map(|(rank, follower)| ArtistFollowerEdge {
            artist_id,
            follower_id: follower.external_id,
            rank,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn follower(id: i64, follower_count: i64) -> FollowerProfile {
        FollowerProfile {
            external_id: AccountId::new(id),
            avatar_url: None,
            display_name: None,
            follower_count,
            city: None,
            country_code: None,
            is_artist: false,
        }
    }

    #[test]
    fn test_ranks_by_follower_count() {
        let artist = AccountId::new(1);
        let profiles = vec![follower(10, 10), follower(50, 50), follower(30, 30)];

        let edges = rank_followers(artist, &profiles, 5000);
        let ranked: Vec<(i64, i32)> = edges.iter().map(|e| (e.follower_id.get(), e.rank)).collect();
        assert_eq!(ranked, vec![(50, 1), (30, 2), (10, 3)]);
        assert!(edges.iter().all(|e| e.artist_id == artist));
    }

    #[test]
    fn test_ties_keep_api_order() {
        let profiles = vec![follower(1, 5), follower(2, 9), follower(3, 5), follower(4, 5)];
        let edges = rank_followers(AccountId::new(99), &profiles, 10);
        let order: Vec<i64> = edges.iter().map(|e| e.follower_id.get()).collect();
        assert_eq!(order, vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_truncates_to_rank_max() {
        let profiles: Vec<_> = (0..12).map(|i| follower(i, i)).collect();
        let edges = rank_followers(AccountId::new(99), &profiles, 5);
        assert_eq!(edges.len(), 5);
        assert_eq!(edges.last().unwrap().rank, 5);
        assert_eq!(edges[0].follower_id, AccountId::new(11));
    }

    #[test]
    fn test_empty_followers() {
        assert!(rank_followers(AccountId::new(1), &[], 5000).is_empty());
    }

    #[test]
    fn test_ranking_keeps_profiles_unchanged() {
        let profiles = vec![follower(10, 10), follower(50, 50)];
        let ranking = Ranking::new(AccountId::new(1), profiles.clone(), 1);
        assert_eq!(ranking.profiles, profiles);
        assert_eq!(ranking.edges.len(), 1);
        assert_eq!(ranking.edges[0].follower_id, AccountId::new(50));
    }

    proptest! {
        #[test]
        fn prop_ranks_are_dense_and_sorted(
            counts in prop::collection::vec(0i64..1_000, 0..300),
            rank_max in 1usize..400,
        ) {
            let profiles: Vec<_> = counts
                .iter()
                .enumerate()
                .map(|(i, c)| follower(i as i64, *c))
                .collect();
            let by_id: HashMap<AccountId, i64> =
                profiles.iter().map(|p| (p.external_id, p.follower_count)).collect();

            let edges = rank_followers(AccountId::new(-1), &profiles, rank_max);

            prop_assert_eq!(edges.len(), profiles.len().min(rank_max));
            for (i, edge) in edges.iter().enumerate() {
                prop_assert_eq!(edge.rank as usize, i + 1);
            }
            for pair in edges.windows(2) {
                prop_assert!(by_id[&pair[0].follower_id] >= by_id[&pair[1].follower_id]);
            }
        }
    }
}
