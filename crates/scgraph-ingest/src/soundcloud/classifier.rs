//! Artist classification
//!
//! An account is an artist when its profile reports at least one published
//! track. Fetch or decode problems make the candidate `Unresolvable`; they
//! never abort the run.

use tracing::{info, warn};

use super::client::SoundcloudApi;
use super::models::UserPayload;
use crate::config::ApiConfig;
use crate::error::Result;
use scgraph_common::types::{AccountId, ArtistStatus};

pub struct ArtistClassifier<'a, A: ?Sized> {
    api: &'a A,
    config: &'a ApiConfig,
}

impl<'a, A: SoundcloudApi + ?Sized> ArtistClassifier<'a, A> {
    pub fn new(api: &'a A, config: &'a ApiConfig) -> Self {
        Self { api, config }
    }

    /// Fetch the account profile and decide its artist status (one outbound call)
    pub async fn classify(&self, id: AccountId) -> ArtistStatus {
        match self.fetch_track_count(id).await {
            Ok(track_count) => {
                let status = status_for(track_count);
                if status.is_artist() {
                    info!(account_id = %id, track_count = ?track_count, "Matched as artist");
                }
                status
            },
            Err(e) => {
                warn!(account_id = %id, error = %e, "Could not resolve artist status");
                ArtistStatus::Unresolvable
            },
        }
    }

    async fn fetch_track_count(&self, id: AccountId) -> Result<Option<i64>> {
        let body = self.api.get_json(&self.config.user_url(id)).await?;
        Ok(UserPayload::from_value(body)?.track_count)
    }
}

/// Artist iff the track count is present and at least one
pub fn status_for(track_count: Option<i64>) -> ArtistStatus {
    match track_count {
        Some(count) if count >= 1 => ArtistStatus::Artist,
        _ => ArtistStatus::NonArtist,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedApi {
        response: fn() -> Result<Value>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SoundcloudApi for CannedApi {
        async fn get_json(&self, _url: &str) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.response)()
        }
    }

    async fn classify_with(response: fn() -> Result<Value>) -> (ArtistStatus, usize) {
        let api = CannedApi {
            response,
            calls: AtomicUsize::new(0),
        };
        let config = ApiConfig::new("https://api.example.com", "client_id=x");
        let status = ArtistClassifier::new(&api, &config)
            .classify(AccountId::new(1))
            .await;
        (status, api.calls.load(Ordering::SeqCst))
    }

    #[test]
    fn test_status_for_track_counts() {
        assert_eq!(status_for(None), ArtistStatus::NonArtist);
        assert_eq!(status_for(Some(0)), ArtistStatus::NonArtist);
        assert_eq!(status_for(Some(-1)), ArtistStatus::NonArtist);
        assert_eq!(status_for(Some(1)), ArtistStatus::Artist);
        assert_eq!(status_for(Some(250)), ArtistStatus::Artist);
    }

    #[tokio::test]
    async fn test_classify_artist() {
        let (status, calls) = classify_with(|| Ok(json!({"id": 1, "track_count": 3}))).await;
        assert_eq!(status, ArtistStatus::Artist);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_classify_without_tracks() {
        let (status, _) = classify_with(|| Ok(json!({"id": 1, "track_count": 0}))).await;
        assert_eq!(status, ArtistStatus::NonArtist);

        let (status, _) = classify_with(|| Ok(json!({"id": 1}))).await;
        assert_eq!(status, ArtistStatus::NonArtist);
    }

    #[tokio::test]
    async fn test_classify_failures_are_unresolvable() {
        let (status, calls) =
            classify_with(|| Err(IngestError::network("connection refused"))).await;
        assert_eq!(status, ArtistStatus::Unresolvable);
        assert_eq!(calls, 1);

        let (status, _) = classify_with(|| Err(IngestError::decode("not json"))).await;
        assert_eq!(status, ArtistStatus::Unresolvable);

        let (status, _) = classify_with(|| Ok(json!("just a string"))).await;
        assert_eq!(status, ArtistStatus::Unresolvable);
    }
}
