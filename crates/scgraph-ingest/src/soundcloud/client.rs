//! HTTP transport for the platform API
//!
//! The pipeline only ever issues credentialed GETs that return JSON, so the
//! transport seam is a single method. Tests swap in a mock server.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{IngestError, Result};

/// Read access to the platform API
#[async_trait]
pub trait SoundcloudApi: Send + Sync {
    /// GET `url` (credentials are added by the implementation) and decode the body as JSON
    ///
    /// Send failures and non-success statuses are `TransientNetwork`; bodies
    /// that do not parse are `Decode`. No retries happen here.
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/// `reqwest`-backed API client with timeouts and request spacing
pub struct HttpSoundcloudClient {
    client: Client,
    config: ApiConfig,
    last_request: Mutex<Option<Instant>>,
}

impl HttpSoundcloudClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| IngestError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            last_request: Mutex::new(None),
        })
    }

    async fn wait_for_slot(&self) {
        let interval = Duration::from_millis(self.config.request_interval_ms);
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}

#[async_trait]
impl SoundcloudApi for HttpSoundcloudClient {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let url = self.config.authorize(url)?;
        // Path only: the query carries credentials
        let path = url.path().to_string();

        self.wait_for_slot().await;
        debug!(path = %path, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| IngestError::network(format!("GET {} failed: {}", path, e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::network(format!("GET {} returned {}", path, status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| IngestError::network(format!("reading {} failed: {}", path, e.without_url())))?;

        serde_json::from_str(&body)
            .map_err(|e| IngestError::decode(format!("GET {} returned invalid JSON: {}", path, e)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    async fn client_for(server: &MockServer) -> HttpSoundcloudClient {
        HttpSoundcloudClient::new(ApiConfig::new(server.uri(), "client_id=test")).unwrap()
    }

    #[tokio::test]
    async fn test_get_json_appends_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/1"))
            .and(query_param("client_id", "test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let body = client.get_json(&format!("{}/users/1", server.uri())).await.unwrap();
        assert_eq!(body["id"], 1);
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.get_json(&format!("{}/users/1", server.uri())).await.unwrap_err();
        assert!(matches!(err, IngestError::Decode(_)));
    }

    #[tokio::test]
    async fn test_error_status_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.get_json(&format!("{}/users/1", server.uri())).await.unwrap_err();
        assert!(matches!(err, IngestError::TransientNetwork(_)));
        assert!(!err.to_string().contains("client_id"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        let client =
            HttpSoundcloudClient::new(ApiConfig::new("http://127.0.0.1:1", "client_id=test")).unwrap();
        let err = client.get_json("http://127.0.0.1:1/users/1").await.unwrap_err();
        assert!(matches!(err, IngestError::TransientNetwork(_)));
    }
}
