//! Configuration for the follower ingestion run
//!
//! Values come from the environment (a `.env` file is honoured) with the
//! defaults below. Endpoint templates and credentials live in [`ApiConfig`],
//! which is handed to the classifier and the paginator when they are built.

use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use url::Url;

use crate::error::{IngestError, Result};
use scgraph_common::types::AccountId;

// ============================================================================
// API Defaults
// ============================================================================

/// Default platform API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api-v2.soundcloud.com";

/// Followers requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 200;

/// Hard ceiling on page fetch attempts per artist, failed attempts included.
pub const DEFAULT_MAX_PAGES: u32 = 26;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Ranking Defaults
// ============================================================================

/// Number of notable followers ranked per artist.
pub const RANK_MAX: usize = 5000;

// ============================================================================
// Database Defaults
// ============================================================================

pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 2;

pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 1;

pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Platform API endpoints, credentials and transport limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root, e.g. `https://api-v2.soundcloud.com`
    pub base_url: String,
    /// Client credential query fragment appended to every request (e.g. `client_id=abc`)
    pub auth_params: String,
    pub page_size: u32,
    /// Maximum page fetch attempts per artist
    pub max_pages: u32,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Pause between outbound requests, in milliseconds
    pub request_interval_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_params: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            request_interval_ms: 0,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, auth_params: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_params: auth_params.into(),
            ..Self::default()
        }
    }

    /// Read API settings from the environment
    ///
    /// `SOUNDCLOUD_AUTH_PARAMS` wins over `SOUNDCLOUD_CLIENT_ID`; one of them must be set.
    pub fn from_env() -> Result<Self> {
        let auth_params = match std::env::var("SOUNDCLOUD_AUTH_PARAMS") {
            Ok(params) => params,
            Err(_) => std::env::var("SOUNDCLOUD_CLIENT_ID")
                .map(|id| format!("client_id={}", id))
                .map_err(|_| {
                    IngestError::config("SOUNDCLOUD_CLIENT_ID or SOUNDCLOUD_AUTH_PARAMS not set")
                })?,
        };

        Ok(Self {
            base_url: std::env::var("SOUNDCLOUD_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            auth_params,
            page_size: env_or("SOUNDCLOUD_PAGE_SIZE", DEFAULT_PAGE_SIZE),
            max_pages: env_or("SOUNDCLOUD_MAX_PAGES", DEFAULT_MAX_PAGES),
            connect_timeout_secs: env_or("SOUNDCLOUD_CONNECT_TIMEOUT", DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout_secs: env_or("SOUNDCLOUD_REQUEST_TIMEOUT", DEFAULT_REQUEST_TIMEOUT_SECS),
            request_interval_ms: env_or("SOUNDCLOUD_REQUEST_INTERVAL_MS", 0),
        })
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_request_timeout(mut self, timeout_secs: u64) -> Self {
        self.request_timeout_secs = timeout_secs;
        self
    }

    pub fn with_request_interval(mut self, interval_ms: u64) -> Self {
        self.request_interval_ms = interval_ms;
        self
    }

    /// Profile endpoint for an account (without credentials)
    pub fn user_url(&self, id: AccountId) -> String {
        format!("{}/users/{}", self.base_url.trim_end_matches('/'), id)
    }

    /// First followers page for an account (without credentials)
    pub fn followers_url(&self, id: AccountId) -> String {
        format!(
            "{}/users/{}/followers?offset=0&limit={}",
            self.base_url.trim_end_matches('/'),
            id,
            self.page_size
        )
    }

    /// Append the credential fragment to a URL, keeping any query it already has
    ///
    /// Cursor URLs returned by the API come back without credentials, so
    /// every request goes through here.
    pub fn authorize(&self, raw: &str) -> Result<Url> {
        let mut url =
            Url::parse(raw).map_err(|e| IngestError::decode(format!("bad URL '{}': {}", raw, e)))?;

        let auth = self.auth_params.trim_start_matches(['?', '&']);
        if auth.is_empty() {
            return Ok(url);
        }

        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{}&{}", existing, auth),
            _ => auth.to_string(),
        };
        url.set_query(Some(&query));

        Ok(url)
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)
            .map_err(|e| IngestError::config(format!("invalid API base URL '{}': {}", self.base_url, e)))?;

        if self.auth_params.trim_start_matches(['?', '&']).is_empty() {
            return Err(IngestError::config("API auth params cannot be empty"));
        }

        if self.page_size == 0 {
            return Err(IngestError::config("page size must be greater than 0"));
        }

        if self.max_pages == 0 {
            return Err(IngestError::config("max pages must be greater than 0"));
        }

        Ok(())
    }
}

/// Notable-follower ranking settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Followers kept per artist after sorting
    pub rank_max: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { rank_max: RANK_MAX }
    }
}

impl RankingConfig {
    pub fn from_env() -> Self {
        Self {
            rank_max: env_or("SCGRAPH_RANK_MAX", RANK_MAX),
        }
    }
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
            connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
        }
    }

    /// Read database settings; `DATABASE_URL` is required
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| IngestError::config("DATABASE_URL not set"))?;

        Ok(Self {
            url,
            max_connections: env_or("DB_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS),
            min_connections: env_or("DB_MIN_CONNECTIONS", DEFAULT_DATABASE_MIN_CONNECTIONS),
            connect_timeout_secs: env_or("DB_CONNECT_TIMEOUT", DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(IngestError::config("Database URL cannot be empty"));
        }

        if self.max_connections == 0 {
            return Err(IngestError::config("Database max_connections must be greater than 0"));
        }

        if self.min_connections > self.max_connections {
            return Err(IngestError::config(format!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }

        Ok(())
    }

    /// Open the connection pool shared by the whole run
    pub async fn create_pool(&self) -> Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.connect_timeout_secs))
            .connect(&self.url)
            .await?;

        tracing::info!(
            max_connections = self.max_connections,
            min_connections = self.min_connections,
            "Database connection pool created"
        );

        Ok(pool)
    }
}

/// Complete configuration for one ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub api: ApiConfig,
    pub ranking: RankingConfig,
    /// Absent when running without a database (dry run with explicit accounts)
    pub database: Option<DbConfig>,
}

impl IngestConfig {
    /// Load configuration from `.env` and the environment
    pub fn load(require_database: bool) -> Result<Self> {
        dotenvy::dotenv().ok();

        let database = match DbConfig::from_env() {
            Ok(db) => Some(db),
            Err(e) if require_database => return Err(e),
            Err(_) => None,
        };

        let config = Self {
            api: ApiConfig::from_env()?,
            ranking: RankingConfig::from_env(),
            database,
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;

        if self.ranking.rank_max == 0 {
            return Err(IngestError::config("rank max must be greater than 0"));
        }

        if let Some(db) = &self.database {
            db.validate()?;
        }

        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
