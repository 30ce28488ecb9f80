//! Cursor-following traversal of an artist's follower list
//!
//! Traversal starts at the first followers page and follows `next_href`
//! until the API stops returning one or the attempt budget (`max_pages`)
//! is spent. A failed fetch keeps the cursor where it was and still uses
//! up one attempt, so a permanently failing endpoint ends the traversal
//! after `max_pages` tries instead of looping.

use futures::stream::{self, Stream};
use serde_json::Value;
use tracing::{info, warn};

use super::client::SoundcloudApi;
use super::models::FollowersPage;
use crate::config::ApiConfig;
use crate::error::Result;
use scgraph_common::types::AccountId;

/// Raw follower records gathered for one artist
#[derive(Debug, Default)]
pub struct FetchedFollowers {
    /// Records of every successful page, in API order
    pub records: Vec<Value>,
    pub pages_fetched: u32,
    pub pages_failed: u32,
}

/// Lazy, single-use page sequence for one artist
pub struct FollowerPaginator<'a, A: ?Sized> {
    api: &'a A,
    artist_id: AccountId,
    cursor: Option<String>,
    max_pages: u32,
    attempts: u32,
    pages_fetched: u32,
    pages_failed: u32,
}

impl<'a, A: SoundcloudApi + ?Sized> FollowerPaginator<'a, A> {
    pub fn new(api: &'a A, config: &ApiConfig, artist_id: AccountId) -> Self {
        Self {
            api,
            artist_id,
            cursor: Some(config.followers_url(artist_id)),
            max_pages: config.max_pages,
            attempts: 0,
            pages_fetched: 0,
            pages_failed: 0,
        }
    }

    /// Fetch attempts made so far, failed ones included
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_none() || self.attempts >= self.max_pages
    }

    /// Fetch the next page
    ///
    /// Returns `None` once the cursor is gone or the attempt budget is spent.
    /// `Some(Err(_))` is a skipped page: the cursor stays put for the next call.
    pub async fn next_page(&mut self) -> Option<Result<Vec<Value>>> {
        if self.is_exhausted() {
            return None;
        }
        let cursor = self.cursor.clone()?;

        self.attempts += 1;
        let page_number = self.attempts;

        match self.fetch(&cursor).await {
            Ok(page) => {
                self.pages_fetched += 1;
                self.cursor = page.cursor().map(str::to_string);
                info!(
                    artist_id = %self.artist_id,
                    page = page_number,
                    records = page.collection.len(),
                    has_next = self.cursor.is_some(),
                    "Fetched followers page"
                );
                Some(Ok(page.collection))
            },
            Err(e) => {
                self.pages_failed += 1;
                warn!(
                    artist_id = %self.artist_id,
                    page = page_number,
                    remaining_attempts = self.max_pages.saturating_sub(self.attempts),
                    error = %e,
                    "Followers page fetch failed, skipping"
                );
                Some(Err(e))
            },
        }
    }

    async fn fetch(&self, cursor: &str) -> Result<FollowersPage> {
        let body = self.api.get_json(cursor).await?;
        FollowersPage::from_value(body)
    }

    /// The remaining pages as a stream
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<Value>>> + 'a
    where
        A: 'a,
    {
        stream::unfold(self, |mut pager| async move {
            pager.next_page().await.map(|page| (page, pager))
        })
    }

    /// Drain the sequence, concatenating successful pages and dropping failed ones
    pub async fn collect_records(mut self) -> FetchedFollowers {
        let mut records = Vec::new();

        while let Some(page) = self.next_page().await {
            if let Ok(mut collection) = page {
                records.append(&mut collection);
            }
        }

        FetchedFollowers {
            records,
            pages_fetched: self.pages_fetched,
            pages_failed: self.pages_failed,
        }
    }
}
