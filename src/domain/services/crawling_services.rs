//! Crawling service traits
//!
//! Seams between the scrape pipeline and the network. The pipeline only
//! talks to these traits so it can be driven by in-memory fakes in tests.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Fetches rendered listing pages
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// HTML body of `url`
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// Outcome of scraping one category across its pages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCrawlReport {
    pub category_url: String,
    pub pages_fetched: u32,
    pub raw_products: usize,
    /// Set when the category stopped on an error rather than an empty page
    pub error: Option<String>,
}

impl CategoryCrawlReport {
    pub fn new(category_url: impl Into<String>) -> Self {
        Self {
            category_url: category_url.into(),
            ..Self::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}
