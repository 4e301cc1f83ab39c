//! Per-run switches for a scrape

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::infrastructure::config::CrawlConfig;

/// What one scrape run does beyond fetching and normalizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Only the test category, fewer pages, truncated output
    pub test_mode: bool,
    pub embed: bool,
    pub upload: bool,
    pub output_dir: PathBuf,
}

impl RunConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            test_mode: false,
            embed: false,
            upload: false,
            output_dir: output_dir.into(),
        }
    }

    pub fn max_pages(&self, crawl: &CrawlConfig) -> u32 {
        if self.test_mode {
            crawl.test_max_pages
        } else {
            crawl.max_pages
        }
    }

    /// Cap on the final product list, if any
    pub fn product_limit(&self, crawl: &CrawlConfig) -> Option<usize> {
        self.test_mode.then_some(crawl.test_product_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_tightens_limits() {
        let crawl = CrawlConfig::default();
        let mut run = RunConfig::new("out");
        assert_eq!(run.max_pages(&crawl), 50);
        assert_eq!(run.product_limit(&crawl), None);

        run.test_mode = true;
        assert_eq!(run.max_pages(&crawl), 2);
        assert_eq!(run.product_limit(&crawl), Some(5));
    }
}
