//! Scrape use cases
//!
//! Orchestrates one retailer run: crawl categories page by page, normalize,
//! optionally embed, export to disk and optionally upload. The network sits
//! behind the `PageFetcher`, `EmbeddingService` and `ProductSink` traits.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::application::run_config::RunConfig;
use crate::domain::product::{ProductRecord, RawProduct};
use crate::domain::services::{
    CategoryCrawlReport, EmbeddingService, EmbeddingSummary, PageFetcher, ProductNormalizer,
    ProductSink, UploadSummary,
};
use crate::domain::site_profile::SiteProfile;
use crate::infrastructure::config::CrawlConfig;
use crate::infrastructure::export::{self, ExportPaths};
use crate::infrastructure::parsing::SelectorExtractor;

/// Everything a run produced
#[derive(Debug, Clone, Default)]
pub struct ScrapeOutcome {
    pub products: Vec<ProductRecord>,
    pub categories: Vec<CategoryCrawlReport>,
    pub embedding: Option<EmbeddingSummary>,
    pub export: Option<ExportPaths>,
    pub upload: Option<UploadSummary>,
}

impl ScrapeOutcome {
    pub fn failed_categories(&self) -> usize {
        self.categories.iter().filter(|c| c.is_failed()).count()
    }
}

struct UploadTarget {
    sink: Arc<dyn ProductSink>,
    batch_size: usize,
    batch_delay: Duration,
}

pub struct ScrapeUseCases {
    profile: SiteProfile,
    crawl: CrawlConfig,
    extractor: SelectorExtractor,
    fetcher: Arc<dyn PageFetcher>,
    embedder: Option<Arc<dyn EmbeddingService>>,
    upload: Option<UploadTarget>,
}

impl ScrapeUseCases {
    pub fn new(profile: SiteProfile, crawl: CrawlConfig, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        let extractor = SelectorExtractor::new(&profile.schema)
            .with_context(|| format!("Invalid extraction schema for {}", profile.supermarket))?;
        Ok(Self {
            profile,
            crawl,
            extractor,
            fetcher,
            embedder: None,
            upload: None,
        })
    }

    pub fn with_embedding_service(mut self, embedder: Arc<dyn EmbeddingService>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Upload through `sink`; `batch_size` overrides the site's batch size
    pub fn with_product_sink(
        mut self,
        sink: Arc<dyn ProductSink>,
        batch_size: Option<usize>,
        batch_delay: Duration,
    ) -> Self {
        self.upload = Some(UploadTarget {
            sink,
            batch_size: batch_size.unwrap_or(self.profile.upload_batch_size).max(1),
            batch_delay,
        });
        self
    }

    /// Full run: scrape, embed, export, upload
    pub async fn run(&self, run: &RunConfig) -> Result<ScrapeOutcome> {
        info!(
            "🚀 Starting {} scrape (test mode: {}, embed: {}, upload: {})",
            self.profile.supermarket, run.test_mode, run.embed, run.upload
        );

        let (mut products, categories) = self.scrape(run).await;
        let mut outcome = ScrapeOutcome {
            categories,
            ..ScrapeOutcome::default()
        };

        if run.embed {
            outcome.embedding = Some(self.attach_embeddings(&mut products).await?);
        }

        outcome.export = export::export_products(&products, &run.output_dir, self.profile.supermarket)
            .context("Failed to export products")?;

        if run.upload {
            outcome.upload = Some(self.upload(&products).await?);
        }

        info!(
            "✅ {} run finished: {} products, {} failed categories",
            self.profile.supermarket,
            products.len(),
            outcome.failed_categories()
        );
        outcome.products = products;
        Ok(outcome)
    }

    /// Crawl every category concurrently and normalize the combined output
    pub async fn scrape(&self, run: &RunConfig) -> (Vec<ProductRecord>, Vec<CategoryCrawlReport>) {
        let categories: Vec<&str> = if run.test_mode {
            vec![self.profile.test_category_url.as_str()]
        } else {
            self.profile.category_urls.iter().map(String::as_str).collect()
        };
        let max_pages = run.max_pages(&self.crawl);
        let semaphore = Arc::new(Semaphore::new(self.crawl.max_concurrent_categories.max(1)));

        info!(
            "📂 Crawling {} categories (max {} pages each, {} at a time)",
            categories.len(),
            max_pages,
            self.crawl.max_concurrent_categories
        );

        let results = join_all(categories.into_iter().map(|url| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                // The semaphore is never closed.
                let _permit = semaphore.acquire_owned().await.ok();
                self.crawl_category(url, max_pages).await
            }
        }))
        .await;

        let mut raw_products = Vec::new();
        let mut reports = Vec::with_capacity(results.len());
        for (raw, report) in results {
            raw_products.extend(raw);
            reports.push(report);
        }

        let (mut products, stats) = ProductNormalizer::new(&self.profile).normalize_with_stats(&raw_products);
        info!(
            "🧹 {} raw entries → {} products ({} duplicates, {} fallback URLs)",
            stats.received, stats.accepted, stats.duplicates, stats.fallback_urls
        );

        if let Some(limit) = run.product_limit(&self.crawl) {
            if products.len() > limit {
                info!("🧪 Test mode: keeping first {} of {} products", limit, products.len());
                products.truncate(limit);
            }
        }
        (products, reports)
    }

    /// Raw products of one category, following pagination until a page
    /// fails or comes back empty
    pub async fn crawl_category(&self, category_url: &str, max_pages: u32) -> (Vec<RawProduct>, CategoryCrawlReport) {
        let mut report = CategoryCrawlReport::new(category_url);
        let mut raw_products = Vec::new();
        let delay = Duration::from_millis(self.crawl.page_delay_ms);

        for page in 1..=max_pages {
            let Some(page_url) = self.profile.pagination.page_url(category_url, page) else {
                break;
            };

            let html = match self.fetcher.fetch_page(&page_url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("❌ Failed to fetch {}: {}", page_url, e);
                    report.error = Some(e.to_string());
                    break;
                }
            };
            report.pages_fetched += 1;

            let page_products = self.extractor.extract(&html);
            if page_products.is_empty() {
                debug!("No products on {}, stopping pagination", page_url);
                break;
            }
            info!("📄 {} products on {}", page_products.len(), page_url);
            raw_products.extend(page_products);

            if page < max_pages && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        report.raw_products = raw_products.len();
        (raw_products, report)
    }

    /// Fill `embedding` for each product; failures leave it `None`
    pub async fn attach_embeddings(&self, products: &mut [ProductRecord]) -> Result<EmbeddingSummary> {
        let embedder = self
            .embedder
            .as_ref()
            .ok_or_else(|| anyhow!("Embedding requested but no embedding service configured"))?;

        let mut summary = EmbeddingSummary::default();
        info!("🧠 Generating embeddings for {} products", products.len());
        for product in products.iter_mut() {
            let text = product.embedding_input();
            match embedder.embed_text(&text).await {
                Ok(Some(vector)) => {
                    product.embedding = Some(vector);
                    summary.embedded += 1;
                }
                Ok(None) => {
                    warn!("No embedding returned for '{}'", product.name);
                    summary.missing += 1;
                }
                Err(e) => {
                    warn!("Embedding failed for '{}': {}", product.name, e);
                    summary.failed += 1;
                }
            }
        }
        info!(
            "🧠 Embeddings: {} ok, {} missing, {} failed",
            summary.embedded, summary.missing, summary.failed
        );
        Ok(summary)
    }

    /// Upload in batches; a rejected batch is logged and skipped
    pub async fn upload(&self, products: &[ProductRecord]) -> Result<UploadSummary> {
        let target = self
            .upload
            .as_ref()
            .ok_or_else(|| anyhow!("Upload requested but no product sink configured"))?;

        let mut summary = UploadSummary {
            total: products.len(),
            ..UploadSummary::default()
        };
        if products.is_empty() {
            warn!("No products to upload");
            return Ok(summary);
        }

        let batches: Vec<&[ProductRecord]> = products.chunks(target.batch_size).collect();
        let batch_count = batches.len();
        for (index, batch) in batches.into_iter().enumerate() {
            let number = index + 1;
            match target.sink.upload_batch(batch).await {
                Ok(()) => {
                    summary.uploaded += batch.len();
                    info!("📤 Uploaded batch {}/{} ({} products)", number, batch_count, batch.len());
                }
                Err(e) => {
                    warn!("❌ Batch {}/{} failed: {}", number, batch_count, e);
                    summary.failed_batches.push(number);
                }
            }
            if number < batch_count && !target.batch_delay.is_zero() {
                tokio::time::sleep(target.batch_delay).await;
            }
        }

        info!("📤 Uploaded {}/{} products", summary.uploaded, summary.total);
        Ok(summary)
    }
}

/// Normalize a JSON file of raw products and export the result
pub fn normalize_raw_file(
    profile: &SiteProfile,
    input: &Path,
    output_dir: &Path,
) -> Result<(Vec<ProductRecord>, Option<ExportPaths>)> {
    let raw: Vec<RawProduct> = export::read_json(input)
        .with_context(|| format!("Failed to read raw products from {}", input.display()))?;
    let products = ProductNormalizer::new(profile).normalize(&raw);
    info!("🧹 {} raw entries → {} products", raw.len(), products.len());

    let paths = export::export_products(&products, output_dir, profile.supermarket)
        .context("Failed to export products")?;
    Ok((products, paths))
}
