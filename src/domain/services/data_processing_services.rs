//! Post-processing service traits: embeddings and product upload

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductRecord;

/// Produces an embedding vector for a product description
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// `Ok(None)` means the service answered without a usable vector
    async fn embed_text(&self, text: &str) -> Result<Option<Vec<f32>>>;
}

/// Receives normalized products, one batch at a time
#[async_trait]
pub trait ProductSink: Send + Sync {
    async fn upload_batch(&self, batch: &[ProductRecord]) -> Result<()>;
}

/// Result of uploading a product list in batches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub uploaded: usize,
    pub total: usize,
    /// 1-based indices of the batches that were rejected
    pub failed_batches: Vec<usize>,
}

impl UploadSummary {
    pub fn is_complete(&self) -> bool {
        self.failed_batches.is_empty() && self.uploaded == self.total
    }
}

/// Counts for one embedding pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingSummary {
    pub embedded: usize,
    pub missing: usize,
    pub failed: usize,
}
