//! Domain services
//!
//! Normalization rules and the service traits the application layer is
//! written against.

pub mod crawling_services;
pub mod data_processing_services;
pub mod product_normalizer;
pub mod quantity_rules;
pub mod text_cleaning;

pub use crawling_services::{CategoryCrawlReport, PageFetcher};
pub use data_processing_services::{EmbeddingService, EmbeddingSummary, ProductSink, UploadSummary};
pub use product_normalizer::{NormalizationStats, ProductNormalizer};
