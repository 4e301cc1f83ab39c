//! Grocery Price Scraper
//!
//! Scrapes supermarket category listings (Cold Storage, FairPrice,
//! Sheng Siong), normalizes the product tiles into one record shape,
//! and exports them to CSV/JSON or uploads them to the product backend.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{RunConfig, ScrapeOutcome, ScrapeUseCases};
pub use domain::{ProductRecord, RawProduct, SiteProfile, Supermarket};
pub use domain::services::ProductNormalizer;
