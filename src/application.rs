//! Application layer - use cases over the domain and infrastructure

pub mod run_config;
pub mod scrape_use_cases;

pub use run_config::RunConfig;
pub use scrape_use_cases::{ScrapeOutcome, ScrapeUseCases, normalize_raw_file};
