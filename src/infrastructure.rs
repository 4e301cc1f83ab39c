//! Infrastructure layer: network, HTML parsing, files, config and logging

pub mod config;
pub mod export;
pub mod http_client;
pub mod logging;
pub mod parsing;
pub mod parsing_error;
pub mod product_api_client;

pub use self::config::{AppConfig, ConfigError, CrawlConfig, LoggingConfig, OutputConfig};
pub use export::{ExportError, ExportPaths, export_products, read_json};
pub use http_client::{HttpClient, HttpClientConfig};
pub use parsing::SelectorExtractor;
pub use parsing_error::{ParsingError, ParsingResult};
pub use product_api_client::{ApiError, ProductApiClient, ProductApiConfig};
