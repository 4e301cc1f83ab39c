//! Application configuration
//!
//! Settings are layered: built-in defaults, then an optional config file
//! (TOML, JSON or YAML, picked by extension), then `GROCERY_SCRAPER_*`
//! environment variables. Nested keys use `__`, e.g.
//! `GROCERY_SCRAPER_CRAWL__PAGE_DELAY_MS=500`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::infrastructure::http_client::HttpClientConfig;
use crate::infrastructure::product_api_client::ProductApiConfig;

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "GROCERY_SCRAPER";

/// Config file looked up when none is given on the command line
pub const DEFAULT_CONFIG_FILE: &str = "config/scraper";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    FileLoad {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Default values
pub mod defaults {
    /// Categories scraped at the same time
    pub const MAX_CONCURRENT_CATEGORIES: usize = 3;

    /// Pause between two pages of one category
    pub const PAGE_DELAY_MS: u64 = 1000;

    /// Page cap per category
    pub const MAX_PAGES: u32 = 50;

    /// Page cap per category in test mode
    pub const TEST_MAX_PAGES: u32 = 2;

    /// Products kept in test mode
    pub const TEST_PRODUCT_LIMIT: usize = 5;

    pub const OUTPUT_DIRECTORY: &str = "output";

    pub const LOG_LEVEL: &str = "info";
}

/// Category crawl behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub max_concurrent_categories: usize,
    pub page_delay_ms: u64,
    pub max_pages: u32,
    pub test_max_pages: u32,
    pub test_product_limit: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_concurrent_categories: defaults::MAX_CONCURRENT_CATEGORIES,
            page_delay_ms: defaults::PAGE_DELAY_MS,
            max_pages: defaults::MAX_PAGES,
            test_max_pages: defaults::TEST_MAX_PAGES,
            test_product_limit: defaults::TEST_PRODUCT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(defaults::OUTPUT_DIRECTORY),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// JSON formatted console output
    pub json_format: bool,

    pub console_output: bool,

    /// Write a daily-rolling log file
    pub file_output: bool,

    /// Log file directory; the user data directory when unset
    pub directory: Option<PathBuf>,

    /// Module-specific levels (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            directory: None,
            module_filters: HashMap::new(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpClientConfig,
    pub crawl: CrawlConfig,
    pub api: ProductApiConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load defaults, the config file and environment overrides.
    ///
    /// An explicit `path` must exist; without one `config/scraper.*` is
    /// used when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file_source = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| {
            Err(ConfigError::Validation {
                message: message.to_string(),
            })
        };

        if self.http.max_requests_per_second == 0 {
            return invalid("http.max_requests_per_second must be greater than 0");
        }
        if self.http.timeout_seconds == 0 {
            return invalid("http.timeout_seconds must be greater than 0");
        }
        if self.crawl.max_concurrent_categories == 0 {
            return invalid("crawl.max_concurrent_categories must be greater than 0");
        }
        if self.crawl.max_pages == 0 || self.crawl.test_max_pages == 0 {
            return invalid("crawl page limits must be greater than 0");
        }
        if self.api.upload_batch_size == Some(0) {
            return invalid("api.upload_batch_size must be greater than 0");
        }
        if self.api.base_url.trim().is_empty() {
            return invalid("api.base_url must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.crawl.max_concurrent_categories, 3);
        assert_eq!(config.crawl.page_delay_ms, 1000);
        assert_eq!(config.crawl.max_pages, 50);
        assert_eq!(config.crawl.test_max_pages, 2);
        assert_eq!(config.crawl.test_product_limit, 5);
        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.api.api_key_env, "JWT_SECRET");
        assert_eq!(config.api.embed_timeout_seconds, 60);
        assert_eq!(config.api.upload_timeout_seconds, 120);
        assert_eq!(config.output.directory, PathBuf::from("output"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[crawl]\npage_delay_ms = 250\n\n[api]\nupload_batch_size = 20\n\n[output]\ndirectory = \"exports\""
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.crawl.page_delay_ms, 250);
        assert_eq!(config.crawl.max_pages, 50);
        assert_eq!(config.api.upload_batch_size, Some(20));
        assert_eq!(config.output.directory, PathBuf::from("exports"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/scraper.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileLoad { .. }));
    }

    #[test]
    fn validation_rejects_zero_limits() {
        let mut config = AppConfig::default();
        config.crawl.max_concurrent_categories = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation { .. })));

        let mut config = AppConfig::default();
        config.api.upload_batch_size = Some(0);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.http.max_requests_per_second = 0;
        assert!(config.validate().is_err());
    }
}
