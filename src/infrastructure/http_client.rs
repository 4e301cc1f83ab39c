//! HTTP client for listing pages with rate limiting and retries
//!
//! Every request waits on a shared `governor` limiter. Retryable failures
//! (network errors, 408, 429 and 5xx) are retried with exponential backoff,
//! honoring `Retry-After` when the server sends one.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, direct::NotKeyed},
};
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::services::PageFetcher;
use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};

/// HTTP client configuration for crawling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_requests_per_second: u32,
    /// Total attempts per request, including the first
    pub max_retries: u32,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) grocery-price-scraper/0.2".to_string(),
            timeout_seconds: 30,
            max_requests_per_second: 2,
            max_retries: 3,
            follow_redirects: true,
        }
    }
}

/// Rate-limited, retrying page fetcher
pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.max_requests_per_second)
                .context("Rate limit must be greater than 0")?,
        );

        Ok(Self {
            client,
            rate_limiter: RateLimiter::direct(quota),
            config,
        })
    }

    /// Fetch `url` as text, retrying recoverable failures
    pub async fn get_text(&self, url: &str) -> ParsingResult<String> {
        Url::parse(url).map_err(|e| ParsingError::UrlResolutionFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let attempts = self.config.max_retries.max(1);
        let mut attempt = 1;
        loop {
            self.rate_limiter.until_ready().await;
            info!("🌐 GET (attempt {}/{}): {}", attempt, attempts, url);

            let error = match self.get_text_once(url).await {
                Ok(text) => {
                    debug!("Fetched {} ({} chars)", url, text.len());
                    return Ok(text);
                }
                Err(error) => error,
            };

            if !error.is_recoverable() || attempt >= attempts {
                warn!("❌ Giving up on {} after {} attempt(s): {}", url, attempt, error);
                return Err(error);
            }

            let delay = backoff_delay(attempt, error.retry_delay_seconds());
            warn!("⚠️ Attempt {} failed for {}: {} (retrying in {:?})", attempt, url, error, delay);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn get_text_once(&self, url: &str) -> ParsingResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ParsingError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(url, status, &response));
        }

        response.text().await.map_err(|e| ParsingError::network(url, e))
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        Ok(self.get_text(url).await?)
    }
}

fn status_error(url: &str, status: StatusCode, response: &Response) -> ParsingError {
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());

    match (status, retry_after) {
        (StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE, Some(seconds)) => {
            ParsingError::RateLimitExceeded {
                retry_after_seconds: seconds,
                url: url.to_string(),
            }
        }
        (StatusCode::TOO_MANY_REQUESTS, None) => ParsingError::RateLimitExceeded {
            retry_after_seconds: 0,
            url: url.to_string(),
        },
        _ => ParsingError::HttpRequestFailed {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("unknown").to_string(),
            url: url.to_string(),
        },
    }
}

/// `2^(attempt-1)` seconds, raised to the server's hint when it asks for longer
fn backoff_delay(attempt: u32, server_hint_seconds: Option<u64>) -> Duration {
    let exponential = 2_u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_secs(server_hint_seconds.map_or(exponential, |hint| hint.max(exponential)))
}
