//! Client for the product backend: text embeddings and batched upload

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::product::ProductRecord;
use crate::domain::services::{EmbeddingService, ProductSink};

const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} answered {status}: {body}")]
    Rejected {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Failed to build API client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection settings for the product backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductApiConfig {
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Overrides the site's batch size when set
    pub upload_batch_size: Option<usize>,
    pub upload_batch_delay_ms: u64,
    pub embed_timeout_seconds: u64,
    pub upload_timeout_seconds: u64,
}

impl Default for ProductApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            api_key_env: "JWT_SECRET".to_string(),
            upload_batch_size: None,
            upload_batch_delay_ms: 1000,
            embed_timeout_seconds: 60,
            upload_timeout_seconds: 120,
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

pub struct ProductApiClient {
    client: Client,
    config: ProductApiConfig,
    api_key: String,
}

impl ProductApiClient {
    /// Client whose API key is read from `config.api_key_env`
    pub fn from_env(config: ProductApiConfig) -> Result<Self, ApiError> {
        let api_key = std::env::var(&config.api_key_env).unwrap_or_else(|_| {
            warn!("{} is not set, backend requests will be unauthenticated", config.api_key_env);
            String::new()
        });
        Self::new(config, api_key)
    }

    pub fn new(config: ProductApiConfig, api_key: impl Into<String>) -> Result<Self, ApiError> {
        Ok(Self {
            client: Client::builder().build()?,
            config,
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn post_json<T: Serialize + ?Sized + Sync>(
        &self,
        endpoint: &str,
        body: &T,
        timeout_seconds: u64,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self
            .client
            .post(endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(Duration::from_secs(timeout_seconds))
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Rejected {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// POST `/products/embed-text`; `None` when the answer has no vector
    pub async fn embed(&self, text: &str) -> Result<Option<Vec<f32>>, ApiError> {
        let endpoint = self.endpoint("/products/embed-text");
        let response = self
            .post_json(&endpoint, &EmbedRequest { text }, self.config.embed_timeout_seconds)
            .await?;
        let parsed: EmbedResponse = response.json().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;
        debug!("Embedding for '{}': {} dims", text, parsed.embedding.as_ref().map_or(0, Vec::len));
        Ok(parsed.embedding)
    }

    /// POST one batch to `/products/upload`
    pub async fn upload(&self, batch: &[ProductRecord]) -> Result<(), ApiError> {
        let endpoint = self.endpoint("/products/upload");
        self.post_json(&endpoint, batch, self.config.upload_timeout_seconds)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl EmbeddingService for ProductApiClient {
    async fn embed_text(&self, text: &str) -> anyhow::Result<Option<Vec<f32>>> {
        Ok(self.embed(text).await?)
    }
}

#[async_trait]
impl ProductSink for ProductApiClient {
    async fn upload_batch(&self, batch: &[ProductRecord]) -> anyhow::Result<()> {
        Ok(self.upload(batch).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// One-shot server answering with `response`; returns the base URL and the raw request
    async fn serve_once(
        response: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0_u8; 4096];
            // Read headers and body; the test bodies are small
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some((head, body)) = text.split_once("\r\n\r\n") {
                    let length = head
                        .lines()
                        .find_map(|line| {
                            let line = line.to_lowercase();
                            line.strip_prefix("content-length:")
                                .and_then(|v| v.trim().parse::<usize>().ok())
                        })
                        .unwrap_or(0);
                    if body.len() >= length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).to_string()
        });
        (format!("http://{addr}"), handle)
    }

    fn client(base_url: String) -> ProductApiClient {
        let config = ProductApiConfig {
            base_url,
            ..ProductApiConfig::default()
        };
        ProductApiClient::new(config, "secret").unwrap()
    }

    #[tokio::test]
    async fn embed_posts_text_with_api_key() {
        let (base, request) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 25\r\nConnection: close\r\n\r\n{\"embedding\":[0.5,-1.0]}\n",
        )
        .await;

        let vector = client(base).embed("Milk 1 L $2.50").await.unwrap();
        assert_eq!(vector, Some(vec![0.5, -1.0]));

        let request = request.await.unwrap().to_lowercase();
        assert!(request.starts_with("post /products/embed-text"));
        assert!(request.contains("x-api-key: secret"));
        assert!(request.contains(r#"{"text":"milk 1 l $2.50"}"#));
    }

    #[tokio::test]
    async fn rejected_upload_reports_status() {
        let (base, _request) = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\nboom",
        )
        .await;

        let err = client(base).upload(&[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected { status: 500, ref body, .. } if body == "boom"));
    }

    #[tokio::test]
    async fn sink_errors_keep_the_api_error() {
        let (base, _request) = serve_once(
            "HTTP/1.1 401 Unauthorized\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let err = client(base).upload_batch(&[]).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::Rejected { status: 401, .. })
        ));
    }
}
