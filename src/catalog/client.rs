use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};

use super::dto::{CatalogProduct, ProductResponse};
use super::error::CatalogError;
use crate::config::CatalogConfig;

/// Product catalog lookup by barcode or product id.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// `Ok(None)` when the catalog answers with no product record. Error
    /// statuses, 404 included, come back as `CatalogError`.
    async fn get_product(
        &self,
        identifier: &str,
        fields: &[&str],
    ) -> Result<Option<CatalogProduct>, CatalogError>;
}

/// Open Food Facts API v2 client.
#[derive(Clone)]
pub struct OpenFoodFactsClient {
    http: Client,
    base_url: Url,
    retries: u32,
    retry_delay: Duration,
}

impl OpenFoodFactsClient {
    pub fn new(cfg: &CatalogConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&cfg.base_url)
            .map_err(|e| anyhow::anyhow!("invalid catalog base url {}: {}", cfg.base_url, e))?;
        let http = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to create HTTP client: {}", e))?;

        Ok(Self {
            http,
            base_url,
            retries: cfg.retries,
            retry_delay: Duration::from_millis(cfg.retry_delay_ms),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET with retries on 429 / 5xx, waiting `retry_delay * (attempt + 1)`
    /// between attempts.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let mut attempt: u32 = 0;
        loop {
            debug!(url = %url, attempt, "catalog request");
            let err = match self.http.get(url.clone()).query(query).send().await {
                Ok(res) if res.status().is_success() => {
                    debug!(url = %url, status = %res.status(), "catalog response");
                    return res.json::<T>().await.map_err(|e| CatalogError::Request {
                        status: None,
                        url: url.to_string(),
                        message: format!("invalid response body: {e}"),
                    });
                }
                Ok(res) => {
                    let status = res.status();
                    let body = res.text().await.unwrap_or_default();
                    CatalogError::Request {
                        status: Some(status.as_u16()),
                        url: url.to_string(),
                        message: truncate(&body, 200),
                    }
                }
                Err(e) => CatalogError::Request {
                    status: e.status().map(|s| s.as_u16()),
                    url: url.to_string(),
                    message: e.to_string(),
                },
            };

            if err.is_retriable() && attempt < self.retries {
                let delay = self.retry_delay * (attempt + 1);
                warn!(url = %url, status = ?err.status(), attempt, delay_ms = delay.as_millis() as u64, "catalog retry");
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            error!(url = %url, status = ?err.status(), "catalog request failed");
            return Err(err);
        }
    }
}

#[async_trait]
impl CatalogLookup for OpenFoodFactsClient {
    #[instrument(skip(self, fields))]
    async fn get_product(
        &self,
        identifier: &str,
        fields: &[&str],
    ) -> Result<Option<CatalogProduct>, CatalogError> {
        let id = identifier.trim();
        if id.is_empty() {
            return Ok(None);
        }

        let file = format!("{id}.json");
        let url = self.endpoint(&["api", "v2", "product", file.as_str()])?;
        let query: Vec<(&str, String)> = if fields.is_empty() {
            Vec::new()
        } else {
            vec![("fields", fields.join(","))]
        };

        let response = self.get_json::<ProductResponse>(url, &query).await?;

        match response.into_product() {
            Some(product) => {
                info!(product_id = %id, code = ?product.code, "catalog product found");
                Ok(Some(product))
            }
            None => {
                info!(product_id = %id, "catalog product not found");
                Ok(None)
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
