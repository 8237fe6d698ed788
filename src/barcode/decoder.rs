use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Pulls a barcode string out of image bytes.
#[async_trait]
pub trait BarcodeDecoder: Send + Sync {
    async fn decode(&self, image: &[u8]) -> anyhow::Result<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct DecodeResponse {
    #[serde(default)]
    results: Vec<DecodedSymbol>,
}

#[derive(Debug, Deserialize)]
struct DecodedSymbol {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    format: Option<String>,
}

/// Sends images to a barcode decoding service and picks the most
/// product-like symbol from its answer.
#[derive(Clone)]
pub struct HttpBarcodeDecoder {
    http: Client,
    endpoint: String,
}

impl HttpBarcodeDecoder {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("build barcode decoder http client")?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl BarcodeDecoder for HttpBarcodeDecoder {
    async fn decode(&self, image: &[u8]) -> anyhow::Result<Option<String>> {
        debug!(bytes = image.len(), "decoding barcode image");
        let res = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(Bytes::copy_from_slice(image))
            .send()
            .await
            .context("barcode decoder request")?
            .error_for_status()
            .context("barcode decoder status")?;
        let body: DecodeResponse = res.json().await.context("barcode decoder response")?;

        let texts: Vec<String> = body
            .results
            .iter()
            .filter_map(|r| r.text.as_deref().map(str::trim))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        let Some(barcode) = pick_best_barcode(&texts) else {
            info!("no barcode found in image");
            return Ok(None);
        };
        let format = body
            .results
            .iter()
            .find(|r| r.text.as_deref().map(str::trim) == Some(barcode.as_str()))
            .and_then(|r| r.format.clone());
        info!(%barcode, format = ?format, "barcode found in image");
        Ok(Some(barcode))
    }
}

/// Used when no decoder service is configured: every image reads as empty.
pub struct UnavailableDecoder;

#[async_trait]
impl BarcodeDecoder for UnavailableDecoder {
    async fn decode(&self, _image: &[u8]) -> anyhow::Result<Option<String>> {
        warn!("image received but no barcode decoder is configured");
        Ok(None)
    }
}

fn is_likely_product_barcode(text: &str) -> bool {
    lazy_static! {
        static ref PRODUCT_CODE_RE: Regex =
            Regex::new(r"^([0-9]{8}|[0-9]{12}|[0-9]{13}|[0-9]{14})$").unwrap();
    }
    PRODUCT_CODE_RE.is_match(text)
}

/// First EAN/UPC/GTIN-shaped text, else the first text at all.
pub fn pick_best_barcode(texts: &[String]) -> Option<String> {
    texts
        .iter()
        .find(|t| is_likely_product_barcode(t))
        .or_else(|| texts.first())
        .cloned()
}
