//! HTTP client for the analytics backend

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::AnalyticsApi;
use crate::core::InspectRequest;
use crate::domain::Alert;
use crate::error::ApiError;
use crate::modules::PriceQuote;
use crate::store::{DataSource, Dataset};

/// Backend client with a per-request timeout
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path);
        debug!(%url, "GET");
        let request = self.http.get(&url);
        Self::read_json(url, request).await
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        let url = self.endpoint(path);
        debug!(%url, "POST");
        let request = self.http.post(&url).json(&body);
        Self::read_json(url, request).await
    }

    async fn read_json<T: DeserializeOwned>(
        url: String,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => return Err(ApiError::Transport { url, source }),
        };
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { url, status });
        }
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(source) => return Err(ApiError::Transport { url, source }),
        };
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { url, source })
    }

    pub async fn fetch_dataset(&self) -> Result<Dataset, ApiError> {
        self.get_json("/api/data").await
    }

    pub async fn fetch_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        let raw: Value = self.get_json("/api/alerts").await?;
        Ok(decode_alerts(raw))
    }

    pub async fn fetch_prices(&self) -> Result<BTreeMap<String, PriceQuote>, ApiError> {
        let raw: Value = self.get_json("/api/crypto-prices").await?;
        Ok(decode_prices(raw))
    }

    pub async fn fetch_network_analysis(&self) -> Result<Value, ApiError> {
        self.get_json("/api/network-analysis").await
    }

    pub async fn analyze_risk(&self, address: &str) -> Result<Value, ApiError> {
        self.post_json("/api/risk-analysis", json!({ "address": address }))
            .await
    }

    pub async fn trace_funds(&self, address: &str, depth: u32) -> Result<Value, ApiError> {
        self.post_json(
            "/api/fund-tracing",
            json!({ "address": address, "depth": depth }),
        )
        .await
    }
}

#[async_trait]
impl AnalyticsApi for ApiClient {
    async fn alerts(&self) -> Result<Vec<Alert>, ApiError> {
        self.fetch_alerts().await
    }

    async fn prices(&self) -> Result<BTreeMap<String, PriceQuote>, ApiError> {
        self.fetch_prices().await
    }

    async fn network_analysis(&self) -> Result<Value, ApiError> {
        self.fetch_network_analysis().await
    }

    async fn inspect(&self, request: &InspectRequest) -> Result<Value, ApiError> {
        match request {
            InspectRequest::Risk { address } => self.analyze_risk(address).await,
            InspectRequest::Trace { address, depth } => self.trace_funds(address, *depth).await,
        }
    }
}

#[async_trait]
impl DataSource for ApiClient {
    async fn load(&self) -> Result<Dataset> {
        self.fetch_dataset()
            .await
            .with_context(|| format!("loading dataset from {}", self.base_url))
    }

    fn describe(&self) -> String {
        format!("remote {}", self.base_url)
    }
}

/// Decode the alert feed element by element, skipping malformed entries
pub fn decode_alerts(raw: Value) -> Vec<Alert> {
    let Value::Array(items) = raw else {
        warn!("alert feed is not an array, ignoring");
        return Vec::new();
    };
    let mut alerts = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Alert>(item) {
            Ok(alert) => alerts.push(alert),
            Err(err) => warn!(index = idx, error = %err, "skipping malformed alert"),
        }
    }
    alerts
}

/// Decode the price map, skipping assets whose quote does not parse
pub fn decode_prices(raw: Value) -> BTreeMap<String, PriceQuote> {
    let Value::Object(entries) = raw else {
        warn!("price feed is not an object, ignoring");
        return BTreeMap::new();
    };
    entries
        .into_iter()
        .filter_map(|(asset, value)| match serde_json::from_value(value) {
            Ok(quote) => Some((asset, quote)),
            Err(err) => {
                warn!(%asset, error = %err, "skipping malformed quote");
                None
            }
        })
        .collect()
}
