//! Analytics backend access

mod client;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::InspectRequest;
use crate::domain::Alert;
use crate::error::ApiError;
use crate::modules::PriceQuote;

pub use client::{decode_alerts, decode_prices, ApiClient};

/// Feeds and services the dashboard consumes besides the dataset itself
#[async_trait]
pub trait AnalyticsApi: Send + Sync {
    async fn alerts(&self) -> Result<Vec<Alert>, ApiError>;

    async fn prices(&self) -> Result<BTreeMap<String, PriceQuote>, ApiError>;

    async fn network_analysis(&self) -> Result<Value, ApiError>;

    /// Risk analysis or fund tracing; the report is opaque
    async fn inspect(&self, request: &InspectRequest) -> Result<Value, ApiError>;
}
