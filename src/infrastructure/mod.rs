//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - HTTP access to the analytics backend
//! - Tokio runtime bridge for async operations

pub mod api;
pub mod runtime;

pub use api::{AnalyticsApi, ApiClient};
pub use runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent, WorkerConfig};
