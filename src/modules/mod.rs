//! Stateful dashboard modules that live beside the entity store
//!
//! - alerts: the locally-dismissable alert list
//! - metrics: price quotes and network metrics from the periodic refresh

pub mod alerts;
pub mod metrics;

pub use alerts::{AlertState, SeverityCounts, SeverityFilter};
pub use metrics::{PriceBoard, PriceQuote};
