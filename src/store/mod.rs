mod entities;
mod sample;

pub use entities::{Dataset, EntityStore, IntegrityReport, Snapshot};
pub use sample::{sample_dataset, LocalGenerator};

use anyhow::Result;
use async_trait::async_trait;

/// Anything that can produce a full `{nodes, transactions}` dataset
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn load(&self) -> Result<Dataset>;

    /// Short description for logs and the status line
    fn describe(&self) -> String;
}
