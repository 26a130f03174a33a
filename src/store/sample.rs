//! Deterministic sample network used when no remote source is configured

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use super::{DataSource, Dataset};
use crate::domain::{Node, NodeType, Transaction};

/// Build the fixed sample dataset, timestamps relative to `now` (epoch seconds)
pub fn sample_dataset(now: i64) -> Dataset {
    let nodes = vec![
        Node::new("0x1a2b3c", "Exchange Hub", NodeType::Exchange).critical(),
        Node::new("0x4d5e6f", "Whale Wallet", NodeType::Wallet).critical(),
        Node::new("0x7g8h9i", "DAO Treasury", NodeType::Contract),
        Node::new("0xjklmno", "Miner Pool A", NodeType::Pool).critical(),
        Node::new("0xpqrstu", "Retail Wallet 1", NodeType::Wallet),
        Node::new("0xvwxyz0", "Token Project", NodeType::Contract),
        Node::new("0x112233", "Unknown Source", NodeType::Unknown).critical(),
        Node::new("0x445566", "Market Maker", NodeType::Exchange),
    ];

    let transactions = vec![
        Transaction::new("tx_001", "0x1a2b3c", "0x4d5e6f", 125.5, now - 3600),
        Transaction::new("tx_002", "0x4d5e6f", "0x7g8h9i", 89.2, now - 3000),
        Transaction::new("tx_003", "0x7g8h9i", "0xjklmno", 45.1, now - 2400),
        Transaction::new("tx_004", "0xjklmno", "0xpqrstu", 12.3, now - 1800),
        Transaction::new("tx_005", "0xpqrstu", "0xvwxyz0", 8.7, now - 1200),
        Transaction::new("tx_006", "0xvwxyz0", "0x1a2b3c", 25.0, now - 600),
        Transaction::new("tx_007", "0x112233", "0x4d5e6f", 200.0, now - 300).flagged(),
        Transaction::new("tx_008", "0x4d5e6f", "0x445566", 150.0, now - 150).flagged(),
        Transaction::new("tx_009", "0x445566", "0x112233", 180.0, now).flagged(),
        Transaction::new("tx_010", "0x1a2b3c", "0xpqrstu", 5.5, now - 900),
    ];

    Dataset {
        nodes,
        transactions,
    }
}

/// Local generator with an optional artificial delay before the data appears
#[derive(Debug, Clone, Default)]
pub struct LocalGenerator {
    pub delay: Duration,
}

impl LocalGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl DataSource for LocalGenerator {
    async fn load(&self) -> Result<Dataset> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(sample_dataset(chrono::Utc::now().timestamp()))
    }

    fn describe(&self) -> String {
        "local sample".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Snapshot;

    #[test]
    fn test_sample_is_consistent() {
        let snapshot = Snapshot::build(1, sample_dataset(1_700_000_000)).unwrap();
        assert_eq!(snapshot.nodes().len(), 8);
        assert_eq!(snapshot.transactions().len(), 10);
        assert!(snapshot.integrity().is_clean());
        let flagged = snapshot.transactions().iter().filter(|tx| tx.is_flagged).count();
        assert_eq!(flagged, 3);
    }

    #[test]
    fn test_sample_is_deterministic() {
        let a = sample_dataset(42);
        let b = sample_dataset(42);
        assert_eq!(a.nodes, b.nodes);
        assert_eq!(a.transactions, b.transactions);
    }

    #[tokio::test]
    async fn test_local_generator_loads() {
        let source = LocalGenerator::default();
        let dataset = source.load().await.unwrap();
        assert_eq!(dataset.nodes.len(), 8);
    }
}
