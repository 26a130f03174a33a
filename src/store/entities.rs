//! Entity Store - the canonical nodes and transactions of one dashboard session

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::domain::{Node, Transaction};
use crate::error::StoreError;

/// Raw `{nodes, transactions}` payload as produced by a data source
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Problems found while building a snapshot, reported once per load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrityReport {
    /// Transaction ids whose source or target is not a known node
    pub dangling: Vec<String>,
    /// Transaction ids with a negative or non-finite amount
    pub invalid_amount: Vec<String>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty() && self.invalid_amount.is_empty()
    }

    pub fn dropped(&self) -> usize {
        self.dangling.len() + self.invalid_amount.len()
    }

    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.dangling.is_empty() {
            parts.push(format!(
                "{} with unknown endpoints",
                self.dangling.len()
            ));
        }
        if !self.invalid_amount.is_empty() {
            parts.push(format!(
                "{} with invalid amounts",
                self.invalid_amount.len()
            ));
        }
        format!("Ignored {} transaction(s): {}", self.dropped(), parts.join(", "))
    }
}

/// Immutable, internally-consistent view of a loaded dataset.
///
/// Every transaction kept here resolves both endpoints and has `amount >= 0`.
#[derive(Debug, Clone)]
pub struct Snapshot {
    version: u64,
    nodes: Vec<Node>,
    transactions: Vec<Transaction>,
    index: HashMap<String, usize>,
    integrity: IntegrityReport,
}

impl Snapshot {
    pub fn build(version: u64, dataset: Dataset) -> Result<Self, StoreError> {
        let Dataset {
            nodes,
            transactions,
        } = dataset;

        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(StoreError::DuplicateNode(node.id.clone()));
            }
        }

        let mut integrity = IntegrityReport::default();
        let mut kept = Vec::with_capacity(transactions.len());
        for tx in transactions {
            if !tx.amount.is_finite() || tx.amount < 0.0 {
                integrity.invalid_amount.push(tx.id);
                continue;
            }
            if !index.contains_key(&tx.source) || !index.contains_key(&tx.target) {
                integrity.dangling.push(tx.id);
                continue;
            }
            kept.push(tx);
        }

        Ok(Self {
            version,
            nodes,
            transactions: kept,
            index,
            integrity,
        })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Nodes in load order; the order drives the graph layout
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).and_then(|&i| self.nodes.get(i))
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == id)
    }

    pub fn integrity(&self) -> &IntegrityReport {
        &self.integrity
    }

    /// Node ids touched by at least one transaction
    pub fn active_node_ids(&self) -> HashSet<&str> {
        self.transactions
            .iter()
            .flat_map(|tx| [tx.source.as_str(), tx.target.as_str()])
            .collect()
    }
}

/// Load state of the store as seen by consumers
#[derive(Debug, Clone, Default)]
pub enum EntityStore {
    /// Nothing requested yet
    #[default]
    Empty,
    Loading,
    Loaded(Snapshot),
    /// Population failed; stays here until a new session is opened
    Failed(String),
}

impl EntityStore {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            EntityStore::Loaded(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, EntityStore::Loading)
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            EntityStore::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeType;

    fn nodes() -> Vec<Node> {
        vec![
            Node::new("A", "Alpha", NodeType::Wallet),
            Node::new("B", "Beta", NodeType::Exchange),
            Node::new("C", "Gamma", NodeType::Pool),
        ]
    }

    #[test]
    fn test_snapshot_keeps_valid_transactions_in_order() {
        let dataset = Dataset {
            nodes: nodes(),
            transactions: vec![
                Transaction::new("t1", "A", "B", 10.0, 1),
                Transaction::new("t2", "B", "C", 5.0, 2),
            ],
        };
        let snapshot = Snapshot::build(1, dataset).unwrap();
        assert_eq!(snapshot.nodes().len(), 3);
        let ids: Vec<&str> = snapshot.transactions().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
        assert!(snapshot.integrity().is_clean());
        assert_eq!(snapshot.node("B").map(|n| n.name.as_str()), Some("Beta"));
    }

    #[test]
    fn test_snapshot_ignores_dangling_and_negative() {
        let dataset = Dataset {
            nodes: nodes(),
            transactions: vec![
                Transaction::new("t1", "A", "B", 10.0, 1),
                Transaction::new("t2", "A", "Z", 5.0, 2),
                Transaction::new("t3", "B", "C", -1.0, 3),
                Transaction::new("t4", "B", "C", f64::NAN, 4),
            ],
        };
        let snapshot = Snapshot::build(1, dataset).unwrap();
        assert_eq!(snapshot.transactions().len(), 1);
        let report = snapshot.integrity();
        assert_eq!(report.dangling, vec!["t2".to_string()]);
        assert_eq!(report.invalid_amount, vec!["t3".to_string(), "t4".to_string()]);
        assert_eq!(report.dropped(), 3);
        assert!(report.summary().contains("3 transaction(s)"));
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut dup = nodes();
        dup.push(Node::new("A", "Alpha again", NodeType::Wallet));
        let err = Snapshot::build(1, Dataset { nodes: dup, transactions: vec![] }).unwrap_err();
        assert_eq!(err, StoreError::DuplicateNode("A".to_string()));
    }

    #[test]
    fn test_empty_dataset_loads() {
        let snapshot = Snapshot::build(1, Dataset::default()).unwrap();
        assert!(snapshot.nodes().is_empty());
        assert!(snapshot.transactions().is_empty());
        assert!(snapshot.integrity().is_clean());
        assert!(snapshot.node("A").is_none());
    }

    #[test]
    fn test_store_state_accessors() {
        let store = EntityStore::Loading;
        assert!(store.is_loading());
        assert!(store.snapshot().is_none());

        let store = EntityStore::Failed("boom".to_string());
        assert_eq!(store.failure(), Some("boom"));
        assert!(store.snapshot().is_none());
    }
}
