//! Core entities: nodes, transactions and alerts

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Kind of blockchain participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Exchange,
    Wallet,
    Contract,
    Pool,
    /// Anything the feed labels outside the known set (mixer, phishing, ...)
    #[serde(other)]
    Unknown,
}

impl NodeType {
    pub fn label(&self) -> &'static str {
        match self {
            NodeType::Exchange => "exchange",
            NodeType::Wallet => "wallet",
            NodeType::Contract => "contract",
            NodeType::Pool => "pool",
            NodeType::Unknown => "unknown",
        }
    }
}

/// A blockchain participant. `id` is the join key for transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default)]
    pub is_critical: bool,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            is_critical: false,
        }
    }

    pub fn critical(mut self) -> Self {
        self.is_critical = true;
        self
    }
}

/// A directed value transfer between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub source: String,
    pub target: String,
    pub amount: f64,
    #[serde(deserialize_with = "de_unix_seconds")]
    pub timestamp: i64,
    /// Set by the external risk process, never computed here
    #[serde(default)]
    pub is_flagged: bool,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        amount: f64,
        timestamp: i64,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            amount,
            timestamp,
            is_flagged: false,
        }
    }

    pub fn flagged(mut self) -> Self {
        self.is_flagged = true;
        self
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Feeds emit both integer and fractional epoch seconds.
fn de_unix_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("timestamp is not finite"));
    }
    Ok(value.trunc() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" | "med" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// Value stored in an alert's free-form `data` bag.
///
/// Scalars are kept as-is, anything nested is preserved as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlertValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(serde_json::Value),
}

impl fmt::Display for AlertValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertValue::Bool(value) => write!(f, "{value}"),
            AlertValue::Int(value) => write!(f, "{value}"),
            AlertValue::Float(value) => write!(f, "{value}"),
            AlertValue::Text(value) => f.write_str(value),
            AlertValue::Json(value) => write!(f, "{value}"),
        }
    }
}

/// Externally-sourced risk notice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "de_unix_seconds")]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, AlertValue>>,
}

impl Alert {
    /// `rapid_transactions` -> `rapid transactions`
    pub fn kind_label(&self) -> String {
        self.kind.replace('_', " ")
    }
}
