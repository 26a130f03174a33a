//! Derived view pipeline
//!
//! Three pure stages run in a fixed order over the snapshot's transactions:
//! text filter, then wallet filter, then aggregation. Results are expressed
//! as indices into the snapshot so a cached view never borrows from it.

use crate::domain::Transaction;
use crate::store::Snapshot;

/// Aggregate figures over the wallet-filtered set
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransactionStats {
    pub total_volume: f64,
    pub total_transactions: usize,
    pub avg_transaction: f64,
    pub flagged_count: usize,
}

impl TransactionStats {
    pub fn legitimate_count(&self) -> usize {
        self.total_transactions.saturating_sub(self.flagged_count)
    }
}

/// Case-insensitive substring match on source, target or id.
/// `needle` must already be lowercased.
fn matches_query(tx: &Transaction, needle: &str) -> bool {
    needle.is_empty()
        || tx.source.to_lowercase().contains(needle)
        || tx.target.to_lowercase().contains(needle)
        || tx.id.to_lowercase().contains(needle)
}

fn matches_wallet(tx: &Transaction, wallet: Option<&str>) -> bool {
    wallet.map_or(true, |id| tx.touches(id))
}

/// A filter stage input: a bare transaction, or one tagged with its index
pub trait TransactionRow: Copy {
    fn transaction(&self) -> &Transaction;
}

impl TransactionRow for &Transaction {
    fn transaction(&self) -> &Transaction {
        self
    }
}

impl TransactionRow for (usize, &Transaction) {
    fn transaction(&self) -> &Transaction {
        self.1
    }
}

/// Stage 1: keep rows whose source, target or id contains `query`
pub fn text_filter<I>(rows: I, query: &str) -> Vec<I::Item>
where
    I: IntoIterator,
    I::Item: TransactionRow,
{
    let needle = query.to_lowercase();
    rows.into_iter()
        .filter(|row| matches_query(row.transaction(), &needle))
        .collect()
}

/// Stage 2: keep rows touching `wallet`; `None` keeps everything
pub fn wallet_filter<I>(rows: I, wallet: Option<&str>) -> Vec<I::Item>
where
    I: IntoIterator,
    I::Item: TransactionRow,
{
    rows.into_iter()
        .filter(|row| matches_wallet(row.transaction(), wallet))
        .collect()
}

/// Stage 3
pub fn aggregate<'a, I>(txs: I) -> TransactionStats
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut stats = TransactionStats::default();
    for tx in txs {
        stats.total_volume += tx.amount;
        stats.total_transactions += 1;
        if tx.is_flagged {
            stats.flagged_count += 1;
        }
    }
    stats.avg_transaction = if stats.total_transactions == 0 {
        0.0
    } else {
        stats.total_volume / stats.total_transactions as f64
    };
    stats
}

/// Output of one full pipeline pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedView {
    /// Indices surviving the text filter
    pub text_indices: Vec<usize>,
    /// Indices surviving text then wallet filter
    pub wallet_indices: Vec<usize>,
    pub stats: TransactionStats,
}

impl DerivedView {
    pub fn derive(txs: &[Transaction], query: &str, wallet: Option<&str>) -> Self {
        let text = text_filter(txs.iter().enumerate(), query);
        let selected = wallet_filter(text.iter().copied(), wallet);
        let stats = aggregate(selected.iter().map(|&(_, tx)| tx));
        Self {
            text_indices: text.iter().map(|&(idx, _)| idx).collect(),
            wallet_indices: selected.iter().map(|&(idx, _)| idx).collect(),
            stats,
        }
    }

    pub fn text_filtered<'a>(
        &'a self,
        txs: &'a [Transaction],
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.text_indices.iter().filter_map(move |&idx| txs.get(idx))
    }

    pub fn wallet_filtered<'a>(
        &'a self,
        txs: &'a [Transaction],
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.wallet_indices.iter().filter_map(move |&idx| txs.get(idx))
    }

    pub fn is_empty(&self) -> bool {
        self.wallet_indices.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    version: u64,
    query: String,
    wallet: Option<String>,
}

/// Memoizes the last pass on `(snapshot version, query, wallet)`
#[derive(Debug, Default)]
pub struct PipelineCache {
    key: Option<CacheKey>,
    view: DerivedView,
}

impl PipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute if any input changed. Returns true when a new pass ran.
    pub fn update(
        &mut self,
        snapshot: Option<&Snapshot>,
        query: &str,
        wallet: Option<&str>,
    ) -> bool {
        let Some(snapshot) = snapshot else {
            let changed = self.key.is_some() || self.view != DerivedView::default();
            self.key = None;
            self.view = DerivedView::default();
            return changed;
        };

        let key = CacheKey {
            version: snapshot.version(),
            query: query.to_string(),
            wallet: wallet.map(str::to_string),
        };
        if self.key.as_ref() == Some(&key) {
            return false;
        }
        self.view = DerivedView::derive(snapshot.transactions(), query, wallet);
        self.key = Some(key);
        true
    }

    pub fn view(&self) -> &DerivedView {
        &self.view
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }
}
