//! Selection / interaction state
//!
//! Three independent axes: selected wallet, inspected transaction and search
//! query. No transition touches an axis other than its own.

use super::Action;
use crate::domain::Transaction;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    selected_wallet: Option<String>,
    selected_transaction: Option<Transaction>,
    search_query: String,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_wallet(&self) -> Option<&str> {
        self.selected_wallet.as_deref()
    }

    pub fn selected_transaction(&self) -> Option<&Transaction> {
        self.selected_transaction.as_ref()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Graph node clicked
    pub fn click_node(&mut self, id: impl Into<String>) -> Action {
        let id = id.into();
        self.selected_wallet = Some(id.clone());
        Action::SelectWallet(Some(id))
    }

    pub fn reset_selection(&mut self) -> Action {
        self.selected_wallet = None;
        Action::SelectWallet(None)
    }

    /// Graph link or transaction row clicked
    pub fn click_link(&mut self, tx: Transaction) -> Action {
        self.selected_transaction = Some(tx.clone());
        Action::SelectTransaction(tx)
    }

    pub fn close_detail(&mut self) -> Action {
        self.selected_transaction = None;
        Action::None
    }

    pub fn set_search(&mut self, query: impl Into<String>) -> Action {
        self.search_query = query.into();
        Action::None
    }

    pub fn push_search_char(&mut self, ch: char) -> Action {
        self.search_query.push(ch);
        Action::None
    }

    pub fn pop_search_char(&mut self) -> Action {
        self.search_query.pop();
        Action::None
    }
}
