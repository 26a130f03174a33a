//! Actions emitted by state transitions and commands

use crate::domain::Transaction;

/// Outbound events and requests produced by handlers.
///
/// The three `Select*`/`Alert` variants are the callback contract exposed to
/// surrounding UI; the rest are app-level effects.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No action needed
    None,

    /// Wallet focus changed (`None` after a reset)
    SelectWallet(Option<String>),

    /// A transaction was opened for inspection
    SelectTransaction(Transaction),

    /// An alert was acted upon
    Alert(AlertAction, String),

    /// Navigate to a page or tab
    Navigate(NavigateTarget),

    /// Ask an external service about an address
    Inspect(InspectRequest),

    /// Copy text to the clipboard
    Copy(String),

    /// Show notification in status bar
    Notify(String, NotifyLevel),

    /// Request quit
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAction {
    Dismiss,
}

impl AlertAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertAction::Dismiss => "dismiss",
        }
    }
}

/// Navigation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateTarget {
    Home,
    Dashboard,
    Overview,
    Metrics,
    /// Tear down and re-open the dashboard session
    Reload,
}

/// Requests for the opaque risk / fund-tracing services
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectRequest {
    Risk { address: String },
    Trace { address: String, depth: u32 },
}

impl InspectRequest {
    pub fn address(&self) -> &str {
        match self {
            InspectRequest::Risk { address } | InspectRequest::Trace { address, .. } => address,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InspectRequest::Risk { .. } => "Risk analysis",
            InspectRequest::Trace { .. } => "Fund tracing",
        }
    }
}

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warn,
    Error,
}
