//! Domain layer - pure data model and derivations, no I/O

pub mod layout;
pub mod model;
pub mod pipeline;

pub use layout::{
    is_link_active, is_node_active, GraphLayout, LayoutConfig, Link, LinkSet, Point,
};
pub use model::{Alert, AlertValue, Node, NodeType, Severity, Transaction};
pub use pipeline::{
    aggregate, text_filter, wallet_filter, DerivedView, PipelineCache, TransactionRow,
    TransactionStats,
};
