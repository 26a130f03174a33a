//! ChainAudit: a terminal dashboard for auditing blockchain transaction networks

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod modules;
pub mod store;
pub mod ui;
