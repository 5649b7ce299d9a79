//! hierarchy-discovery - administrative hierarchy discovery
//!
//! Fetches the children of hierarchy nodes (State → District → Assembly →
//! Block → Mandal → Polling Center → Booth) from a paginated REST API,
//! caches them briefly, classifies each node's tier from its label, and
//! tracks cascading filter-chain selections down to booths.

pub mod cache;
pub mod chain;
pub mod cli;
pub mod config;
pub mod context;
pub mod di;
pub mod error;
pub mod fetcher;
pub mod hierarchy;
pub mod models;
pub mod services;

pub use di::FromRef;
