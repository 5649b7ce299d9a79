//! Access to the remote "children of node" endpoint.
//!
//! [`HierarchyFetcher`] is the seam between discovery logic and the
//! network: services depend on the trait, the binary plugs in
//! [`HttpHierarchyFetcher`], and tests plug in in-memory trees.

mod http;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{ChildrenPage, NodeId, PageRequest};

pub use http::HttpHierarchyFetcher;

/// Fetches one page of a node's direct children.
#[async_trait]
pub trait HierarchyFetcher: Send + Sync {
    /// Returns the requested page of `node`'s children plus parent metadata.
    ///
    /// Transport failures, non-success HTTP statuses and `success: false`
    /// envelopes all surface as errors.
    async fn fetch_children(&self, node: NodeId, page: PageRequest)
        -> Result<ChildrenPage, AppError>;
}
