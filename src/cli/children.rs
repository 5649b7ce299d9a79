//! Children command handler.

use color_eyre::Result;

use crate::di::FromRef;
use crate::models::NodeId;
use crate::services::DiscoveryService;

use super::{print_json, App};

impl App {
    /// List one page, or every page, of a node's children.
    pub async fn run_children(&self, node: NodeId, page: Option<u32>) -> Result<()> {
        let ctx = self.context()?;
        let discovery = DiscoveryService::from_ref(&ctx);

        match page {
            Some(page) => {
                let result = discovery.children_page(node, page).await?;
                tracing::info!(
                    "Node {} page {}: {} children",
                    node,
                    page,
                    result.children.len()
                );
                print_json(&*result)
            }
            None => {
                let result = discovery.children(node).await?;
                tracing::info!(
                    "Node {}: {} children across {} pages",
                    node,
                    result.children.len(),
                    result.pages
                );
                print_json(&*result)
            }
        }
    }
}
