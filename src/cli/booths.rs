//! Booths command handler.

use color_eyre::Result;

use crate::di::FromRef;
use crate::models::NodeId;
use crate::services::DiscoveryService;

use super::{print_json, App};

impl App {
    /// Sweep below a node and print every booth found.
    pub async fn run_booths(&self, node: NodeId) -> Result<()> {
        let ctx = self.context()?;
        let discovery = DiscoveryService::from_ref(&ctx);

        let sweep = discovery.discover_booths(node).await?;
        if sweep.truncated {
            tracing::warn!(
                "Sweep below {} hit the depth limit ({}); some branches were not explored",
                node,
                ctx.config.discovery.max_depth
            );
        }
        print_json(&*sweep)
    }
}
