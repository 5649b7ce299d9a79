//! Walk command handler.

use color_eyre::Result;
use serde_json::json;

use crate::di::FromRef;
use crate::models::NodeId;
use crate::services::DiscoveryService;

use super::{print_json, App};

impl App {
    /// Walk a filter chain from an assembly and print where it ended up.
    pub async fn run_walk(&self, assembly: NodeId, picks: &[NodeId]) -> Result<()> {
        let ctx = self.context()?;
        let discovery = DiscoveryService::from_ref(&ctx);

        let chain = discovery.walk(assembly, picks).await?;
        let validation = chain.validate();
        if !validation.is_valid {
            for error in &validation.errors {
                tracing::warn!("Path check: {}", error);
            }
        }

        print_json(&json!({
            "path": chain.to_path_string(),
            "phase": chain.phase(),
            "selections": chain.selected_path(),
            "availableLevelTypes": chain.available_level_types(),
            "isComplete": chain.is_complete(),
            "booths": chain.current_booths(),
            "validation": validation,
        }))
    }
}
