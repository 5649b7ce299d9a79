//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hierarchy_discovery::cache::SharedCache;
use hierarchy_discovery::config::DiscoveryConfig;
use hierarchy_discovery::error::AppError;
use hierarchy_discovery::fetcher::HierarchyFetcher;
use hierarchy_discovery::models::{ChildrenPage, HierarchyNode, NodeId, PageRequest, Pagination};
use hierarchy_discovery::services::DiscoveryService;

pub const TTL: Duration = Duration::from_secs(300);

pub fn node(id: i64, label: &str, parent: Option<i64>) -> HierarchyNode {
    HierarchyNode::new(NodeId(id), format!("{label}{id}"), label, parent.map(NodeId))
}

/// In-memory hierarchy that serves pages like the real endpoint and counts
/// every request it receives.
#[derive(Default)]
pub struct TreeFetcher {
    nodes: HashMap<NodeId, HierarchyNode>,
    children: HashMap<NodeId, Vec<HierarchyNode>>,
    failing: Mutex<HashSet<NodeId>>,
    calls: AtomicUsize,
    calls_by_node: Mutex<HashMap<NodeId, usize>>,
}

impl TreeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `child` under its `parent_id`.
    pub fn with(mut self, child: HierarchyNode) -> Self {
        if let Some(parent) = child.parent_id {
            self.children.entry(parent).or_default().push(child.clone());
        }
        self.nodes.insert(child.id, child);
        self
    }

    pub fn fail(&self, node: i64) {
        self.failing.lock().unwrap().insert(NodeId(node));
    }

    pub fn recover(&self, node: i64) {
        self.failing.lock().unwrap().remove(&NodeId(node));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, node: i64) -> usize {
        self.calls_by_node
            .lock()
            .unwrap()
            .get(&NodeId(node))
            .copied()
            .unwrap_or(0)
    }

    /// The worked example: Assembly 10 → Blocks 20, 21 → Mandals 30-32
    /// under 20 → Booths 50-52 under 30, plus a polling center under 31.
    pub fn sample() -> Self {
        Self::new()
            .with(node(10, "Assembly", None))
            .with(node(20, "Block", Some(10)))
            .with(node(21, "Block", Some(10)))
            .with(node(30, "Mandal", Some(20)))
            .with(node(31, "Mandal", Some(20)))
            .with(node(32, "Mandal", Some(20)))
            .with(node(50, "Booth", Some(30)))
            .with(node(51, "Booth", Some(30)))
            .with(node(52, "Booth", Some(30)))
            .with(node(40, "Polling Center", Some(31)))
            .with(node(53, "Booth", Some(40)))
            .with(node(22, "Mandal", Some(21)))
    }
}

#[async_trait]
impl HierarchyFetcher for TreeFetcher {
    async fn fetch_children(
        &self,
        node: NodeId,
        page: PageRequest,
    ) -> Result<ChildrenPage, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.calls_by_node.lock().unwrap().entry(node).or_default() += 1;

        if self.failing.lock().unwrap().contains(&node) {
            return Err(AppError::Unsuccessful {
                message: format!("Failed to load children of {node}"),
            });
        }

        let all = self.children.get(&node).cloned().unwrap_or_default();
        let total = all.len() as u64;
        let limit = page.limit as usize;
        let start = (page.page as usize - 1) * limit;
        let children = all.into_iter().skip(start).take(limit).collect();

        Ok(ChildrenPage {
            children,
            parent: self.nodes.get(&node).cloned(),
            pagination: Some(Pagination {
                page: page.page,
                limit: page.limit,
                total: Some(total),
                total_pages: Some(total.div_ceil(page.limit as u64).max(1) as u32),
            }),
        })
    }
}

pub fn settings(page_size: u32) -> DiscoveryConfig {
    DiscoveryConfig {
        page_size,
        ..DiscoveryConfig::default()
    }
}

pub fn service(fetcher: Arc<TreeFetcher>, settings: DiscoveryConfig) -> DiscoveryService {
    DiscoveryService::new(fetcher, SharedCache::new(TTL), settings)
}
