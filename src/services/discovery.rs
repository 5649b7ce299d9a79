//! Discovery service: read-through cached access to the hierarchy API.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use serde::Serialize;

use crate::cache::{CacheKey, CachedValue, SharedCache};
use crate::chain::FilterChainState;
use crate::config::{Config, DiscoveryConfig};
use crate::context::{AppFetcher, Context};
use crate::di::FromRef;
use crate::error::AppError;
use crate::hierarchy::filter_by_level;
use crate::models::{ChildSet, ChildrenPage, HierarchyNode, LevelType, NodeId, PageRequest};

/// Booths found below a node by [`DiscoveryService::discover_booths`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoothSweep {
    pub root: NodeId,
    pub booths: Vec<HierarchyNode>,
    /// Every node whose children were fetched, in visit order.
    pub visited: Vec<NodeId>,
    /// True when the depth limit stopped the sweep before a branch bottomed out.
    pub truncated: bool,
}

/// Service for fetching children through the shared cache.
///
/// Fetch failures are returned as-is and never cached; retrying is up to
/// the caller. Concurrent misses for the same key each go to the network.
#[derive(Clone)]
pub struct DiscoveryService {
    fetcher: AppFetcher,
    cache: SharedCache,
    settings: DiscoveryConfig,
}

impl FromRef<Context> for DiscoveryService {
    fn from_ref(ctx: &Context) -> Self {
        let config = Arc::<Config>::from_ref(ctx);
        Self::new(
            AppFetcher::from_ref(ctx),
            SharedCache::from_ref(ctx),
            config.discovery.clone(),
        )
    }
}

impl DiscoveryService {
    pub fn new(fetcher: AppFetcher, cache: SharedCache, settings: DiscoveryConfig) -> Self {
        Self {
            fetcher,
            cache,
            settings,
        }
    }

    /// One page of a node's children, 1-based.
    pub async fn children_page(
        &self,
        node: NodeId,
        page: u32,
    ) -> Result<Arc<ChildrenPage>, AppError> {
        let request = PageRequest::new(page, self.settings.page_size);
        let key = CacheKey::ChildrenPage {
            node,
            page: request.page,
            limit: request.limit,
        };

        if let Some(CachedValue::Page(page)) = self.cache.get(&key) {
            tracing::debug!(node = %node, page = request.page, "Cache hit for children page");
            return Ok(page);
        }

        tracing::debug!(node = %node, page = request.page, "Cache miss for children page");
        let page = Arc::new(self.fetcher.fetch_children(node, request).await?);
        self.cache.set(key, CachedValue::Page(page.clone()));
        Ok(page)
    }

    /// All children of a node, paging until the server runs out.
    pub async fn children(&self, node: NodeId) -> Result<Arc<ChildSet>, AppError> {
        let key = CacheKey::Children(node);
        if let Some(CachedValue::Children(set)) = self.cache.get(&key) {
            tracing::debug!(node = %node, "Cache hit for children");
            return Ok(set);
        }

        tracing::debug!(node = %node, "Cache miss for children");
        let mut request = PageRequest::first(self.settings.page_size);
        let mut children = Vec::new();
        let mut parent = None;
        let mut pages = 0;

        loop {
            if pages >= self.settings.max_pages {
                return Err(AppError::PaginationLimit { node, pages });
            }

            let page = self.fetcher.fetch_children(node, request).await?;
            pages += 1;

            let is_last = page.is_last(request);
            if parent.is_none() {
                parent = page.parent;
            }
            children.extend(page.children);

            if is_last {
                break;
            }
            request = request.next();
        }

        tracing::debug!(node = %node, children = children.len(), pages, "Fetched children");
        let set = Arc::new(ChildSet {
            parent,
            children,
            pages,
        });
        self.cache.set(key, CachedValue::Children(set.clone()));
        Ok(set)
    }

    /// Sweeps breadth-first below `root`, collecting every booth.
    ///
    /// Non-booth nodes are descended into until `max_depth` levels below the
    /// root; deeper branches are skipped and flagged via `truncated`.
    pub async fn discover_booths(&self, root: NodeId) -> Result<Arc<BoothSweep>, AppError> {
        let key = CacheKey::BoothSweep(root);
        if let Some(CachedValue::Sweep(sweep)) = self.cache.get(&key) {
            tracing::debug!(node = %root, "Cache hit for booth sweep");
            return Ok(sweep);
        }

        let mut queue = VecDeque::from([(root, 0u32)]);
        let mut seen = HashSet::from([root]);
        let mut visited = Vec::new();
        let mut booths = Vec::new();
        let mut truncated = false;

        while let Some((node, depth)) = queue.pop_front() {
            let set = self.children(node).await?;
            visited.push(node);

            for child in &set.children {
                if child.is_booth() {
                    booths.push(child.clone());
                } else if depth + 1 >= self.settings.max_depth {
                    truncated = true;
                } else if seen.insert(child.id) {
                    queue.push_back((child.id, depth + 1));
                }
            }
        }

        tracing::info!(
            node = %root,
            booths = booths.len(),
            visited = visited.len(),
            truncated,
            "Booth sweep finished"
        );

        let sweep = Arc::new(BoothSweep {
            root,
            booths,
            visited,
            truncated,
        });
        self.cache.set(key, CachedValue::Sweep(sweep.clone()));
        Ok(sweep)
    }

    /// Drives a filter chain down from an assembly.
    ///
    /// At each tier the next node comes from `picks` in order; once `picks`
    /// runs out the first candidate is taken. Stops when the chain completes
    /// or no further tier is offered.
    pub async fn walk(
        &self,
        assembly: NodeId,
        picks: &[NodeId],
    ) -> Result<FilterChainState, AppError> {
        let mut chain = FilterChainState::new();
        let set = self.children(assembly).await?;
        let anchor = set
            .parent
            .clone()
            .filter(|parent| parent.id == assembly)
            .unwrap_or_else(|| HierarchyNode::placeholder(assembly, LevelType::Assembly));

        let ticket = chain.begin_selection(LevelType::Assembly, anchor);
        chain.complete_selection(ticket, &set.children)?;

        let mut children = set;
        let mut picks = picks.iter();

        while !chain.is_complete() {
            let Some(level) = chain.next_level_type(&children.children) else {
                break;
            };
            let candidates = filter_by_level(&children.children, level);

            let selected = match picks.next() {
                Some(id) => candidates
                    .into_iter()
                    .find(|n| n.id == *id)
                    .ok_or(AppError::NodeNotFound { node: *id, level })?,
                None => match candidates.into_iter().next() {
                    Some(first) => first,
                    None => break,
                },
            };

            tracing::info!(level = %level, node = %selected.id, name = %selected.display_name, "Selecting");
            let node = selected.id;
            let ticket = chain.begin_selection(level, selected);
            children = self.children(node).await?;
            chain.complete_selection(ticket, &children.children)?;
        }

        Ok(chain)
    }

    /// Drops every cached response that references `node`.
    pub fn invalidate(&self, node: NodeId) -> usize {
        self.cache.invalidate(node)
    }

    /// Drops all cached responses, e.g. on logout.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
