//! Time-expiring cache for hierarchy responses.
//!
//! Entries are keyed by a typed [`CacheKey`] and indexed under every node id
//! they reference, so invalidating a node drops exactly the entries that
//! mention it (its own children listings, pages, and any sweep that walked
//! through it).

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::models::{ChildSet, ChildrenPage, HierarchyNode, NodeId};
use crate::services::BoothSweep;

/// Cache key for one kind of hierarchy response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// All children of a node, every page concatenated.
    Children(NodeId),
    /// A single page of children.
    ChildrenPage { node: NodeId, page: u32, limit: u32 },
    /// Booths found by sweeping below a node.
    BoothSweep(NodeId),
}

impl CacheKey {
    /// The node this key is about.
    pub fn node(&self) -> NodeId {
        match self {
            CacheKey::Children(node) => *node,
            CacheKey::ChildrenPage { node, .. } => *node,
            CacheKey::BoothSweep(node) => *node,
        }
    }
}

/// A cached response. Values are shared, so a hit hands back the same
/// allocation that was stored.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Page(Arc<ChildrenPage>),
    Children(Arc<ChildSet>),
    Sweep(Arc<BoothSweep>),
}

impl CachedValue {
    /// Node ids mentioned by the payload, besides the key's own node.
    fn referenced_nodes(&self) -> Vec<NodeId> {
        fn parent_id(parent: &Option<HierarchyNode>) -> Vec<NodeId> {
            parent.iter().map(|p| p.id).collect()
        }

        match self {
            CachedValue::Page(page) => parent_id(&page.parent),
            CachedValue::Children(set) => parent_id(&set.parent),
            CachedValue::Sweep(sweep) => sweep.visited.clone(),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    value: CachedValue,
    stored_at: Instant,
    indexed_under: Vec<NodeId>,
}

/// In-process response cache with a fixed time-to-live.
#[derive(Debug)]
pub struct HierarchyCache {
    ttl: Duration,
    entries: HashMap<CacheKey, CacheEntry>,
    by_node: HashMap<NodeId, HashSet<CacheKey>>,
}

impl HierarchyCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
            by_node: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value if it is younger than the TTL.
    pub fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        let entry = self.entries.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Stores a value with the current timestamp, replacing any prior entry.
    pub fn set(&mut self, key: CacheKey, value: CachedValue) {
        self.remove(&key);

        let mut indexed_under = vec![key.node()];
        for node in value.referenced_nodes() {
            if !indexed_under.contains(&node) {
                indexed_under.push(node);
            }
        }
        for node in &indexed_under {
            self.by_node.entry(*node).or_default().insert(key);
        }

        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
                indexed_under,
            },
        );
    }

    /// Removes every entry that references `node`. Returns how many were dropped.
    pub fn invalidate(&mut self, node: NodeId) -> usize {
        let keys = self.by_node.remove(&node).unwrap_or_default();
        let mut removed = 0;
        for key in keys {
            if self.remove(&key) {
                removed += 1;
            }
        }
        tracing::debug!(node = %node, removed, "Invalidated cache entries");
        removed
    }

    /// Drops all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_node.clear();
    }

    /// Drops entries whose TTL has elapsed.
    pub fn purge_expired(&mut self) -> usize {
        let expired: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.stored_at.elapsed() >= self.ttl)
            .map(|(key, _)| *key)
            .collect();
        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove(&mut self, key: &CacheKey) -> bool {
        let Some(entry) = self.entries.remove(key) else {
            return false;
        };
        for node in entry.indexed_under {
            if let Some(keys) = self.by_node.get_mut(&node) {
                keys.remove(key);
                if keys.is_empty() {
                    self.by_node.remove(&node);
                }
            }
        }
        true
    }
}

/// Cloneable handle to a [`HierarchyCache`] shared by services.
///
/// The lock is only held for the duration of a single cache operation,
/// never across a fetch.
#[derive(Debug, Clone)]
pub struct SharedCache {
    inner: Arc<Mutex<HierarchyCache>>,
}

impl SharedCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HierarchyCache::new(ttl))),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        self.lock().get(key)
    }

    pub fn set(&self, key: CacheKey, value: CachedValue) {
        self.lock().set(key, value);
    }

    pub fn invalidate(&self, node: NodeId) -> usize {
        self.lock().invalidate(node)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Cached full child set of a node.
    pub fn children(&self, node: NodeId) -> Option<Arc<ChildSet>> {
        match self.get(&CacheKey::Children(node))? {
            CachedValue::Children(set) => Some(set),
            _ => None,
        }
    }

    // A panic while holding the lock cannot leave the maps half-updated in a
    // way that matters for a cache, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HierarchyCache> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    fn child_set(parent: Option<i64>, children: &[i64]) -> Arc<ChildSet> {
        Arc::new(ChildSet {
            parent: parent.map(|id| HierarchyNode::new(NodeId(id), format!("P{id}"), "Block", None)),
            children: children
                .iter()
                .map(|id| HierarchyNode::new(NodeId(*id), format!("M{id}"), "Mandal", parent.map(NodeId)))
                .collect(),
            pages: 1,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_returns_same_allocation() {
        let mut cache = HierarchyCache::new(TTL);
        let set = child_set(Some(20), &[30, 31]);
        cache.set(CacheKey::Children(NodeId(20)), CachedValue::Children(set.clone()));

        match cache.get(&CacheKey::Children(NodeId(20))) {
            Some(CachedValue::Children(hit)) => assert!(Arc::ptr_eq(&hit, &set)),
            other => panic!("expected a hit, got {other:?}"),
        }
        assert!(cache.get(&CacheKey::Children(NodeId(21))).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let mut cache = HierarchyCache::new(TTL);
        cache.set(
            CacheKey::Children(NodeId(20)),
            CachedValue::Children(child_set(Some(20), &[30])),
        );

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.get(&CacheKey::Children(NodeId(20))).is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get(&CacheKey::Children(NodeId(20))).is_none());

        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_overwrites_and_resets_timestamp() {
        let mut cache = HierarchyCache::new(TTL);
        let key = CacheKey::Children(NodeId(20));
        cache.set(key, CachedValue::Children(child_set(Some(20), &[30])));

        tokio::time::advance(Duration::from_secs(200)).await;
        let fresh = child_set(Some(20), &[30, 31, 32]);
        cache.set(key, CachedValue::Children(fresh.clone()));

        tokio::time::advance(Duration::from_secs(200)).await;
        match cache.get(&key) {
            Some(CachedValue::Children(hit)) => assert_eq!(hit.children.len(), 3),
            other => panic!("expected a hit, got {other:?}"),
        }
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_removes_derived_keys() {
        let mut cache = HierarchyCache::new(TTL);
        cache.set(
            CacheKey::Children(NodeId(20)),
            CachedValue::Children(child_set(Some(20), &[30])),
        );
        cache.set(
            CacheKey::ChildrenPage {
                node: NodeId(20),
                page: 1,
                limit: 100,
            },
            CachedValue::Page(Arc::new(ChildrenPage {
                children: vec![],
                parent: None,
                pagination: None,
            })),
        );
        cache.set(
            CacheKey::Children(NodeId(21)),
            CachedValue::Children(child_set(Some(21), &[40])),
        );
        cache.set(
            CacheKey::BoothSweep(NodeId(10)),
            CachedValue::Sweep(Arc::new(BoothSweep {
                root: NodeId(10),
                booths: vec![],
                visited: vec![NodeId(10), NodeId(20), NodeId(30)],
                truncated: false,
            })),
        );

        assert_eq!(cache.invalidate(NodeId(20)), 3);
        assert!(cache.get(&CacheKey::Children(NodeId(20))).is_none());
        assert!(cache.get(&CacheKey::BoothSweep(NodeId(10))).is_none());
        assert!(cache.get(&CacheKey::Children(NodeId(21))).is_some());
        assert_eq!(cache.len(), 1);

        // Index entries went with the sweep, so nothing is left to drop.
        assert_eq!(cache.invalidate(NodeId(30)), 0);
    }

    #[tokio::test]
    async fn test_invalidate_via_parent_reference() {
        let mut cache = HierarchyCache::new(TTL);
        // A listing keyed by 20 whose response names 99 as its parent record.
        let set = Arc::new(ChildSet {
            parent: Some(HierarchyNode::new(NodeId(99), "Other", "Block", None)),
            children: vec![],
            pages: 1,
        });
        cache.set(CacheKey::Children(NodeId(20)), CachedValue::Children(set));

        assert_eq!(cache.invalidate(NodeId(99)), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let shared = SharedCache::new(TTL);
        shared.set(
            CacheKey::Children(NodeId(20)),
            CachedValue::Children(child_set(Some(20), &[30])),
        );
        assert!(shared.children(NodeId(20)).is_some());

        shared.clear();
        assert!(shared.is_empty());
        assert!(shared.children(NodeId(20)).is_none());
        assert_eq!(shared.invalidate(NodeId(20)), 0);
    }
}
