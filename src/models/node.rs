//! Hierarchy node model as returned by the children endpoint.

use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LevelClassification, LevelType};

/// Server-assigned node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for NodeId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(NodeId)
    }
}

/// A user the server chose to embed alongside a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedUser {
    pub id: i64,
    #[serde(alias = "username", alias = "userName")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
}

/// Node shape on the wire. Classification is derived when converting.
///
/// The API spells some fields several ways, sometimes in the same object;
/// the first present spelling wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNode {
    id: NodeId,
    display_name: Option<String>,
    level_display_name: Option<String>,
    name: Option<String>,
    level_label: Option<String>,
    level_name: Option<String>,
    parent_id: Option<NodeId>,
    parent_level_id: Option<NodeId>,
    #[serde(default)]
    children_count: u32,
    #[serde(default)]
    user_count: u32,
    #[serde(default)]
    assigned_users: Option<Vec<AssignedUser>>,
}

/// One entity in the administrative tree.
///
/// Nodes are created when a fetch resolves and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "WireNode", rename_all = "camelCase")]
pub struct HierarchyNode {
    pub id: NodeId,
    pub display_name: String,
    /// Raw category text assigned by the server.
    pub level_label: String,
    /// Classification derived from `level_label`.
    pub level_type: LevelType,
    #[serde(skip_serializing)]
    pub classification: LevelClassification,
    /// Foreign key to the owning node, used for path validation only.
    pub parent_id: Option<NodeId>,
    pub children_count: u32,
    pub user_count: u32,
    /// True when the classified tier is terminal in the priority table.
    pub has_direct_booths: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_users: Option<Vec<AssignedUser>>,
}

impl HierarchyNode {
    /// Creates a node, classifying its label.
    pub fn new(
        id: NodeId,
        display_name: impl Into<String>,
        level_label: impl Into<String>,
        parent_id: Option<NodeId>,
    ) -> Self {
        let level_label = level_label.into();
        let classification = LevelClassification::classify(&level_label);
        let level_type = classification.level_type();

        Self {
            id,
            display_name: display_name.into(),
            level_label,
            level_type,
            classification,
            parent_id,
            children_count: 0,
            user_count: 0,
            has_direct_booths: level_type.is_terminal(),
            assigned_users: None,
        }
    }

    /// Stand-in for a node known only by id, e.g. the root of a walk when
    /// the server omitted the parent record.
    pub fn placeholder(id: NodeId, level: LevelType) -> Self {
        Self::new(
            id,
            format!("{} {}", level.display_name(), id),
            level.display_name(),
            None,
        )
    }

    pub fn with_counts(mut self, children_count: u32, user_count: u32) -> Self {
        self.children_count = children_count;
        self.user_count = user_count;
        self
    }

    pub fn is_booth(&self) -> bool {
        self.level_type == LevelType::Booth
    }
}

impl TryFrom<WireNode> for HierarchyNode {
    type Error = String;

    fn try_from(wire: WireNode) -> Result<Self, Self::Error> {
        let display_name = wire
            .display_name
            .or(wire.level_display_name)
            .or(wire.name)
            .ok_or_else(|| format!("node {}: missing field `displayName`", wire.id))?;
        let level_label = wire
            .level_label
            .or(wire.level_name)
            .ok_or_else(|| format!("node {}: missing field `levelName`", wire.id))?;

        let mut node = HierarchyNode::new(
            wire.id,
            display_name,
            level_label,
            wire.parent_id.or(wire.parent_level_id),
        )
        .with_counts(wire.children_count, wire.user_count);
        node.assigned_users = wire.assigned_users;
        Ok(node)
    }
}
