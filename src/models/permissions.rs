//! Level assignments derived from a user's permission object.
//!
//! The server describes what a user may see with `accessible*` arrays
//! (`accessibleBlocks`, `accessibleMandals`, ...). Each known key maps to a
//! level type through a fixed table; unknown `accessible*` keys are rejected
//! here rather than guessed at.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{LevelType, NodeId};
use crate::error::AppError;

/// Permission categories the API is known to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionCategory {
    Assemblies,
    Blocks,
    Mandals,
    PollingCenters,
    Booths,
}

static CATEGORY_TABLE: [(&str, PermissionCategory, LevelType); 5] = [
    (
        "accessibleAssemblies",
        PermissionCategory::Assemblies,
        LevelType::Assembly,
    ),
    (
        "accessibleBlocks",
        PermissionCategory::Blocks,
        LevelType::Block,
    ),
    (
        "accessibleMandals",
        PermissionCategory::Mandals,
        LevelType::Mandal,
    ),
    (
        "accessiblePollingCenters",
        PermissionCategory::PollingCenters,
        LevelType::PollingCenter,
    ),
    (
        "accessibleBooths",
        PermissionCategory::Booths,
        LevelType::Booth,
    ),
];

/// Prefix shared by every assignment key in a permissions object.
const ASSIGNMENT_KEY_PREFIX: &str = "accessible";

impl PermissionCategory {
    pub fn from_key(key: &str) -> Option<Self> {
        CATEGORY_TABLE
            .iter()
            .find(|(name, _, _)| *name == key)
            .map(|(_, category, _)| *category)
    }

    pub fn key(&self) -> &'static str {
        match self {
            PermissionCategory::Assemblies => "accessibleAssemblies",
            PermissionCategory::Blocks => "accessibleBlocks",
            PermissionCategory::Mandals => "accessibleMandals",
            PermissionCategory::PollingCenters => "accessiblePollingCenters",
            PermissionCategory::Booths => "accessibleBooths",
        }
    }

    pub fn level_type(&self) -> LevelType {
        match self {
            PermissionCategory::Assemblies => LevelType::Assembly,
            PermissionCategory::Blocks => LevelType::Block,
            PermissionCategory::Mandals => LevelType::Mandal,
            PermissionCategory::PollingCenters => LevelType::PollingCenter,
            PermissionCategory::Booths => LevelType::Booth,
        }
    }
}

/// Assignment entry on the wire. Payloads may carry several spellings of the
/// same field at once; the first present one wins.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAssignedLevel {
    id: Option<NodeId>,
    level_id: Option<NodeId>,
    state_level_id: Option<NodeId>,
    display_name: Option<String>,
    level_name: Option<String>,
    name: Option<String>,
    parent_id: Option<NodeId>,
    parent_level_id: Option<NodeId>,
}

impl TryFrom<WireAssignedLevel> for AssignedLevel {
    type Error = String;

    fn try_from(wire: WireAssignedLevel) -> Result<Self, Self::Error> {
        let id = wire
            .id
            .or(wire.level_id)
            .or(wire.state_level_id)
            .ok_or("missing field `id`")?;
        let display_name = wire
            .display_name
            .or(wire.level_name)
            .or(wire.name)
            .ok_or("missing field `displayName`")?;

        Ok(Self {
            id,
            display_name,
            parent_id: wire.parent_id.or(wire.parent_level_id),
        })
    }
}

/// A hierarchy node a user has been granted access to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireAssignedLevel", rename_all = "camelCase")]
pub struct AssignedLevel {
    pub id: NodeId,
    pub display_name: String,
    pub parent_id: Option<NodeId>,
}

/// Assigned nodes grouped by level type.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LevelAssignments {
    by_level: BTreeMap<LevelType, Vec<AssignedLevel>>,
}

impl LevelAssignments {
    /// Parses a permissions object, validating every `accessible*` key.
    ///
    /// Keys outside the `accessible*` family are ignored. `null` and empty
    /// arrays contribute nothing.
    pub fn from_permissions(permissions: &Value) -> Result<Self, AppError> {
        let object = permissions
            .as_object()
            .ok_or_else(|| AppError::Validation("permissions must be a JSON object".to_string()))?;

        let mut by_level: BTreeMap<LevelType, Vec<AssignedLevel>> = BTreeMap::new();
        for (key, value) in object {
            if !key.starts_with(ASSIGNMENT_KEY_PREFIX) {
                continue;
            }
            let category = PermissionCategory::from_key(key)
                .ok_or_else(|| AppError::UnknownPermissionCategory(key.clone()))?;
            if value.is_null() {
                continue;
            }

            let levels: Vec<AssignedLevel> = serde_json::from_value(value.clone())
                .map_err(|e| AppError::Decode(format!("{}: {}", key, e)))?;
            if !levels.is_empty() {
                by_level
                    .entry(category.level_type())
                    .or_default()
                    .extend(levels);
            }
        }

        Ok(Self { by_level })
    }

    /// Assignments at a given tier, empty when none.
    pub fn get(&self, level: LevelType) -> &[AssignedLevel] {
        self.by_level.get(&level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tiers with at least one assignment, shallowest first.
    pub fn levels(&self) -> impl Iterator<Item = LevelType> + '_ {
        self.by_level.keys().copied()
    }

    /// The most specific tier the user has assignments at.
    pub fn deepest_level(&self) -> Option<LevelType> {
        self.by_level.keys().next_back().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.by_level.is_empty()
    }
}
