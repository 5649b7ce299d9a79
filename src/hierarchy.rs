//! Predicates and formatting helpers over lists of hierarchy nodes.

use serde::Serialize;

use crate::models::{classify_level, HierarchyNode, LevelType};

/// Separator used in breadcrumb paths.
pub const PATH_SEPARATOR: &str = " → ";

/// Outcome of checking a selection path's parent links.
///
/// Advisory only: an invalid path is reported, never rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl PathValidation {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Distinct level types present among `nodes`, in priority order.
pub fn available_level_types(nodes: &[HierarchyNode]) -> Vec<LevelType> {
    let mut levels: Vec<LevelType> = nodes.iter().map(|n| n.level_type).collect();
    levels.sort_by_key(|l| l.order());
    levels.dedup();
    levels
}

/// Nodes classified at `level`, in their original order.
pub fn filter_by_level(nodes: &[HierarchyNode], level: LevelType) -> Vec<HierarchyNode> {
    nodes
        .iter()
        .filter(|n| n.level_type == level)
        .cloned()
        .collect()
}

/// Whether nodes carrying this label may directly contain booths.
pub fn has_direct_booths(level_label: &str) -> bool {
    classify_level(level_label).is_terminal()
}

/// Display names joined into a breadcrumb.
pub fn format_path<'a>(nodes: impl IntoIterator<Item = &'a HierarchyNode>) -> String {
    nodes
        .into_iter()
        .map(|n| n.display_name.as_str())
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}

/// Checks that each node's `parent_id` names the node before it, and that
/// each step goes strictly deeper in the hierarchy.
///
/// Each node is paired with the tier it was selected at; a node's own label
/// may not classify to that tier.
pub fn validate_path(path: &[(LevelType, &HierarchyNode)]) -> PathValidation {
    let mut errors = Vec::new();

    for pair in path.windows(2) {
        let ((parent_level, parent), (child_level, child)) = (pair[0], pair[1]);

        match child.parent_id {
            Some(parent_id) if parent_id == parent.id => {}
            Some(parent_id) => errors.push(format!(
                "{} '{}' (id {}) has parent {}, expected {} '{}' (id {})",
                child_level.display_name(),
                child.display_name,
                child.id,
                parent_id,
                parent_level.display_name(),
                parent.display_name,
                parent.id
            )),
            None => errors.push(format!(
                "{} '{}' (id {}) has no parent, expected {} '{}' (id {})",
                child_level.display_name(),
                child.display_name,
                child.id,
                parent_level.display_name(),
                parent.display_name,
                parent.id
            )),
        }

        if child_level <= parent_level {
            errors.push(format!(
                "{} '{}' is not below {} '{}' in the hierarchy",
                child_level.display_name(),
                child.display_name,
                parent_level.display_name(),
                parent.display_name
            ));
        }
    }

    PathValidation::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeId;

    fn node(id: i64, label: &str, parent: Option<i64>) -> HierarchyNode {
        HierarchyNode::new(
            NodeId(id),
            format!("{label}{id}"),
            label,
            parent.map(NodeId),
        )
    }

    #[test]
    fn test_available_level_types_distinct_and_sorted() {
        let nodes = vec![
            node(1, "Booth", None),
            node(2, "Polling Center", None),
            node(3, "Booth", None),
            node(4, "Mandal", None),
        ];
        assert_eq!(
            available_level_types(&nodes),
            vec![LevelType::Mandal, LevelType::PollingCenter, LevelType::Booth]
        );
        assert!(available_level_types(&[]).is_empty());
    }

    #[test]
    fn test_filter_by_level() {
        let nodes = vec![
            node(1, "Booth", None),
            node(2, "Mandal", None),
            node(3, "Booth", None),
        ];
        let booths = filter_by_level(&nodes, LevelType::Booth);
        assert_eq!(
            booths.iter().map(|n| n.id).collect::<Vec<_>>(),
            vec![NodeId(1), NodeId(3)]
        );
    }

    #[test]
    fn test_has_direct_booths() {
        assert!(!has_direct_booths("Block"));
        assert!(has_direct_booths("Mandal"));
        assert!(has_direct_booths("Polling Center"));
        assert!(has_direct_booths("Booth"));
        assert!(!has_direct_booths("Assembly"));
    }

    #[test]
    fn test_format_path() {
        let path = [
            node(10, "Assembly", None),
            node(20, "Block", Some(10)),
            node(30, "Mandal", Some(20)),
        ];
        assert_eq!(format_path(&path), "Assembly10 → Block20 → Mandal30");
        assert_eq!(format_path(std::iter::empty()), "");
    }

    #[test]
    fn test_validate_path_consistent() {
        let a = node(10, "Assembly", None);
        let b = node(20, "Block", Some(10));
        let m = node(30, "Mandal", Some(20));
        let result = validate_path(&[
            (LevelType::Assembly, &a),
            (LevelType::Block, &b),
            (LevelType::Mandal, &m),
        ]);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_validate_path_parent_mismatch() {
        let a = node(10, "Assembly", None);
        let b = node(20, "Block", Some(10));
        let m = node(30, "Mandal", Some(21));
        let result = validate_path(&[
            (LevelType::Assembly, &a),
            (LevelType::Block, &b),
            (LevelType::Mandal, &m),
        ]);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("has parent 21"));
    }

    #[test]
    fn test_validate_path_missing_parent_and_order() {
        let m = node(30, "Mandal", None);
        let b = node(20, "Block", None);
        let result = validate_path(&[(LevelType::Mandal, &m), (LevelType::Block, &b)]);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].contains("has no parent"));
        assert!(result.errors[1].contains("is not below"));
    }

    #[test]
    fn test_validate_path_uses_selected_tiers() {
        // "Constituency" classifies as a fallback Booth, but it was selected
        // as the assembly.
        let a = node(10, "Constituency", None);
        let b = node(20, "Block", Some(10));
        assert_eq!(a.level_type, LevelType::Booth);

        let result = validate_path(&[(LevelType::Assembly, &a), (LevelType::Block, &b)]);
        assert!(result.is_valid, "{:?}", result.errors);
    }
}
