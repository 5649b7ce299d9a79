//! Cascading filter-chain selection state.
//!
//! A chain holds one selected node per tier, Assembly first and then the
//! dynamic tiers (Block, Mandal, PollingCenter, Booth). Which tier is offered
//! next is decided from the level labels of the children fetched for the
//! latest selection, not from a fixed schema.
//!
//! Selecting is split in two so a slow fetch cannot clobber a newer choice:
//!
//! ```ignore
//! let ticket = chain.begin_selection(LevelType::Block, block.clone());
//! let children = discovery.children(block.id).await?;
//! chain.complete_selection(ticket, &children.children)?; // Err if superseded
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::AppError;
use crate::hierarchy::{
    available_level_types, filter_by_level, format_path, validate_path, PathValidation,
};
use crate::models::{HierarchyNode, LevelType, NodeId};

/// Coarse position of a chain, derived from its selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChainPhase {
    NoAssembly,
    AssemblySelected,
    PartialChain { depth: usize },
    ChainComplete,
}

/// Proof that a selection was started at a given generation.
///
/// Only the ticket from the most recent selection can complete it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionTicket {
    generation: u64,
    level: LevelType,
    node: NodeId,
}

impl SelectionTicket {
    pub fn level(&self) -> LevelType {
        self.level
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}

/// Selection state for one list or filter view.
#[derive(Debug, Clone, Default)]
pub struct FilterChainState {
    assembly: Option<HierarchyNode>,
    dynamic_levels: BTreeMap<LevelType, HierarchyNode>,
    available_level_types: Vec<LevelType>,
    is_complete: bool,
    current_booths: Vec<HierarchyNode>,
    generation: u64,
}

impl FilterChainState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a selection and applies the children fetched for it.
    ///
    /// Use when the children are already at hand; otherwise pair
    /// [`begin_selection`](Self::begin_selection) with
    /// [`complete_selection`](Self::complete_selection).
    pub fn advance(
        &mut self,
        level: LevelType,
        selected: HierarchyNode,
        fetched_children: &[HierarchyNode],
    ) {
        self.begin_selection(level, selected);
        self.apply_children(fetched_children);
    }

    /// Records `selected` at `level` and clears every deeper tier.
    ///
    /// Selecting an Assembly replaces the anchor and clears all dynamic
    /// tiers. Derived facts are reset until the matching
    /// [`complete_selection`](Self::complete_selection) arrives.
    pub fn begin_selection(&mut self, level: LevelType, selected: HierarchyNode) -> SelectionTicket {
        let node = selected.id;

        if level == LevelType::Assembly {
            self.assembly = Some(selected);
            self.dynamic_levels.clear();
        } else {
            self.dynamic_levels.retain(|tier, _| *tier < level);
            self.dynamic_levels.insert(level, selected);
        }

        self.clear_derived();
        self.generation += 1;
        tracing::debug!(level = %level, node = %node, generation = self.generation, "Selection started");

        SelectionTicket {
            generation: self.generation,
            level,
            node,
        }
    }

    /// Applies the children fetched for a selection.
    ///
    /// Fails with [`AppError::StaleSelection`] and leaves the state untouched
    /// when a newer selection or reset happened after `ticket` was issued.
    pub fn complete_selection(
        &mut self,
        ticket: SelectionTicket,
        fetched_children: &[HierarchyNode],
    ) -> Result<(), AppError> {
        if ticket.generation != self.generation {
            tracing::warn!(
                level = %ticket.level,
                node = %ticket.node,
                ticket_generation = ticket.generation,
                current_generation = self.generation,
                "Discarding stale children response"
            );
            return Err(AppError::StaleSelection {
                node: ticket.node,
                level: ticket.level,
            });
        }

        self.apply_children(fetched_children);
        Ok(())
    }

    /// Shallowest level type among `fetched_children` without a selection yet.
    pub fn next_level_type(&self, fetched_children: &[HierarchyNode]) -> Option<LevelType> {
        available_level_types(fetched_children)
            .into_iter()
            .find(|level| self.selection(*level).is_none())
    }

    /// Checks the parent links of the selected path from the Assembly down.
    pub fn validate(&self) -> PathValidation {
        let tiers: Vec<(LevelType, &HierarchyNode)> = self
            .assembly
            .iter()
            .map(|node| (LevelType::Assembly, node))
            .chain(
                LevelType::dynamic()
                    .iter()
                    .filter_map(|level| self.dynamic_levels.get(level).map(|node| (*level, node))),
            )
            .collect();
        let mut validation = validate_path(&tiers);

        if self.assembly.is_none() && !self.dynamic_levels.is_empty() {
            validation
                .errors
                .insert(0, "No assembly selected above the chosen levels".to_string());
            validation.is_valid = false;
        }

        validation
    }

    /// Breadcrumb of the selected display names.
    pub fn to_path_string(&self) -> String {
        format_path(self.selected_path())
    }

    /// Clears all dynamic tiers, optionally keeping the assembly.
    ///
    /// Any selection still waiting on its children is invalidated.
    pub fn reset(&mut self, preserve_assembly: bool) {
        self.dynamic_levels.clear();
        if !preserve_assembly {
            self.assembly = None;
        }
        self.clear_derived();
        self.generation += 1;
    }

    pub fn phase(&self) -> ChainPhase {
        if self.is_complete {
            ChainPhase::ChainComplete
        } else if self.assembly.is_none() {
            ChainPhase::NoAssembly
        } else if self.dynamic_levels.is_empty() {
            ChainPhase::AssemblySelected
        } else {
            ChainPhase::PartialChain {
                depth: self.dynamic_levels.len(),
            }
        }
    }

    pub fn assembly(&self) -> Option<&HierarchyNode> {
        self.assembly.as_ref()
    }

    pub fn dynamic_levels(&self) -> &BTreeMap<LevelType, HierarchyNode> {
        &self.dynamic_levels
    }

    /// Selected node at `level`, including the assembly tier.
    pub fn selection(&self, level: LevelType) -> Option<&HierarchyNode> {
        if level == LevelType::Assembly {
            self.assembly.as_ref()
        } else {
            self.dynamic_levels.get(&level)
        }
    }

    /// Deepest selected node, if any.
    pub fn deepest(&self) -> Option<&HierarchyNode> {
        self.dynamic_levels
            .values()
            .next_back()
            .or(self.assembly.as_ref())
    }

    pub fn available_level_types(&self) -> &[LevelType] {
        &self.available_level_types
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn current_booths(&self) -> &[HierarchyNode] {
        &self.current_booths
    }

    /// Selected nodes from the assembly down, in canonical order.
    pub fn selected_path(&self) -> Vec<&HierarchyNode> {
        self.assembly
            .iter()
            .chain(self.dynamic_levels.values())
            .collect()
    }

    fn apply_children(&mut self, fetched_children: &[HierarchyNode]) {
        self.available_level_types = available_level_types(fetched_children);
        self.current_booths = filter_by_level(fetched_children, LevelType::Booth);

        // A terminal tier with nothing but booths (or nothing) below it is
        // as far as the chain can go.
        let terminal_end = self.deepest().is_some_and(|node| node.has_direct_booths)
            && self
                .available_level_types
                .iter()
                .all(|level| *level == LevelType::Booth);
        self.is_complete = !self.current_booths.is_empty() || terminal_end;

        tracing::debug!(
            available = ?self.available_level_types,
            booths = self.current_booths.len(),
            complete = self.is_complete,
            "Applied children to filter chain"
        );
    }

    fn clear_derived(&mut self) {
        self.available_level_types.clear();
        self.current_booths.clear();
        self.is_complete = false;
    }
}
