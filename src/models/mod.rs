//! Domain models for the administrative hierarchy.

mod level;
mod node;
mod permissions;
mod response;

pub use level::{classify_level, LevelClassification, LevelPriority, LevelType, PRIORITY_TABLE};
pub use node::{AssignedUser, HierarchyNode, NodeId};
pub use permissions::{AssignedLevel, LevelAssignments, PermissionCategory};
pub use response::{
    ApiEnvelope, ChildSet, ChildrenPage, PageRequest, Pagination, DEFAULT_PAGE_SIZE,
};
