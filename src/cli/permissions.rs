//! Permissions command handler.

use std::path::Path;

use color_eyre::Result;

use crate::error::AppError;
use crate::models::LevelAssignments;

use super::{print_json, App};

/// Read a permissions JSON file and map it to level assignments.
pub fn load_assignments(path: &Path) -> Result<LevelAssignments, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| AppError::Decode(format!("{}: {}", path.display(), e)))?;
    LevelAssignments::from_permissions(&value)
}

impl App {
    /// Print the level assignments described by a permissions file.
    pub fn run_permissions(&self, path: &Path) -> Result<()> {
        let assignments = load_assignments(path)?;
        match assignments.deepest_level() {
            Some(level) => tracing::info!("Deepest assigned level: {}", level),
            None => tracing::info!("No level assignments in {}", path.display()),
        }
        print_json(&assignments)
    }
}
