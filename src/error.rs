//! Application error types.

use thiserror::Error;

use crate::models::{LevelType, NodeId};

/// Application-level errors for hierarchy discovery.
#[derive(Error, Debug)]
pub enum AppError {
    // Transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("API request failed: {message}")]
    Unsuccessful { message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Stopped paging children of node {node} after {pages} pages")]
    PaginationLimit { node: NodeId, pages: u32 },

    // Filter chain errors
    #[error("Stale response for {level} {node}: a newer selection replaced it")]
    StaleSelection { node: NodeId, level: LevelType },

    #[error("Node {node} not found among {level} options")]
    NodeNotFound { node: NodeId, level: LevelType },

    // Permission errors
    #[error("Unknown permission category: {0}")]
    UnknownPermissionCategory(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Http(_) => "HTTP_ERROR",
            AppError::Api { .. } => "API_ERROR",
            AppError::Unsuccessful { .. } => "REQUEST_FAILED",
            AppError::Decode(_) => "DECODE_ERROR",
            AppError::PaginationLimit { .. } => "PAGINATION_LIMIT",
            AppError::StaleSelection { .. } => "STALE_SELECTION",
            AppError::NodeNotFound { .. } => "NODE_NOT_FOUND",
            AppError::UnknownPermissionCategory(_) => "UNKNOWN_PERMISSION_CATEGORY",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the error came from fetching hierarchy data, i.e. a caller
    /// may offer to try again.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            AppError::Http(_)
                | AppError::Api { .. }
                | AppError::Unsuccessful { .. }
                | AppError::Decode(_)
                | AppError::PaginationLimit { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failures() {
        assert!(AppError::Unsuccessful {
            message: "nope".to_string()
        }
        .is_fetch_failure());
        assert!(AppError::Api {
            status: 502,
            message: "bad gateway".to_string()
        }
        .is_fetch_failure());
        assert!(!AppError::StaleSelection {
            node: NodeId(20),
            level: LevelType::Block
        }
        .is_fetch_failure());
    }

    #[test]
    fn test_display_and_code() {
        let err = AppError::StaleSelection {
            node: NodeId(20),
            level: LevelType::Block,
        };
        assert_eq!(err.code(), "STALE_SELECTION");
        assert_eq!(
            err.to_string(),
            "Stale response for Block 20: a newer selection replaced it"
        );
    }
}
