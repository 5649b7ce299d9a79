//! Response envelope and paging types for the children endpoint.

use serde::{Deserialize, Serialize};

use super::HierarchyNode;
use crate::error::AppError;

/// Default page size when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Standard `{ success, data, message }` envelope used by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwraps the payload, turning `success: false` into an error.
    pub fn into_result(self) -> Result<T, AppError> {
        if !self.success {
            return Err(AppError::Unsuccessful {
                message: self
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            });
        }
        self.data
            .ok_or_else(|| AppError::Decode("successful response without data".to_string()))
    }
}

/// Page parameters for a children request. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn first(limit: u32) -> Self {
        Self::new(1, limit)
    }

    pub fn next(&self) -> Self {
        Self::new(self.page + 1, self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// Paging metadata the server may attach to a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default, alias = "totalCount")]
    pub total: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// One page of a node's direct children.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildrenPage {
    #[serde(default)]
    pub children: Vec<HierarchyNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<HierarchyNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl ChildrenPage {
    /// Whether this page ends the child list for the given request.
    pub fn is_last(&self, request: PageRequest) -> bool {
        if self.children.is_empty() || (self.children.len() as u32) < request.limit {
            return true;
        }
        match self.pagination.as_ref().and_then(|p| p.total_pages) {
            Some(total_pages) => request.page >= total_pages,
            None => false,
        }
    }
}

/// All children of a node, concatenated across pages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<HierarchyNode>,
    pub children: Vec<HierarchyNode>,
    pub pages: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeId;
    use serde_json::json;

    #[test]
    fn test_envelope_success() {
        let envelope: ApiEnvelope<ChildrenPage> = serde_json::from_value(json!({
            "success": true,
            "data": {
                "children": [
                    {"id": 20, "displayName": "Block20", "levelName": "Block", "parentId": 10}
                ],
                "parent": {"id": 10, "displayName": "Assembly10", "levelName": "Assembly"}
            }
        }))
        .unwrap();

        let page = envelope.into_result().unwrap();
        assert_eq!(page.children.len(), 1);
        assert_eq!(page.parent.unwrap().display_name, "Assembly10");
        assert!(page.pagination.is_none());
    }

    #[test]
    fn test_envelope_failure_carries_message() {
        let envelope: ApiEnvelope<ChildrenPage> = serde_json::from_value(json!({
            "success": false,
            "message": "Level not found"
        }))
        .unwrap();

        match envelope.into_result() {
            Err(AppError::Unsuccessful { message }) => assert_eq!(message, "Level not found"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_envelope_success_without_data() {
        let envelope: ApiEnvelope<ChildrenPage> =
            serde_json::from_value(json!({"success": true})).unwrap();
        assert!(matches!(envelope.into_result(), Err(AppError::Decode(_))));
    }

    #[test]
    fn test_is_last_short_page() {
        let page = ChildrenPage {
            children: vec![HierarchyNode::new(NodeId(1), "B1", "Booth", None)],
            parent: None,
            pagination: None,
        };
        assert!(page.is_last(PageRequest::first(10)));
    }

    #[test]
    fn test_is_last_uses_total_pages() {
        let children = (0..2)
            .map(|i| HierarchyNode::new(NodeId(i), format!("B{i}"), "Booth", None))
            .collect();
        let page = ChildrenPage {
            children,
            parent: None,
            pagination: Some(Pagination {
                page: 2,
                limit: 2,
                total: Some(4),
                total_pages: Some(2),
            }),
        };
        assert!(!page.is_last(PageRequest::new(1, 2)));
        assert!(page.is_last(PageRequest::new(2, 2)));
    }

    #[test]
    fn test_page_request_clamps() {
        let request = PageRequest::new(0, 0);
        assert_eq!(request, PageRequest { page: 1, limit: 1 });
        assert_eq!(request.next().page, 2);
    }
}
