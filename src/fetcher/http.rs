//! reqwest-backed fetcher for the hierarchy REST API.

use async_trait::async_trait;
use reqwest::Client;

use super::HierarchyFetcher;
use crate::config::ApiConfig;
use crate::error::AppError;
use crate::models::{ApiEnvelope, ChildrenPage, NodeId, PageRequest};

/// Longest slice of an error body kept in error messages.
const ERROR_BODY_LIMIT: usize = 200;

/// HTTP client for the children endpoint.
#[derive(Debug, Clone)]
pub struct HttpHierarchyFetcher {
    http: Client,
    api: ApiConfig,
}

impl HttpHierarchyFetcher {
    pub fn new(api: ApiConfig) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(api.timeout())
            .user_agent(concat!("hierdisc/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, api })
    }

    /// Turns a non-success response into an error, preferring the envelope's
    /// `message` when the body carries one.
    async fn error_from_response(response: reqwest::Response) -> AppError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body)
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or_else(|| body.chars().take(ERROR_BODY_LIMIT).collect());

        AppError::Api { status, message }
    }
}

#[async_trait]
impl HierarchyFetcher for HttpHierarchyFetcher {
    async fn fetch_children(
        &self,
        node: NodeId,
        page: PageRequest,
    ) -> Result<ChildrenPage, AppError> {
        let url = self.api.children_url(node);
        tracing::debug!(url = %url, page = page.page, limit = page.limit, "Fetching children");

        let mut request = self
            .http
            .get(&url)
            .query(&[("page", page.page), ("limit", page.limit)]);
        if let Some(token) = &self.api.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body = response.text().await?;
        let envelope: ApiEnvelope<ChildrenPage> = serde_json::from_str(&body)
            .map_err(|e| AppError::Decode(format!("children of node {}: {}", node, e)))?;
        envelope.into_result()
    }
}
