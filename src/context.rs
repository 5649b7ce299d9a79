//! Application context providing the dependency injection root.

use std::sync::Arc;

use crate::cache::SharedCache;
use crate::config::Config;
use crate::di::FromRef;
use crate::error::AppError;
use crate::fetcher::{HierarchyFetcher, HttpHierarchyFetcher};

/// Shared fetcher handle injected into services.
pub type AppFetcher = Arc<dyn HierarchyFetcher>;

/// Root application context for dependency injection.
///
/// Each field can be pulled out with `FromRef<Context>`, so services only
/// name the dependencies they need.
#[derive(Clone)]
pub struct Context {
    /// Remote children endpoint.
    pub fetcher: AppFetcher,
    /// Response cache shared by every service built from this context.
    pub cache: SharedCache,
    /// Application configuration.
    pub config: Arc<Config>,
}

impl Context {
    /// Creates a context around an existing fetcher.
    pub fn new(fetcher: AppFetcher, config: Config) -> Self {
        Self {
            fetcher,
            cache: SharedCache::new(config.cache.ttl()),
            config: Arc::new(config),
        }
    }

    /// Creates a context that talks to the configured HTTP API.
    pub fn connect(config: Config) -> Result<Self, AppError> {
        let fetcher = HttpHierarchyFetcher::new(config.api.clone())?;
        Ok(Self::new(Arc::new(fetcher), config))
    }
}

impl FromRef<Context> for AppFetcher {
    fn from_ref(ctx: &Context) -> Self {
        ctx.fetcher.clone()
    }
}

impl FromRef<Context> for SharedCache {
    fn from_ref(ctx: &Context) -> Self {
        ctx.cache.clone()
    }
}

impl FromRef<Context> for Arc<Config> {
    fn from_ref(ctx: &Context) -> Self {
        ctx.config.clone()
    }
}
