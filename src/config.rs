//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/hierdisc/config.toml` (XDG) or platform config dir
//! 2. Project config: `.hierdisc.toml`
//! 3. Environment variables: `HIERDISC_*`, nested with `__`
//!    (e.g. `HIERDISC_API__BASE_URL`)
//!
//! # Example
//!
//! ```toml
//! [api]
//! base_url = "https://dashboard.example.org/api"
//! token = "..."
//!
//! [cache]
//! ttl_secs = 300
//!
//! [discovery]
//! page_size = 100
//! max_depth = 6
//! ```

use std::ops::Deref;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

use crate::models::{NodeId, DEFAULT_PAGE_SIZE};

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// Remote hierarchy API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API (required), without a trailing slash.
    pub base_url: String,
    /// Bearer token sent with every request.
    #[serde(default)]
    pub token: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Path template for the children endpoint; `{id}` is replaced by the node id.
    #[serde(default = "default_children_path")]
    pub children_path: String,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full URL of the children endpoint for a node.
    pub fn children_url(&self, node: NodeId) -> String {
        let path = self.children_path.replace("{id}", &node.to_string());
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// Limits for paging and the booth sweep.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Upper bound on pages fetched for a single node.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Maximum depth the booth sweep descends below its root.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_children_path() -> String {
    "hierarchy/{id}/children".to_string()
}

/// Cached responses expire after five minutes.
fn default_ttl_secs() -> u64 {
    300
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_max_pages() -> u32 {
    50
}

fn default_max_depth() -> u32 {
    6
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// The layered provider stack used by [`Config::load`].
    pub fn figment() -> Figment {
        let user_config = Self::user_config_path();

        Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(user_config))
            // Layer 2: Project config
            .merge(Toml::file(".hierdisc.toml"))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed("HIERDISC_").split("__"))
    }

    /// Extract a config from any figment, e.g. one built from strings in tests.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(ConfigError::from)
    }

    /// User config path: ~/.config/hierdisc/config.toml (XDG) or platform config dir.
    fn user_config_path() -> std::path::PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("hierdisc").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("hierdisc").join("config.toml"))
            .unwrap_or_default()
    }
}
