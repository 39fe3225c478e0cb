//! Catalog connection and resolver configuration.
//!
//! Loaded from environment variables (`CatalogConfig::from_env`) or from a
//! YAML file (`CatalogConfig::from_file`). Binaries call `dotenvy::dotenv()`
//! before `from_env` so a local `.env` is honoured.

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:21000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// How super-types reachable on more than one path are fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuperTypePolicy {
    /// Fetch on every path; a diamond contributes the shared ancestor's
    /// attributes once per path.
    #[default]
    EveryPath,
    /// Fetch each type at most once per resolution run.
    OncePerType,
}

impl std::str::FromStr for SuperTypePolicy {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "every_path" | "every-path" => Ok(Self::EveryPath),
            "once_per_type" | "once-per-type" => Ok(Self::OncePerType),
            other => Err(CatalogError::Config(format!(
                "unknown super-type policy '{}'",
                other
            ))),
        }
    }
}

/// Knobs for `AttributeResolver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverOptions {
    #[serde(default)]
    pub super_type_policy: SuperTypePolicy,
    /// Super-types deeper than this below the root are not fetched.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            super_type_policy: SuperTypePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ResolverOptions {
    pub fn once_per_type(mut self) -> Self {
        self.super_type_policy = SuperTypePolicy::OncePerType;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Catalog endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub resolver: ResolverOptions,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: None,
            password: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            resolver: ResolverOptions::default(),
        }
    }
}

impl CatalogConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read `ATLAS_URL`, `ATLAS_USER`, `ATLAS_PASSWORD`, `ATLAS_TIMEOUT_SECS`,
    /// `ATLAS_SUPERTYPE_POLICY` and `ATLAS_MAX_DEPTH`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("ATLAS_URL") {
            config.base_url = url;
        }
        config.username = lookup("ATLAS_USER");
        config.password = lookup("ATLAS_PASSWORD");
        if let Some(raw) = lookup("ATLAS_TIMEOUT_SECS") {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                CatalogError::Config(format!("ATLAS_TIMEOUT_SECS is not a number: '{}'", raw))
            })?;
        }
        if let Some(raw) = lookup("ATLAS_SUPERTYPE_POLICY") {
            config.resolver.super_type_policy = raw.parse()?;
        }
        if let Some(raw) = lookup("ATLAS_MAX_DEPTH") {
            config.resolver.max_depth = raw.trim().parse().map_err(|_| {
                CatalogError::Config(format!("ATLAS_MAX_DEPTH is not a number: '{}'", raw))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw)
            .map_err(|e| CatalogError::Config(format!("invalid catalog config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)
            .map_err(|e| CatalogError::Config(format!("invalid base_url '{}': {}", self.base_url, e)))?;
        if self.username.is_some() != self.password.is_some() {
            return Err(CatalogError::Config(
                "username and password must be set together".to_string(),
            ));
        }
        Ok(())
    }
}
