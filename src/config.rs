//! Runtime configuration
//!
//! Settings are resolved in order: built-in defaults, an optional YAML file
//! (explicit path or `NETCOST_CONFIG`), then environment overrides.

use crate::k8s::namespace::DEFAULT_SYSTEM_NAMESPACES;
use crate::{Result, TopologyError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_ENV: &str = "NETCOST_CONFIG";
pub const API_URL_ENV: &str = "NETCOST_API_URL";
pub const CLUSTER_ID_ENV: &str = "NETCOST_CLUSTER_ID";
pub const TIMEOUT_ENV: &str = "NETCOST_TIMEOUT_SECS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub topology: TopologyConfig,
    pub layout: LayoutConfig,
}

/// Connection settings for the dashboard API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub cluster_id: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9090".to_string(),
            timeout_secs: 30,
            cluster_id: None,
        }
    }
}

/// Classification limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// External endpoints kept distinct before collapsing into `external:other`
    pub max_external_endpoints: usize,
    /// Node/IP endpoints kept distinct before collapsing into `infra:other`
    pub max_infra_endpoints: usize,
    pub system_namespaces: Vec<String>,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            max_external_endpoints: 10,
            max_infra_endpoints: 10,
            system_namespaces: DEFAULT_SYSTEM_NAMESPACES
                .iter()
                .map(|ns| ns.to_string())
                .collect(),
        }
    }
}

/// Spacing constants for the tiered layout, in renderer pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub node_spacing: f64,
    pub group_padding: f64,
    pub group_header_height: f64,
    pub tier_gap: f64,
    pub external_row_padding: f64,
    pub external_column_gap: f64,
    pub namespace_column_width: f64,
    pub namespace_gap: f64,
    pub min_group_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 220.0,
            group_padding: 22.0,
            group_header_height: 36.0,
            tier_gap: 90.0,
            external_row_padding: 40.0,
            external_column_gap: 40.0,
            namespace_column_width: 980.0,
            namespace_gap: 40.0,
            min_group_width: 420.0,
        }
    }
}

impl LayoutConfig {
    fn validate(&self) -> Result<()> {
        let spacings = [
            ("node_spacing", self.node_spacing),
            ("namespace_column_width", self.namespace_column_width),
        ];
        for (name, value) in spacings {
            if !value.is_finite() || value <= 0.0 {
                return Err(TopologyError::ConfigError(format!(
                    "layout.{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        let offsets = [
            ("group_padding", self.group_padding),
            ("group_header_height", self.group_header_height),
            ("tier_gap", self.tier_gap),
            ("external_row_padding", self.external_row_padding),
            ("external_column_gap", self.external_column_gap),
            ("namespace_gap", self.namespace_gap),
            ("min_group_width", self.min_group_width),
        ];
        for (name, value) in offsets {
            if !value.is_finite() || value < 0.0 {
                return Err(TopologyError::ConfigError(format!(
                    "layout.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from defaults, an optional file and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match file {
            Some(file) => Self::from_file(&file)?,
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Apply a command-line API URL and validate the result
    pub fn with_api_url(mut self, url: Option<String>) -> Result<Self> {
        if let Some(url) = url {
            self.api.base_url = url;
        }
        self.validate()?;
        Ok(self)
    }

    /// Parse a YAML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());

        let contents = std::fs::read_to_string(path).map_err(|e| {
            TopologyError::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;

        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }

        if let Some(cluster) = lookup(CLUSTER_ID_ENV).filter(|v| !v.trim().is_empty()) {
            self.api.cluster_id = Some(cluster.trim().to_string());
        }

        if let Some(timeout) = lookup(TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
            self.api.timeout_secs = timeout.trim().parse().map_err(|_| {
                TopologyError::ConfigError(format!("invalid {}: {}", TIMEOUT_ENV, timeout))
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(TopologyError::ConfigError(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(TopologyError::ConfigError(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }
        self.layout.validate()
    }
}
