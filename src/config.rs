//! Runtime configuration
//!
//! Values come from built-in defaults, then an optional YAML file, then
//! command-line overrides. `Config::validate` runs after all layers apply.

use crate::logs::DEFAULT_TAIL_LINES;
use crate::{IgniteError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Namespace that receives workloads created from the dashboard. Independent
/// of whichever namespace the operator is currently viewing.
pub const DEFAULT_DEPLOY_NAMESPACE: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    pub listen_addr: String,
    pub kubeconfig: Option<PathBuf>,
    pub deploy_namespace: String,
    pub request_timeout_secs: u64,
    pub log_tail_lines: i64,
    pub refresh_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            kubeconfig: None,
            deploy_namespace: DEFAULT_DEPLOY_NAMESPACE.to_string(),
            request_timeout_secs: 10,
            log_tail_lines: DEFAULT_TAIL_LINES,
            refresh_secs: 5,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|e| {
            IgniteError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Load the file if one was given, otherwise start from defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.listen_socket()?;

        if self.deploy_namespace.trim().is_empty() {
            return Err(IgniteError::ConfigError(
                "deploy_namespace must not be empty".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(IgniteError::ConfigError(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.log_tail_lines <= 0 {
            return Err(IgniteError::ConfigError(
                "log_tail_lines must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn listen_socket(&self) -> Result<SocketAddr> {
        self.listen_addr.parse().map_err(|e| {
            IgniteError::ConfigError(format!("Invalid listen_addr {}: {}", self.listen_addr, e))
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
