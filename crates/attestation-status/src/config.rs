//! Configuration for status-list retrieval
//!
//! This module defines where the status list is fetched from, how long the
//! single remote attempt may take, and which snapshot backs it up.

use super::error::StatusError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default attestation status endpoint
pub const DEFAULT_STATUS_URL: &str = "https://android.googleapis.com/attestation/status";

/// Status-list retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusConfig {
    /// Remote status endpoint
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,

    /// Try the remote endpoint at all
    ///
    /// When disabled the connectivity probe is skipped and the table always
    /// comes from the local snapshot.
    #[serde(default = "default_true")]
    pub enable_remote_fetch: bool,

    /// TCP/TLS connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Maximum accepted response body size in bytes (default 10 MB)
    #[serde(default = "default_max_response_size")]
    pub max_response_size_bytes: usize,

    /// Reject non-2xx responses before parsing
    ///
    /// Setting this to `false` hands any response body to the JSON parser,
    /// so an error page only fails at the parse step.
    #[serde(default = "default_true")]
    pub require_success_status: bool,

    /// Snapshot file used instead of the embedded one
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Root of the kernel network-interface tree read by the system probe
    #[serde(default = "default_sysfs_net_root")]
    pub sysfs_net_root: PathBuf,
}

impl StatusConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that never touches the network
    pub fn offline() -> Self {
        Self {
            enable_remote_fetch: false,
            ..Self::default()
        }
    }

    /// Configuration backed by a snapshot file instead of the embedded one
    pub fn with_snapshot_file<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            snapshot_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StatusError> {
        let contents = fs::read_to_string(path)?;
        let config: StatusConfig = serde_json::from_str(&contents)
            .map_err(|e| StatusError::ConfigError(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), StatusError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| StatusError::ConfigError(e.to_string()))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), StatusError> {
        if self.enable_remote_fetch {
            let url = self.endpoint_url.trim();
            if url.is_empty() {
                return Err(StatusError::ConfigError(
                    "endpoint_url must not be empty".to_string(),
                ));
            }
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(StatusError::ConfigError(format!(
                    "endpoint_url must be an http(s) URL: {}",
                    url
                )));
            }
        }

        if self.connect_timeout_secs == 0 || self.http_timeout_secs == 0 {
            return Err(StatusError::ConfigError(
                "timeouts must be at least one second".to_string(),
            ));
        }

        if self.max_response_size_bytes == 0 {
            return Err(StatusError::ConfigError(
                "max_response_size_bytes must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            enable_remote_fetch: true,
            connect_timeout_secs: default_connect_timeout(),
            http_timeout_secs: default_http_timeout(),
            max_response_size_bytes: default_max_response_size(),
            require_success_status: true,
            snapshot_path: None,
            sysfs_net_root: default_sysfs_net_root(),
        }
    }
}

// Default value functions for serde

fn default_endpoint_url() -> String {
    DEFAULT_STATUS_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_http_timeout() -> u64 {
    10
}

fn default_max_response_size() -> usize {
    10 * 1024 * 1024 // 10 MB
}

fn default_sysfs_net_root() -> PathBuf {
    PathBuf::from("/sys/class/net")
}
