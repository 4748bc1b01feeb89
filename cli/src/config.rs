//! CLI configuration file (JSON).

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use chainbatch_core::ServiceConfig;
use chainbatch_http::HttpCallerConfig;

use crate::logging::LogConfig;

/// Top-level CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Gateway endpoint; `--url` overrides it.
    #[serde(default)]
    pub gateway_url: Option<String>,
    /// Per-call HTTP deadline in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_request_timeout_ms() -> u64 { 30_000 }

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            gateway_url: None,
            request_timeout_ms: default_request_timeout_ms(),
            service: ServiceConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn http_caller(&self) -> HttpCallerConfig {
        HttpCallerConfig {
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}
