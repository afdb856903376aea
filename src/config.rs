use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::clients::kubeconfig::Kubeconfig;
use crate::error::DashboardError;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/kubeglance/config.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// Defaults to `$KUBECONFIG`, then `~/.kube/config`.
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,
    /// Context to start on; the kubeconfig's `current-context` when unset.
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_listen_port() -> u16 {
    8080
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_page_size() -> u32 {
    500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            kubeconfig: None,
            context: None,
            request_timeout_secs: default_request_timeout_secs(),
            page_size: default_page_size(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, DashboardError> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("reading config {}: {}", path.display(), e))
        })?;
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self, DashboardError> {
        // An empty file deserializes to unit, not to a mapping.
        let cfg: Config = if data.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(data)
                .map_err(|e| DashboardError::Config(format!("parsing config: {}", e)))?
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Like [`Config::load`], except that a missing file at the default
    /// location yields the defaults. An explicitly given path must exist.
    pub fn load_or_default(path: &Path, explicit: bool) -> Result<Self, DashboardError> {
        if !explicit && !path.exists() {
            return Ok(Config::default());
        }
        Self::load(path)
    }

    fn validate(&self) -> Result<(), DashboardError> {
        if self.request_timeout_secs == 0 {
            return Err(DashboardError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(DashboardError::Config(
                "page_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.listen_port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn kubeconfig_path(&self) -> Result<PathBuf, DashboardError> {
        self.kubeconfig
            .clone()
            .or_else(Kubeconfig::default_path)
            .ok_or_else(|| {
                DashboardError::Config(
                    "no kubeconfig configured and no home directory found".to_string(),
                )
            })
    }
}
