use crate::error::{ChanopsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Tool configuration, loaded from a YAML file. Every field has a
/// default so a partial file (or none at all) still yields a usable
/// config; credentials come from flags or the environment, never from
/// defaults here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Explicit kubeconfig path; `None` uses the ambient client config.
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_deployment")]
    pub deployment: String,

    /// Container whose environment holds the channel entries; empty
    /// selects the first container in the pod template.
    #[serde(default)]
    pub container: String,

    /// MySQL connection string for the channel metadata table.
    #[serde(default)]
    pub database_url: String,

    #[serde(default = "default_stamp_path")]
    pub stamp_path: PathBuf,

    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes: i64,
}

fn default_namespace() -> String {
    "payments".to_string()
}

fn default_deployment() -> String {
    "repayment-admin-jobs".to_string()
}

fn default_stamp_path() -> PathBuf {
    std::env::temp_dir().join(".chanops_last_update")
}

fn default_cooldown_minutes() -> i64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            namespace: default_namespace(),
            deployment: default_deployment(),
            container: String::new(),
            database_url: String::new(),
            stamp_path: default_stamp_path(),
            cooldown_minutes: default_cooldown_minutes(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(ChanopsError::Config("namespace must not be empty".into()));
        }
        if self.deployment.is_empty() {
            return Err(ChanopsError::Config("deployment must not be empty".into()));
        }
        if self.cooldown_minutes < 0 {
            return Err(ChanopsError::Config(
                "cooldown_minutes must not be negative".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
