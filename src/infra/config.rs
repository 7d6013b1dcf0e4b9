use crate::domain::RelayIdentity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_RELAY_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";
pub const DEFAULT_TO_NAME: &str = "Orbit-Ops Team";
pub const DEFAULT_FALLBACK_EMAIL: &str = "orbitopsdev@gmail.com";

#[derive(Debug, Error)]
pub enum ResolveStateDirError {
    #[error("home directory not found")]
    HomeDirNotFound,
}

pub fn resolve_state_dir() -> Result<PathBuf, ResolveStateDirError> {
    if let Some(override_dir) = std::env::var_os("ORBIT_TERMINAL_HOME") {
        return Ok(PathBuf::from(override_dir));
    }

    let Some(home) = dirs::home_dir() else {
        return Err(ResolveStateDirError::HomeDirNotFound);
    };
    Ok(home.join(".orbit-terminal"))
}

pub fn default_config_path(state_dir: &Path) -> PathBuf {
    state_dir.join("config.json")
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    /// `0` means wait forever.
    pub timeout_secs: u64,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RELAY_ENDPOINT.to_string(),
            service_id: String::new(),
            template_id: String::new(),
            public_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl RelaySettings {
    pub fn identity(&self) -> RelayIdentity {
        RelayIdentity {
            service_id: self.service_id.clone(),
            template_id: self.template_id.clone(),
            public_key: self.public_key.clone(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSettings {
    pub to_name: String,
    pub fallback_email: String,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            to_name: DEFAULT_TO_NAME.to_string(),
            fallback_email: DEFAULT_FALLBACK_EMAIL.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingSettings {
    pub per_char_ms: u64,
    pub processing_ms: u64,
    pub welcome_ms: u64,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            per_char_ms: 10,
            processing_ms: 300,
            welcome_ms: 500,
        }
    }
}

impl PacingSettings {
    pub fn instant() -> Self {
        Self {
            per_char_ms: 0,
            processing_ms: 0,
            welcome_ms: 0,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub relay: RelaySettings,
    pub contact: ContactSettings,
    pub pacing: PacingSettings,
}

#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("failed to read config {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Reads `path` if it exists; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<TerminalConfig, LoadConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Ok(TerminalConfig::default());
        }
        Err(source) => {
            return Err(LoadConfigError::Read {
                path: path.display().to_string(),
                source,
            });
        }
    };

    serde_json::from_str(&raw).map_err(|source| LoadConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

pub fn apply_env_overrides<F>(config: &mut TerminalConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(value) = non_empty("ORBIT_RELAY_ENDPOINT") {
        config.relay.endpoint = value;
    }
    if let Some(value) = non_empty("ORBIT_RELAY_SERVICE_ID") {
        config.relay.service_id = value;
    }
    if let Some(value) = non_empty("ORBIT_RELAY_TEMPLATE_ID") {
        config.relay.template_id = value;
    }
    if let Some(value) = non_empty("ORBIT_RELAY_PUBLIC_KEY") {
        config.relay.public_key = value;
    }
}

pub fn load_config_with_env(path: &Path) -> Result<TerminalConfig, LoadConfigError> {
    let mut config = load_config(path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}
