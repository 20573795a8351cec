use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_TIMEOUT_SECS: i64 = 3600;
pub const DEFAULT_REMOTE_BINARY: &str = "gh";
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Tunables {
    #[serde(default)]
    pub workflow: WorkflowTunables,
    #[serde(default)]
    pub remote: RemoteTunables,
    #[serde(default)]
    pub logging: LoggingTunables,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowTunables {
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    /// Seconds; zero or negative disables the ceiling.
    #[serde(default = "default_timeout")]
    pub timeout: i64,
    #[serde(default = "default_true")]
    pub show_progress: bool,
    #[serde(default)]
    pub query_retries: u32,
}

impl Default for WorkflowTunables {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            timeout: default_timeout(),
            show_progress: true,
            query_retries: 0,
        }
    }
}

impl WorkflowTunables {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout <= 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout as u64))
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteTunables {
    #[serde(default = "default_remote_binary")]
    pub binary: String,
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

impl Default for RemoteTunables {
    fn default() -> Self {
        Self {
            binary: default_remote_binary(),
            command_timeout_secs: default_command_timeout_secs(),
        }
    }
}

impl RemoteTunables {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingTunables {
    pub path: Option<PathBuf>,
}

impl Tunables {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw, &path.display().to_string())
    }

    pub fn from_yaml_str(raw: &str, origin: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workflow.poll_interval == 0 {
            return Err(ConfigError::Tunables(
                "workflow.poll_interval must be at least 1 second".to_string(),
            ));
        }
        if self.remote.binary.trim().is_empty() {
            return Err(ConfigError::Tunables(
                "remote.binary must be non-empty".to_string(),
            ));
        }
        if self.remote.command_timeout_secs == 0 {
            return Err(ConfigError::Tunables(
                "remote.command_timeout_secs must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_timeout() -> i64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

fn default_remote_binary() -> String {
    DEFAULT_REMOTE_BINARY.to_string()
}

fn default_command_timeout_secs() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}
