use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const RUN_URL_HOST: &str = "https://github.com";

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("remote control binary missing: {binary}")]
    MissingBinary { binary: String },
    #[error("`{command}` failed with exit code {exit_code}: {stderr}")]
    NonZeroExit {
        command: String,
        exit_code: i32,
        stderr: String,
    },
    #[error("`{command}` timed out after {timeout_ms}ms")]
    Timeout { command: String, timeout_ms: u64 },
    #[error("`{command}` returned unparsable output: {reason}")]
    ParseFailure { command: String, reason: String },
    #[error("io error running `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl RemoteError {
    /// The provider's own diagnostic where one exists, otherwise the error text.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::NonZeroExit { stderr, .. } if !stderr.trim().is_empty() => {
                stderr.trim().to_string()
            }
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Queued,
    InProgress,
    Completed,
    Other(String),
}

impl LifecycleState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "queued" => Self::Queued,
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LifecycleState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LifecycleState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        crate::shared::serde_ext::parse_via_string(deserializer, "run status", |raw| {
            Ok(Self::parse(raw))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Conclusion {
    Success,
    Failure,
    Cancelled,
    Other(String),
}

impl Conclusion {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "failure" => Self::Failure,
            "cancelled" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
            Self::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Conclusion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The provider reports an in-flight run's conclusion as `""` or `null`.
pub(crate) fn deserialize_conclusion<'de, D>(deserializer: D) -> Result<Option<Conclusion>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|value| !value.trim().is_empty())
        .map(|value| Conclusion::parse(&value)))
}

pub(crate) fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        DateTime::parse_from_rfc3339(value.trim())
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }))
}

pub fn canonical_run_url(repository: &str, run_id: &str) -> String {
    format!("{RUN_URL_HOST}/{repository}/actions/runs/{run_id}")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkflowSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub state: String,
}

impl WorkflowSummary {
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub database_id: u64,
    pub status: LifecycleState,
    #[serde(default, deserialize_with = "deserialize_conclusion")]
    pub conclusion: Option<Conclusion>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub head_branch: String,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl RunSummary {
    pub fn run_id(&self) -> String {
        self.database_id.to_string()
    }

    /// `success`, `in_progress` and friends; conclusion wins once present.
    pub fn label(&self) -> &str {
        self.conclusion
            .as_ref()
            .map(Conclusion::as_str)
            .unwrap_or_else(|| self.status.as_str())
    }
}

/// A point-in-time view of one run. Only ever replaced by a fresh query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatus {
    pub run_id: String,
    pub repository: String,
    pub state: LifecycleState,
    pub conclusion: Option<Conclusion>,
    pub url: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RunStatus {
    pub fn new(run_id: &str, repository: &str, state: LifecycleState) -> Self {
        Self {
            run_id: run_id.to_string(),
            repository: repository.to_string(),
            state,
            conclusion: None,
            url: canonical_run_url(repository, run_id),
            name: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_conclusion(mut self, conclusion: Conclusion) -> Self {
        self.conclusion = Some(conclusion);
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn conclusion_label(&self) -> &str {
        self.conclusion
            .as_ref()
            .map(Conclusion::as_str)
            .unwrap_or("unknown")
    }
}
