use super::ConfigError;
use crate::shared::serde_ext::deserialize_scalar_map;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_WORKFLOW_FILE: &str = "workflow.yaml";
pub const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProjectRegistry {
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectEntry {
    pub repo: String,
    #[serde(default = "default_workflow")]
    pub workflow: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default, deserialize_with = "deserialize_scalar_map")]
    pub defaults: BTreeMap<String, String>,
}

/// Everything needed to dispatch or inspect one project's workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTarget {
    pub repository: String,
    pub workflow_file: String,
    pub branch: String,
    pub default_parameters: BTreeMap<String, String>,
}

impl ProjectTarget {
    pub fn with_overrides(self, workflow: Option<&str>, branch: Option<&str>) -> Self {
        Self {
            workflow_file: workflow
                .filter(|w| !w.trim().is_empty())
                .map(str::to_string)
                .unwrap_or(self.workflow_file),
            branch: branch
                .filter(|b| !b.trim().is_empty())
                .map(str::to_string)
                .unwrap_or(self.branch),
            ..self
        }
    }
}

impl From<&ProjectEntry> for ProjectTarget {
    fn from(entry: &ProjectEntry) -> Self {
        Self {
            repository: entry.repo.clone(),
            workflow_file: entry.workflow.clone(),
            branch: entry.branch.clone(),
            default_parameters: entry.defaults.clone(),
        }
    }
}

impl ProjectRegistry {
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
        for (name, entry) in &self.projects {
            let repo = entry.repo.trim();
            let valid_repo = repo
                .split_once('/')
                .is_some_and(|(owner, repo)| !owner.is_empty() && !repo.is_empty());
            if !valid_repo {
                return Err(ConfigError::Registry(format!(
                    "project `{name}` has invalid repo `{}`; expected `owner/name`",
                    entry.repo
                )));
            }
            if entry.workflow.trim().is_empty() {
                return Err(ConfigError::Registry(format!(
                    "project `{name}` has an empty workflow"
                )));
            }
            if entry.branch.trim().is_empty() {
                return Err(ConfigError::Registry(format!(
                    "project `{name}` has an empty branch"
                )));
            }
        }
        Ok(())
    }

    pub fn names(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn target(&self, name: &str) -> Result<ProjectTarget, ConfigError> {
        self.projects
            .get(name)
            .map(ProjectTarget::from)
            .ok_or_else(|| ConfigError::ProjectNotFound {
                name: name.to_string(),
                available: self.names(),
            })
    }

    pub fn targets(&self) -> BTreeMap<String, ProjectTarget> {
        self.projects
            .iter()
            .map(|(name, entry)| (name.clone(), ProjectTarget::from(entry)))
            .collect()
    }
}

fn default_workflow() -> String {
    DEFAULT_WORKFLOW_FILE.to_string()
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}
