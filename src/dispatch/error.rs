use crate::config::ConfigError;
use crate::outcome::CommandResult;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("remote control client is not authenticated")]
    AuthRequired,
    #[error("{message}")]
    TriggerRejected { message: String },
    #[error("triggered run of {workflow} could not be located: {reason}")]
    RunNotDiscovered { workflow: String, reason: String },
}

impl DispatchError {
    /// User-facing rendering of the failure.
    pub fn to_command_result(&self) -> CommandResult {
        match self {
            Self::Config(err) => config_failure(err),
            Self::AuthRequired => CommandResult::failure(
                "GitHub CLI not authenticated",
                vec!["Run 'gh auth login' to authenticate".to_string()],
            ),
            Self::TriggerRejected { .. } | Self::RunNotDiscovered { .. } => {
                CommandResult::failure("Failed to trigger workflow", vec![self.to_string()])
            }
        }
    }
}

pub fn config_failure(err: &ConfigError) -> CommandResult {
    match err {
        ConfigError::ProjectNotFound { name, available } => CommandResult::failure(
            format!("Project '{name}' not found"),
            vec![format!("Available projects: {}", available.join(", "))],
        ),
        other => CommandResult::failure(
            "Failed to load projects.yaml",
            vec![format!("projects.yaml not found or invalid: {other}")],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_not_found_lists_available_projects() {
        let err = DispatchError::from(ConfigError::ProjectNotFound {
            name: "ghost".to_string(),
            available: vec!["alpha".to_string(), "beta".to_string()],
        });
        let result = err.to_command_result();
        assert!(!result.success);
        assert_eq!(result.message, "Project 'ghost' not found");
        assert_eq!(result.errors, vec!["Available projects: alpha, beta"]);
    }

    #[test]
    fn trigger_rejection_surfaces_provider_text() {
        let result = DispatchError::TriggerRejected {
            message: "HTTP 422: Unexpected inputs provided".to_string(),
        }
        .to_command_result();
        assert_eq!(result.message, "Failed to trigger workflow");
        assert_eq!(result.errors, vec!["HTTP 422: Unexpected inputs provided"]);
    }

    #[test]
    fn missing_registry_maps_to_load_failure() {
        let result = config_failure(&ConfigError::RegistryMissing {
            file: "projects.yaml".to_string(),
            searched: "./projects.yaml".to_string(),
        });
        assert_eq!(result.message, "Failed to load projects.yaml");
        assert!(result.errors[0].starts_with("projects.yaml not found or invalid"));
    }
}
