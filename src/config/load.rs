use super::{
    config_candidates, first_existing, ConfigError, ProjectRegistry, Tunables,
    PROJECTS_FILE_NAME, TUNABLES_FILE_NAME,
};
use std::path::PathBuf;

pub fn load_project_registry() -> Result<ProjectRegistry, ConfigError> {
    load_project_registry_from(&config_candidates(PROJECTS_FILE_NAME))
}

pub fn load_project_registry_from(candidates: &[PathBuf]) -> Result<ProjectRegistry, ConfigError> {
    let Some(path) = first_existing(candidates) else {
        return Err(ConfigError::RegistryMissing {
            file: PROJECTS_FILE_NAME.to_string(),
            searched: describe_candidates(candidates),
        });
    };
    let registry = ProjectRegistry::from_path(path)?;
    registry.validate()?;
    Ok(registry)
}

pub fn load_tunables() -> Result<Tunables, ConfigError> {
    load_tunables_from(&config_candidates(TUNABLES_FILE_NAME))
}

/// A missing tunables file is not an error; defaults apply.
pub fn load_tunables_from(candidates: &[PathBuf]) -> Result<Tunables, ConfigError> {
    let tunables = match first_existing(candidates) {
        Some(path) => Tunables::from_path(path)?,
        None => Tunables::default(),
    };
    tunables.validate()?;
    Ok(tunables)
}

fn describe_candidates(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
