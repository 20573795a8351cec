#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{file} not found (searched: {searched})")]
    RegistryMissing { file: String, searched: String },
    #[error("project `{name}` is not configured")]
    ProjectNotFound {
        name: String,
        available: Vec<String>,
    },
    #[error("project registry validation failed: {0}")]
    Registry(String),
    #[error("tunables validation failed: {0}")]
    Tunables(String),
    #[error("failed to resolve home directory for config path")]
    HomeDirectoryUnavailable,
}
