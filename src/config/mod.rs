pub mod error;
pub mod load;
pub mod paths;
pub mod projects;
pub mod tunables;

pub use error::ConfigError;
pub use load::{
    load_project_registry, load_project_registry_from, load_tunables, load_tunables_from,
};
pub use paths::{
    config_candidates, default_log_path, first_existing, CONFIG_DIR_ENV, LOG_FILE_NAME,
    PROJECTS_FILE_NAME, STATE_ROOT_DIR, TUNABLES_FILE_NAME,
};
pub use projects::{
    ProjectEntry, ProjectRegistry, ProjectTarget, DEFAULT_BRANCH, DEFAULT_WORKFLOW_FILE,
};
pub use tunables::{LoggingTunables, RemoteTunables, Tunables, WorkflowTunables};
