//! Boundary to the CI provider. The engine only ever talks to
//! [`RemoteControl`]; [`GhCli`] is the production implementation.

use std::collections::BTreeMap;

pub mod gh_cli;
pub mod invocation;
pub mod logs;
pub mod output_parse;
pub mod runner;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use gh_cli::GhCli;
pub use invocation::GhInvocation;
pub use logs::{fetch_log_excerpt, truncate_logs, LOG_EXCERPT_LIMIT};
pub use types::{
    canonical_run_url, CommandOutput, Conclusion, LifecycleState, RemoteError, RunStatus,
    RunSummary, WorkflowSummary,
};

/// Provider operations consumed by the dispatch and status engines.
///
/// Implementations must tolerate concurrent independent calls; the status
/// aggregator shares one instance across worker threads.
pub trait RemoteControl: Send + Sync {
    fn check_auth(&self) -> bool;

    fn list_workflows(&self, repository: &str) -> Result<Vec<WorkflowSummary>, RemoteError>;

    fn fetch_file_content(
        &self,
        repository: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<String, RemoteError>;

    fn create_run(
        &self,
        repository: &str,
        workflow: &str,
        branch: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<(), RemoteError>;

    /// Most recent first.
    fn list_runs(
        &self,
        repository: &str,
        workflow: &str,
        branch: Option<&str>,
        limit: u32,
    ) -> Result<Vec<RunSummary>, RemoteError>;

    fn get_run_status(&self, repository: &str, run_id: &str) -> Result<RunStatus, RemoteError>;

    fn get_run_logs(
        &self,
        repository: &str,
        run_id: &str,
        failed_only: bool,
    ) -> Result<String, RemoteError>;
}
