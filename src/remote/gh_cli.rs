use crate::config::RemoteTunables;
use crate::remote::invocation::{self, GhInvocation};
use crate::remote::output_parse::{parse_run_list, parse_run_view, parse_workflow_list};
use crate::remote::runner::{run_checked, run_command};
use crate::remote::{CommandOutput, RemoteControl, RemoteError, RunStatus, RunSummary, WorkflowSummary};
use std::collections::BTreeMap;
use std::time::Duration;

/// [`RemoteControl`] backed by the GitHub CLI.
#[derive(Debug, Clone)]
pub struct GhCli {
    pub binary: String,
    pub timeout: Duration,
}

impl Default for GhCli {
    fn default() -> Self {
        Self::from_tunables(&RemoteTunables::default())
    }
}

impl GhCli {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn from_tunables(tunables: &RemoteTunables) -> Self {
        Self::new(tunables.binary.clone(), tunables.command_timeout())
    }

    fn run(&self, invocation: &GhInvocation) -> Result<CommandOutput, RemoteError> {
        run_checked(&self.binary, invocation, self.timeout)
    }

    fn parse_failure(&self, invocation: &GhInvocation, reason: String) -> RemoteError {
        RemoteError::ParseFailure {
            command: invocation.command_form(&self.binary),
            reason,
        }
    }
}

impl RemoteControl for GhCli {
    fn check_auth(&self) -> bool {
        run_command(&self.binary, &invocation::auth_status(), self.timeout)
            .map(|output| output.success())
            .unwrap_or(false)
    }

    fn list_workflows(&self, repository: &str) -> Result<Vec<WorkflowSummary>, RemoteError> {
        let invocation = invocation::workflow_list(repository);
        let output = self.run(&invocation)?;
        parse_workflow_list(&output.stdout).map_err(|reason| self.parse_failure(&invocation, reason))
    }

    fn fetch_file_content(
        &self,
        repository: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<String, RemoteError> {
        let output = self.run(&invocation::file_contents(repository, path, git_ref))?;
        Ok(output.stdout)
    }

    fn create_run(
        &self,
        repository: &str,
        workflow: &str,
        branch: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<(), RemoteError> {
        self.run(&invocation::workflow_run(repository, workflow, branch, inputs))?;
        Ok(())
    }

    fn list_runs(
        &self,
        repository: &str,
        workflow: &str,
        branch: Option<&str>,
        limit: u32,
    ) -> Result<Vec<RunSummary>, RemoteError> {
        let invocation = invocation::run_list(repository, workflow, branch, limit);
        let output = self.run(&invocation)?;
        parse_run_list(&output.stdout).map_err(|reason| self.parse_failure(&invocation, reason))
    }

    fn get_run_status(&self, repository: &str, run_id: &str) -> Result<RunStatus, RemoteError> {
        let invocation = invocation::run_view(repository, run_id);
        let output = self.run(&invocation)?;
        parse_run_view(&output.stdout, repository, run_id)
            .map_err(|reason| self.parse_failure(&invocation, reason))
    }

    fn get_run_logs(
        &self,
        repository: &str,
        run_id: &str,
        failed_only: bool,
    ) -> Result<String, RemoteError> {
        let output = self.run(&invocation::run_logs(repository, run_id, failed_only))?;
        Ok(output.stdout)
    }
}
