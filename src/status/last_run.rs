use crate::config::ProjectTarget;
use crate::outcome::CommandResult;
use crate::remote::{
    canonical_run_url, fetch_log_excerpt, Conclusion, LifecycleState, RemoteControl, RemoteError,
    RunSummary,
};
use crate::schema::extension_candidates;
use crate::shared::EventLog;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastRun {
    /// The workflow spelling that produced the run.
    pub workflow: String,
    pub run: RunSummary,
}

impl LastRun {
    /// Succeeded, or still running.
    pub fn is_healthy(&self) -> bool {
        self.run.conclusion == Some(Conclusion::Success)
            || self.run.status == LifecycleState::InProgress
    }

    pub fn url(&self, repository: &str) -> String {
        if self.run.url.is_empty() {
            canonical_run_url(repository, &self.run.run_id())
        } else {
            self.run.url.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum ProjectStatus {
    Found(LastRun),
    NoRuns,
    Failed(String),
    Cancelled,
}

impl ProjectStatus {
    pub fn last_run(&self) -> Option<&LastRun> {
        match self {
            Self::Found(last) => Some(last),
            _ => None,
        }
    }
}

/// Newest run of `workflow` under either extension, requested one first.
/// Errors only when every spelling failed.
pub fn find_last_run(
    remote: &dyn RemoteControl,
    repository: &str,
    workflow: &str,
    branch: Option<&str>,
) -> Result<Option<LastRun>, RemoteError> {
    let mut first_error = None;
    let mut listed_any = false;
    for candidate in extension_candidates(workflow) {
        match remote.list_runs(repository, &candidate, branch, 1) {
            Ok(runs) => {
                listed_any = true;
                if let Some(run) = runs.into_iter().next() {
                    return Ok(Some(LastRun {
                        workflow: candidate,
                        run,
                    }));
                }
            }
            Err(err) if first_error.is_none() => first_error = Some(err),
            Err(_) => {}
        }
    }
    match first_error {
        Some(err) if !listed_any => Err(err),
        _ => Ok(None),
    }
}

/// Unit of work for the aggregator: the target's newest run on its branch.
pub fn last_run_for_target(remote: &dyn RemoteControl, target: &ProjectTarget) -> ProjectStatus {
    match find_last_run(
        remote,
        &target.repository,
        &target.workflow_file,
        Some(&target.branch),
    ) {
        Ok(Some(last)) => ProjectStatus::Found(last),
        Ok(None) => ProjectStatus::NoRuns,
        Err(err) => ProjectStatus::Failed(err.diagnostic()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectStatusReport {
    pub project: String,
    pub target: ProjectTarget,
    pub status: ProjectStatus,
    pub logs: Option<String>,
}

impl ProjectStatusReport {
    pub fn to_command_result(&self) -> CommandResult {
        let repository = &self.target.repository;
        match &self.status {
            ProjectStatus::Found(last) => {
                let mut data = serde_json::json!({
                    "project": self.project,
                    "repository": repository,
                    "workflow": last.workflow,
                    "runId": last.run.run_id(),
                    "status": last.run.status,
                    "conclusion": last.run.conclusion,
                    "headBranch": last.run.head_branch,
                    "event": last.run.event,
                    "createdAt": last.run.created_at,
                    "updatedAt": last.run.updated_at,
                    "url": last.url(repository),
                });
                if let Some(logs) = &self.logs {
                    data["logs"] = serde_json::json!(logs);
                }
                CommandResult {
                    success: last.is_healthy(),
                    message: format!("Status: {}", last.run.label()),
                    data,
                    errors: Vec::new(),
                }
            }
            ProjectStatus::NoRuns => CommandResult::failure(
                "No workflow runs found",
                vec![format!(
                    "No runs found for {} in {repository}",
                    self.target.workflow_file
                )],
            ),
            ProjectStatus::Failed(reason) => {
                CommandResult::failure("Failed to get workflow status", vec![reason.clone()])
            }
            ProjectStatus::Cancelled => CommandResult::failure(
                "Status check cancelled",
                vec![format!("{} was not queried", self.project)],
            ),
        }
    }
}

/// Newest run of one project on any branch; with `verbose` the full run log
/// is attached.
pub fn project_status(
    remote: &dyn RemoteControl,
    project: &str,
    target: &ProjectTarget,
    verbose: bool,
    log: &EventLog,
) -> ProjectStatusReport {
    let status = match find_last_run(remote, &target.repository, &target.workflow_file, None) {
        Ok(Some(last)) => ProjectStatus::Found(last),
        Ok(None) => ProjectStatus::NoRuns,
        Err(err) => {
            log.warn(
                "status.project_failed",
                &format!("{project}: {}", err.diagnostic()),
            );
            ProjectStatus::Failed(err.diagnostic())
        }
    };
    let logs = match (&status, verbose) {
        (ProjectStatus::Found(last), true) => fetch_log_excerpt(
            remote,
            &target.repository,
            &last.run.run_id(),
            false,
            log,
        ),
        _ => None,
    };
    ProjectStatusReport {
        project: project.to_string(),
        target: target.clone(),
        status,
        logs,
    }
}
