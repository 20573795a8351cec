use super::clock::{CancelToken, Clock};
use super::error::DispatchError;
use super::params::{normalize, ParameterWarning};
use crate::config::ProjectTarget;
use crate::remote::{canonical_run_url, RemoteControl};
use crate::schema::{fetch_input_schema, resolve_workflow};
use crate::shared::EventLog;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Wait between creating a run and looking it up, so the provider has
/// registered it.
pub const SETTLE_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunHandle {
    pub run_id: String,
    pub repository: String,
    pub workflow: String,
    pub branch: String,
}

impl RunHandle {
    pub fn url(&self) -> String {
        canonical_run_url(&self.repository, &self.run_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggeredRun {
    pub handle: RunHandle,
    pub parameters: BTreeMap<String, String>,
    pub warnings: Vec<ParameterWarning>,
}

pub struct DispatchTrigger<'a> {
    remote: &'a dyn RemoteControl,
    clock: &'a dyn Clock,
    log: &'a EventLog,
}

impl<'a> DispatchTrigger<'a> {
    pub fn new(remote: &'a dyn RemoteControl, clock: &'a dyn Clock, log: &'a EventLog) -> Self {
        Self { remote, clock, log }
    }

    /// Creates exactly one run and returns the handle of the newest run of
    /// the workflow afterwards. Never retried.
    pub fn trigger(
        &self,
        target: &ProjectTarget,
        params: &BTreeMap<String, String>,
    ) -> Result<TriggeredRun, DispatchError> {
        let repository = target.repository.as_str();
        let workflow = resolve_workflow(self.remote, repository, &target.workflow_file, self.log);
        let schema = fetch_input_schema(self.remote, repository, &workflow, &target.branch, self.log);
        let normalized = normalize(&schema, params);
        for warning in &normalized.warnings {
            self.log.warn("dispatch.params.warning", &warning.to_string());
        }

        self.remote
            .create_run(repository, &workflow, &target.branch, &normalized.parameters)
            .map_err(|err| DispatchError::TriggerRejected {
                message: err.diagnostic(),
            })?;

        // The settle wait is not interruptible.
        self.clock.sleep(SETTLE_DELAY, &CancelToken::new());

        let not_discovered = |reason: String| DispatchError::RunNotDiscovered {
            workflow: workflow.clone(),
            reason,
        };
        let runs = self
            .remote
            .list_runs(repository, &workflow, None, 1)
            .map_err(|err| not_discovered(err.diagnostic()))?;
        let newest = runs
            .first()
            .ok_or_else(|| not_discovered("no runs listed".to_string()))?;

        let handle = RunHandle {
            run_id: newest.run_id(),
            repository: repository.to_string(),
            workflow: workflow.clone(),
            branch: target.branch.clone(),
        };
        self.log.info(
            "dispatch.triggered",
            &format!(
                "{repository} {workflow}@{} run {}",
                handle.branch, handle.run_id
            ),
        );
        Ok(TriggeredRun {
            handle,
            parameters: normalized.parameters,
            warnings: normalized.warnings,
        })
    }
}
