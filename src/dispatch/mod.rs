//! Trigger a workflow run and follow it to completion.

pub mod clock;
pub mod error;
pub mod params;
pub mod poller;
pub mod trigger;

pub use clock::{CancelToken, Clock, ManualClock, SystemClock, SLEEP_SLICE};
pub use error::{config_failure, DispatchError};
pub use params::{
    merge_parameters, normalize, MergedParameters, NormalizedParameters, ParameterWarning,
};
pub use poller::{CompletionPoller, PollSettings, PollState};
pub use trigger::{DispatchTrigger, RunHandle, TriggeredRun, SETTLE_DELAY};

use crate::config::ProjectRegistry;
use crate::outcome::{CommandResult, Outcome};
use crate::remote::{fetch_log_excerpt, Conclusion, RemoteControl};
use crate::shared::EventLog;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchRequest {
    pub project: String,
    pub workflow: Option<String>,
    pub branch: Option<String>,
    /// Raw `KEY=VALUE` overrides in command-line order.
    pub params: Vec<String>,
    pub wait: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub project: String,
    pub triggered: TriggeredRun,
    /// `None` when the caller did not wait for completion.
    pub outcome: Option<Outcome>,
    pub logs: Option<String>,
}

impl DispatchReport {
    pub fn succeeded(&self) -> bool {
        self.outcome.as_ref().map_or(true, |outcome| outcome.succeeded)
    }

    pub fn to_command_result(&self) -> CommandResult {
        let handle = &self.triggered.handle;
        let warnings: Vec<String> = self
            .triggered
            .warnings
            .iter()
            .map(ToString::to_string)
            .collect();
        let data = serde_json::json!({
            "project": self.project,
            "runId": handle.run_id,
            "repository": handle.repository,
            "workflow": handle.workflow,
            "branch": handle.branch,
            "url": handle.url(),
            "parameters": self.triggered.parameters,
            "warnings": warnings,
            "waited": self.outcome.is_some(),
        });

        let Some(outcome) = &self.outcome else {
            return CommandResult::success(
                "Workflow triggered (not waiting for completion)",
                data,
            );
        };
        let mut result = CommandResult::from(outcome.clone());
        if let (Some(fields), Value::Object(summary)) = (result.data.as_object_mut(), data) {
            fields.extend(summary);
        }
        if let Some(logs) = &self.logs {
            result.data["logs"] = serde_json::json!(logs);
        }
        result
    }
}

/// The full dispatch flow: resolve the project, merge parameters, check
/// authentication, trigger, and optionally poll to completion.
pub struct Dispatcher<'a> {
    remote: &'a dyn RemoteControl,
    clock: &'a dyn Clock,
    registry: &'a ProjectRegistry,
    settings: PollSettings,
    log: &'a EventLog,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        remote: &'a dyn RemoteControl,
        clock: &'a dyn Clock,
        registry: &'a ProjectRegistry,
        settings: PollSettings,
        log: &'a EventLog,
    ) -> Self {
        Self {
            remote,
            clock,
            registry,
            settings,
            log,
        }
    }

    pub fn dispatch(
        &self,
        request: &DispatchRequest,
        cancel: &CancelToken,
        heartbeat: &dyn Fn(),
    ) -> Result<DispatchReport, DispatchError> {
        let target = self.registry.target(&request.project)?.with_overrides(
            request.workflow.as_deref(),
            request.branch.as_deref(),
        );
        let merged = merge_parameters(&target.default_parameters, &request.params);
        for ignored in &merged.ignored {
            self.log.warn("dispatch.params.warning", &ignored.to_string());
        }

        if !self.remote.check_auth() {
            self.log.error(
                "auth.missing",
                "remote control client reports no authenticated session",
            );
            return Err(DispatchError::AuthRequired);
        }

        let mut triggered = DispatchTrigger::new(self.remote, self.clock, self.log)
            .trigger(&target, &merged.parameters)?;
        let mut warnings = merged.ignored;
        warnings.append(&mut triggered.warnings);
        triggered.warnings = warnings;

        if !request.wait {
            return Ok(DispatchReport {
                project: request.project.clone(),
                triggered,
                outcome: None,
                logs: None,
            });
        }

        let outcome = CompletionPoller::new(self.remote, self.clock, self.settings, self.log)
            .poll(&triggered.handle, cancel, heartbeat)
            .into_outcome();
        let logs = self.logs_for(&outcome, request.verbose);
        Ok(DispatchReport {
            project: request.project.clone(),
            triggered,
            outcome: Some(outcome),
            logs,
        })
    }

    fn logs_for(&self, outcome: &Outcome, verbose: bool) -> Option<String> {
        let run = outcome.run_info.as_ref().filter(|run| run.is_terminal())?;
        let failed = run.conclusion == Some(Conclusion::Failure);
        if !verbose && !failed {
            return None;
        }
        fetch_log_excerpt(self.remote, &run.repository, &run.run_id, !verbose, self.log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::fake::{run_summary, ScriptedRemote};
    use crate::remote::{LifecycleState, RunStatus};
    use std::time::Duration;

    const DEMO_REGISTRY: &str = r#"
projects:
  demo:
    repo: org/demo
    workflow: deploy.yaml
    branch: main
    defaults:
      env: staging
      message: Hello
"#;

    const DEPLOY_WORKFLOW: &str = r#"
name: Deploy
on:
  workflow_dispatch:
    inputs:
      env:
        type: choice
        options: [staging, production]
      message:
        type: string
"#;

    fn registry() -> ProjectRegistry {
        ProjectRegistry::from_yaml_str(DEMO_REGISTRY, "test").expect("registry")
    }

    fn remote() -> ScriptedRemote {
        ScriptedRemote::new()
            .with_workflow(".github/workflows/deploy.yaml")
            .with_file("org/demo", ".github/workflows/deploy.yaml", DEPLOY_WORKFLOW)
            .with_runs(
                "org/demo",
                "deploy.yaml",
                vec![run_summary(4821, "queued", None, "main")],
            )
    }

    fn status(state: LifecycleState) -> RunStatus {
        RunStatus::new("4821", "org/demo", state)
    }

    fn request(params: &[&str], wait: bool) -> DispatchRequest {
        DispatchRequest {
            project: "demo".to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            wait,
            ..DispatchRequest::default()
        }
    }

    fn settings() -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(30),
            timeout: Some(Duration::from_secs(3600)),
            query_retries: 0,
        }
    }

    #[test]
    fn demo_dispatch_normalizes_and_waits_for_success() {
        let remote = remote().with_statuses(vec![
            Ok(status(LifecycleState::InProgress)),
            Ok(status(LifecycleState::InProgress)),
            Ok(status(LifecycleState::Completed).with_conclusion(Conclusion::Success)),
        ]);
        let clock = ManualClock::new();
        let registry = registry();
        let log = EventLog::disabled();

        let report = Dispatcher::new(&remote, &clock, &registry, settings(), &log)
            .dispatch(&request(&["env=Staging"], true), &CancelToken::new(), &|| {})
            .expect("dispatch");

        assert!(report.succeeded());
        assert_eq!(report.triggered.parameters["env"], "staging");
        assert_eq!(report.triggered.parameters["message"], "Hello");
        assert_eq!(report.triggered.warnings.len(), 1);
        assert_eq!(report.logs, None);

        let result = report.to_command_result();
        assert!(result.success);
        assert!(result.message.contains("success"));
        assert_eq!(result.data["runId"], "4821");
        assert_eq!(result.data["elapsedSeconds"], 60);
        assert_eq!(result.data["runInfo"]["conclusion"], "success");
        assert_eq!(result.data["project"], "demo");
        assert_eq!(result.data["waited"], true);
        assert_eq!(
            result.data["url"],
            "https://github.com/org/demo/actions/runs/4821"
        );
    }

    #[test]
    fn no_wait_returns_after_discovery() {
        let remote = remote();
        let clock = ManualClock::new();
        let registry = registry();
        let log = EventLog::disabled();

        let report = Dispatcher::new(&remote, &clock, &registry, settings(), &log)
            .dispatch(&request(&[], false), &CancelToken::new(), &|| {})
            .expect("dispatch");

        assert!(report.outcome.is_none());
        assert_eq!(remote.status_call_count(), 0);
        assert_eq!(clock.sleeps(), vec![SETTLE_DELAY]);
        let result = report.to_command_result();
        assert!(result.success);
        assert_eq!(result.data["waited"], false);
    }

    #[test]
    fn failed_run_attaches_failed_job_logs() {
        let mut remote = remote().with_statuses(vec![Ok(
            status(LifecycleState::Completed).with_conclusion(Conclusion::Failure)
        )]);
        remote.logs = Some("build\tstep\terror: boom".to_string());
        let clock = ManualClock::new();
        let registry = registry();
        let log = EventLog::disabled();

        let report = Dispatcher::new(&remote, &clock, &registry, settings(), &log)
            .dispatch(&request(&[], true), &CancelToken::new(), &|| {})
            .expect("dispatch");

        assert!(!report.succeeded());
        assert_eq!(report.logs.as_deref(), Some("build\tstep\terror: boom"));
        assert_eq!(*remote.log_requests.lock().expect("log requests"), vec![true]);
        let result = report.to_command_result();
        assert!(!result.success);
        assert_eq!(result.message, "Workflow failure");
        assert!(!result.errors.is_empty());
    }

    #[test]
    fn verbose_requests_full_logs_even_on_success() {
        let mut remote = remote().with_statuses(vec![Ok(
            status(LifecycleState::Completed).with_conclusion(Conclusion::Success)
        )]);
        remote.logs = Some("all good".to_string());
        let clock = ManualClock::new();
        let registry = registry();
        let log = EventLog::disabled();
        let mut req = request(&[], true);
        req.verbose = true;

        let report = Dispatcher::new(&remote, &clock, &registry, settings(), &log)
            .dispatch(&req, &CancelToken::new(), &|| {})
            .expect("dispatch");
        assert_eq!(report.logs.as_deref(), Some("all good"));
        assert_eq!(*remote.log_requests.lock().expect("log requests"), vec![false]);
    }

    #[test]
    fn unauthenticated_client_never_triggers() {
        let mut remote = remote();
        remote.authenticated = false;
        let clock = ManualClock::new();
        let registry = registry();
        let log = EventLog::disabled();

        let err = Dispatcher::new(&remote, &clock, &registry, settings(), &log)
            .dispatch(&request(&[], true), &CancelToken::new(), &|| {})
            .expect_err("auth");
        assert!(matches!(err, DispatchError::AuthRequired));
        assert!(remote.created_runs().is_empty());
        assert_eq!(err.to_command_result().message, "GitHub CLI not authenticated");
    }

    #[test]
    fn unknown_project_lists_available() {
        let remote = remote();
        let clock = ManualClock::new();
        let registry = registry();
        let log = EventLog::disabled();
        let mut req = request(&[], true);
        req.project = "ghost".to_string();

        let err = Dispatcher::new(&remote, &clock, &registry, settings(), &log)
            .dispatch(&req, &CancelToken::new(), &|| {})
            .expect_err("missing project");
        let result = err.to_command_result();
        assert_eq!(result.message, "Project 'ghost' not found");
        assert_eq!(result.errors, vec!["Available projects: demo"]);
    }

    #[test]
    fn malformed_overrides_surface_as_warnings() {
        let remote = remote();
        let clock = ManualClock::new();
        let registry = registry();
        let log = EventLog::disabled();

        let report = Dispatcher::new(&remote, &clock, &registry, settings(), &log)
            .dispatch(&request(&["oops"], false), &CancelToken::new(), &|| {})
            .expect("dispatch");
        assert!(matches!(
            report.triggered.warnings.first(),
            Some(ParameterWarning::Malformed { raw }) if raw == "oops"
        ));
    }

    #[test]
    fn workflow_and_branch_overrides_reach_the_provider() {
        let remote = ScriptedRemote::new()
            .with_workflow(".github/workflows/release.yml")
            .with_runs(
                "org/demo",
                "release.yml",
                vec![run_summary(77, "queued", None, "hotfix")],
            );
        let clock = ManualClock::new();
        let registry = registry();
        let log = EventLog::disabled();
        let mut req = request(&[], false);
        req.workflow = Some("release".to_string());
        req.branch = Some("hotfix".to_string());

        let report = Dispatcher::new(&remote, &clock, &registry, settings(), &log)
            .dispatch(&req, &CancelToken::new(), &|| {})
            .expect("dispatch");
        assert_eq!(report.triggered.handle.run_id, "77");
        let created = remote.created_runs();
        assert_eq!(created[0].workflow, "release.yml");
        assert_eq!(created[0].branch, "hotfix");
    }
}
