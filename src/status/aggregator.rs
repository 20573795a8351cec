use super::last_run::{last_run_for_target, ProjectStatus};
use crate::config::ProjectTarget;
use crate::dispatch::CancelToken;
use crate::outcome::CommandResult;
use crate::remote::RemoteControl;
use crate::shared::EventLog;
use serde::Serialize;
use std::any::Any;
use std::collections::{BTreeMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use std::thread;

pub const STATUS_MAX_CONCURRENCY: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub results: BTreeMap<String, ProjectStatus>,
}

impl StatusReport {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Every found run succeeded or is still running. Projects without a
    /// run, or whose lookup failed, do not count against this.
    pub fn all_succeeded(&self) -> bool {
        self.results
            .values()
            .filter_map(ProjectStatus::last_run)
            .all(|last| last.is_healthy())
    }

    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.results
            .iter()
            .filter_map(|(name, status)| match status {
                ProjectStatus::Failed(reason) => Some((name.as_str(), reason.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn to_command_result(&self) -> CommandResult {
        let data = serde_json::json!({ "results": self.results });
        CommandResult {
            success: self.all_succeeded(),
            message: format!("Checked {} projects", self.len()),
            data,
            errors: self
                .failures()
                .into_iter()
                .map(|(name, reason)| format!("{name}: {reason}"))
                .collect(),
        }
    }
}

/// Looks up the newest run of many projects with bounded parallelism.
pub struct StatusAggregator {
    remote: Arc<dyn RemoteControl>,
    max_concurrency: usize,
    log: EventLog,
}

impl StatusAggregator {
    pub fn new(remote: Arc<dyn RemoteControl>, log: EventLog) -> Self {
        Self {
            remote,
            max_concurrency: STATUS_MAX_CONCURRENCY,
            log,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// One result per project, keyed by name. No unit starts after `cancel`
    /// fires; those report [`ProjectStatus::Cancelled`].
    pub fn fetch_all(
        &self,
        projects: &BTreeMap<String, ProjectTarget>,
        cancel: &CancelToken,
    ) -> StatusReport {
        let (result_tx, result_rx) = mpsc::channel::<(String, ProjectStatus)>();
        let mut pending: VecDeque<(String, ProjectTarget)> = projects
            .iter()
            .map(|(name, target)| (name.clone(), target.clone()))
            .collect();
        let mut report = StatusReport::default();
        let mut in_flight = 0usize;

        loop {
            while in_flight < self.max_concurrency && !cancel.is_cancelled() {
                let Some((name, target)) = pending.pop_front() else {
                    break;
                };
                let tx = result_tx.clone();
                let remote = Arc::clone(&self.remote);
                let _ = thread::spawn(move || {
                    let status = panic::catch_unwind(AssertUnwindSafe(|| {
                        last_run_for_target(remote.as_ref(), &target)
                    }))
                    .unwrap_or_else(|payload| ProjectStatus::Failed(panic_message(payload)));
                    let _ = tx.send((name, status));
                });
                in_flight += 1;
            }

            if in_flight == 0 {
                break;
            }

            let Ok((name, status)) = result_rx.recv() else {
                break;
            };
            in_flight -= 1;
            if let ProjectStatus::Failed(reason) = &status {
                self.log
                    .warn("status.project_failed", &format!("{name}: {reason}"));
            }
            report.results.insert(name, status);
        }

        for (name, _) in pending {
            report.results.insert(name, ProjectStatus::Cancelled);
        }
        report
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("status lookup panicked: {detail}")
}
