use super::clock::{CancelToken, Clock};
use super::trigger::RunHandle;
use crate::config::WorkflowTunables;
use crate::outcome::Outcome;
use crate::remote::{Conclusion, RemoteControl, RunStatus};
use crate::shared::EventLog;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    /// `None` polls until the run finishes.
    pub timeout: Option<Duration>,
    /// Consecutive failed status queries tolerated before giving up.
    pub query_retries: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::from_tunables(&WorkflowTunables::default())
    }
}

impl PollSettings {
    pub fn from_tunables(tunables: &WorkflowTunables) -> Self {
        Self {
            interval: tunables.poll_interval(),
            timeout: tunables.timeout(),
            query_retries: tunables.query_retries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Polling {
        cycle: u32,
        last: Option<RunStatus>,
        consecutive_failures: u32,
    },
    Completed {
        status: RunStatus,
        elapsed: Duration,
    },
    TimedOut {
        status: RunStatus,
        elapsed: Duration,
    },
    QueryFailed {
        reason: String,
        last: Option<RunStatus>,
        elapsed: Duration,
    },
    Cancelled {
        last: Option<RunStatus>,
        elapsed: Duration,
    },
}

impl PollState {
    fn start() -> Self {
        Self::Polling {
            cycle: 0,
            last: None,
            consecutive_failures: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Polling { .. })
    }

    pub fn into_outcome(self) -> Outcome {
        match self {
            Self::Polling { last, .. } => Outcome {
                succeeded: false,
                message: "Workflow still running".to_string(),
                elapsed_seconds: 0,
                run_info: last,
                errors: vec!["Monitoring stopped before the run finished".to_string()],
            },
            Self::Completed { status, elapsed } => {
                let succeeded = status.conclusion == Some(Conclusion::Success);
                let label = status.conclusion_label().to_string();
                let errors = if succeeded {
                    Vec::new()
                } else {
                    vec![format!("Run {} concluded with {label}", status.run_id)]
                };
                Outcome {
                    succeeded,
                    message: format!("Workflow {label}"),
                    elapsed_seconds: elapsed.as_secs(),
                    run_info: Some(status),
                    errors,
                }
            }
            Self::TimedOut { status, elapsed } => Outcome {
                succeeded: false,
                message: "Workflow timed out".to_string(),
                elapsed_seconds: elapsed.as_secs(),
                run_info: Some(status),
                errors: vec![format!("Timeout after {}s", elapsed.as_secs())],
            },
            Self::QueryFailed {
                reason,
                last,
                elapsed,
            } => Outcome {
                succeeded: false,
                message: "Failed to get workflow status".to_string(),
                elapsed_seconds: elapsed.as_secs(),
                run_info: last,
                errors: vec![format!("Could not retrieve run status: {reason}")],
            },
            Self::Cancelled { last, elapsed } => Outcome {
                succeeded: false,
                message: "Monitoring cancelled".to_string(),
                elapsed_seconds: elapsed.as_secs(),
                run_info: last,
                errors: vec![format!(
                    "Cancelled after {}s; the remote run keeps going",
                    elapsed.as_secs()
                )],
            },
        }
    }
}

/// Drives one run from `Polling` to a terminal [`PollState`].
pub struct CompletionPoller<'a> {
    remote: &'a dyn RemoteControl,
    clock: &'a dyn Clock,
    settings: PollSettings,
    log: &'a EventLog,
}

impl<'a> CompletionPoller<'a> {
    pub fn new(
        remote: &'a dyn RemoteControl,
        clock: &'a dyn Clock,
        settings: PollSettings,
        log: &'a EventLog,
    ) -> Self {
        Self {
            remote,
            clock,
            settings,
            log,
        }
    }

    pub fn poll(&self, handle: &RunHandle, cancel: &CancelToken, heartbeat: &dyn Fn()) -> PollState {
        let started = self.clock.now();
        let mut state = PollState::start();
        while !state.is_terminal() {
            state = self.step(state, handle, started, cancel, heartbeat);
        }
        self.log_terminal(handle, &state);
        state
    }

    fn step(
        &self,
        state: PollState,
        handle: &RunHandle,
        started: Duration,
        cancel: &CancelToken,
        heartbeat: &dyn Fn(),
    ) -> PollState {
        let PollState::Polling {
            cycle,
            last,
            consecutive_failures,
        } = state
        else {
            return state;
        };
        if cancel.is_cancelled() {
            return PollState::Cancelled {
                last,
                elapsed: self.elapsed_since(started),
            };
        }

        match self.remote.get_run_status(&handle.repository, &handle.run_id) {
            Err(err) => {
                let failures = consecutive_failures + 1;
                if failures > self.settings.query_retries {
                    return PollState::QueryFailed {
                        reason: err.diagnostic(),
                        last,
                        elapsed: self.elapsed_since(started),
                    };
                }
                self.log.warn(
                    "poll.query_retry",
                    &format!(
                        "run {} status query failed ({failures}/{}): {err}",
                        handle.run_id, self.settings.query_retries
                    ),
                );
                self.wait(cycle, last, failures, started, cancel, heartbeat)
            }
            Ok(status) => {
                let elapsed = self.elapsed_since(started);
                if status.is_terminal() {
                    return PollState::Completed { status, elapsed };
                }
                if self
                    .settings
                    .timeout
                    .is_some_and(|limit| elapsed.as_secs() > limit.as_secs())
                {
                    return PollState::TimedOut { status, elapsed };
                }
                self.wait(cycle, Some(status), 0, started, cancel, heartbeat)
            }
        }
    }

    fn wait(
        &self,
        cycle: u32,
        last: Option<RunStatus>,
        consecutive_failures: u32,
        started: Duration,
        cancel: &CancelToken,
        heartbeat: &dyn Fn(),
    ) -> PollState {
        heartbeat();
        if !self.clock.sleep(self.settings.interval, cancel) {
            return PollState::Cancelled {
                last,
                elapsed: self.elapsed_since(started),
            };
        }
        PollState::Polling {
            cycle: cycle + 1,
            last,
            consecutive_failures,
        }
    }

    fn elapsed_since(&self, started: Duration) -> Duration {
        self.clock.now().saturating_sub(started)
    }

    fn log_terminal(&self, handle: &RunHandle, state: &PollState) {
        let run = format!("{}#{}", handle.repository, handle.run_id);
        match state {
            PollState::Completed { status, elapsed } => self.log.info(
                "poll.completed",
                &format!(
                    "{run} concluded {} after {}s",
                    status.conclusion_label(),
                    elapsed.as_secs()
                ),
            ),
            PollState::TimedOut { elapsed, .. } => self.log.warn(
                "poll.timed_out",
                &format!("{run} still running after {}s", elapsed.as_secs()),
            ),
            PollState::QueryFailed { reason, .. } => {
                self.log.error("poll.query_failed", &format!("{run}: {reason}"))
            }
            PollState::Cancelled { elapsed, .. } => self.log.warn(
                "poll.cancelled",
                &format!("{run} monitoring cancelled after {}s", elapsed.as_secs()),
            ),
            PollState::Polling { .. } => {}
        }
    }
}
