use super::*;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CreatedRun {
    pub repository: String,
    pub workflow: String,
    pub branch: String,
    pub inputs: BTreeMap<String, String>,
}

/// In-memory [`RemoteControl`] with scripted answers.
#[derive(Debug, Default)]
pub(crate) struct ScriptedRemote {
    pub authenticated: bool,
    pub workflows: Vec<WorkflowSummary>,
    pub workflows_error: Option<String>,
    pub files: BTreeMap<String, String>,
    pub create_error: Option<String>,
    pub runs: BTreeMap<String, Vec<RunSummary>>,
    pub failing_repos: BTreeMap<String, String>,
    pub panicking_repos: Vec<String>,
    pub list_latency: Duration,
    pub statuses: Mutex<VecDeque<Result<RunStatus, String>>>,
    pub status_fallback: Option<RunStatus>,
    pub logs: Option<String>,
    pub created: Mutex<Vec<CreatedRun>>,
    pub status_calls: Mutex<u32>,
    pub log_requests: Mutex<Vec<bool>>,
}

fn scripted_error(message: &str) -> RemoteError {
    RemoteError::NonZeroExit {
        command: "scripted".to_string(),
        exit_code: 1,
        stderr: message.to_string(),
    }
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self {
            authenticated: true,
            ..Self::default()
        }
    }

    pub fn with_workflow(mut self, path: &str) -> Self {
        self.workflows.push(WorkflowSummary {
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            state: "active".to_string(),
        });
        self
    }

    pub fn with_file(mut self, repository: &str, path: &str, content: &str) -> Self {
        self.files
            .insert(format!("{repository}:{path}"), content.to_string());
        self
    }

    pub fn with_runs(mut self, repository: &str, workflow: &str, runs: Vec<RunSummary>) -> Self {
        self.runs.insert(format!("{repository}:{workflow}"), runs);
        self
    }

    pub fn with_statuses(self, statuses: Vec<Result<RunStatus, String>>) -> Self {
        *self.statuses.lock().expect("statuses lock") = statuses.into();
        self
    }

    pub fn created_runs(&self) -> Vec<CreatedRun> {
        self.created.lock().expect("created lock").clone()
    }

    pub fn status_call_count(&self) -> u32 {
        *self.status_calls.lock().expect("status calls lock")
    }
}

pub(crate) fn run_summary(
    id: u64,
    status: &str,
    conclusion: Option<&str>,
    branch: &str,
) -> RunSummary {
    RunSummary {
        database_id: id,
        status: LifecycleState::parse(status),
        conclusion: conclusion.map(Conclusion::parse),
        created_at: None,
        updated_at: None,
        head_branch: branch.to_string(),
        event: "workflow_dispatch".to_string(),
        name: "build".to_string(),
        url: String::new(),
    }
}

impl RemoteControl for ScriptedRemote {
    fn check_auth(&self) -> bool {
        self.authenticated
    }

    fn list_workflows(&self, _repository: &str) -> Result<Vec<WorkflowSummary>, RemoteError> {
        match &self.workflows_error {
            Some(message) => Err(scripted_error(message)),
            None => Ok(self.workflows.clone()),
        }
    }

    fn fetch_file_content(
        &self,
        repository: &str,
        path: &str,
        _git_ref: Option<&str>,
    ) -> Result<String, RemoteError> {
        self.files
            .get(&format!("{repository}:{path}"))
            .cloned()
            .ok_or_else(|| scripted_error("HTTP 404: Not Found"))
    }

    fn create_run(
        &self,
        repository: &str,
        workflow: &str,
        branch: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<(), RemoteError> {
        if let Some(message) = &self.create_error {
            return Err(scripted_error(message));
        }
        self.created.lock().expect("created lock").push(CreatedRun {
            repository: repository.to_string(),
            workflow: workflow.to_string(),
            branch: branch.to_string(),
            inputs: inputs.clone(),
        });
        Ok(())
    }

    fn list_runs(
        &self,
        repository: &str,
        workflow: &str,
        branch: Option<&str>,
        limit: u32,
    ) -> Result<Vec<RunSummary>, RemoteError> {
        if !self.list_latency.is_zero() {
            thread::sleep(self.list_latency);
        }
        if self.panicking_repos.iter().any(|r| r == repository) {
            panic!("scripted panic for {repository}");
        }
        if let Some(message) = self.failing_repos.get(repository) {
            return Err(scripted_error(message));
        }
        Ok(self
            .runs
            .get(&format!("{repository}:{workflow}"))
            .map(|runs| {
                runs.iter()
                    .filter(|run| branch.map_or(true, |b| run.head_branch == b))
                    .take(limit as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get_run_status(&self, repository: &str, run_id: &str) -> Result<RunStatus, RemoteError> {
        *self.status_calls.lock().expect("status calls lock") += 1;
        let next = self.statuses.lock().expect("statuses lock").pop_front();
        match next {
            Some(Ok(status)) => Ok(status),
            Some(Err(message)) => Err(scripted_error(&message)),
            None => self
                .status_fallback
                .clone()
                .ok_or_else(|| scripted_error(&format!("no status for {repository}#{run_id}"))),
        }
    }

    fn get_run_logs(
        &self,
        _repository: &str,
        _run_id: &str,
        failed_only: bool,
    ) -> Result<String, RemoteError> {
        self.log_requests
            .lock()
            .expect("log requests lock")
            .push(failed_only);
        self.logs
            .clone()
            .ok_or_else(|| scripted_error("logs unavailable"))
    }
}
