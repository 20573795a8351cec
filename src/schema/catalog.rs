use crate::remote::{RemoteControl, RemoteError};
use crate::schema::{fetch_input_schema, WorkflowSchema};
use crate::shared::EventLog;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowListing {
    pub name: String,
    pub path: String,
    pub file_name: String,
    pub state: String,
    pub inputs: WorkflowSchema,
}

impl WorkflowListing {
    pub fn is_active(&self) -> bool {
        self.state == "active"
    }
}

/// Every workflow in `repository` together with its dispatch inputs as
/// declared on `branch`.
pub fn list_workflow_catalog(
    remote: &dyn RemoteControl,
    repository: &str,
    branch: &str,
    log: &EventLog,
) -> Result<Vec<WorkflowListing>, RemoteError> {
    let workflows = remote.list_workflows(repository)?;
    Ok(workflows
        .into_iter()
        .map(|workflow| {
            let inputs = if workflow.path.is_empty() {
                WorkflowSchema::new()
            } else {
                fetch_input_schema(remote, repository, &workflow.path, branch, log)
            };
            WorkflowListing {
                file_name: workflow.file_name().to_string(),
                name: workflow.name,
                path: workflow.path,
                state: workflow.state,
                inputs,
            }
        })
        .collect())
}
