use crate::remote::RemoteControl;
use crate::shared::EventLog;

pub const WORKFLOW_EXTENSIONS: [&str; 2] = [".yml", ".yaml"];
pub const WORKFLOWS_DIR: &str = ".github/workflows";

pub fn strip_workflow_extension(name: &str) -> &str {
    name.strip_suffix(".yml")
        .or_else(|| name.strip_suffix(".yaml"))
        .unwrap_or(name)
}

/// Both spellings of `requested`, the requested extension first.
pub fn extension_candidates(requested: &str) -> Vec<String> {
    let base = strip_workflow_extension(requested);
    let ordered = if requested.ends_with(".yaml") {
        [".yaml", ".yml"]
    } else {
        WORKFLOW_EXTENSIONS
    };
    ordered.iter().map(|ext| format!("{base}{ext}")).collect()
}

pub fn path_matches(path: &str, candidate: &str) -> bool {
    path == candidate || path.ends_with(&format!("/{candidate}"))
}

/// Repository-relative path of a workflow definition.
pub fn workflow_definition_path(workflow: &str) -> String {
    if workflow.contains('/') {
        workflow.to_string()
    } else {
        format!("{WORKFLOWS_DIR}/{workflow}")
    }
}

/// Maps a requested workflow name onto the spelling present in the
/// repository. Falls back to `requested` so the provider reports the error.
pub fn resolve_workflow(
    remote: &dyn RemoteControl,
    repository: &str,
    requested: &str,
    log: &EventLog,
) -> String {
    let workflows = match remote.list_workflows(repository) {
        Ok(workflows) => workflows,
        Err(err) => {
            log.warn(
                "schema.resolve_failed",
                &format!("listing workflows for {repository} failed: {err}"),
            );
            return requested.to_string();
        }
    };

    extension_candidates(requested)
        .into_iter()
        .find(|candidate| workflows.iter().any(|wf| path_matches(&wf.path, candidate)))
        .unwrap_or_else(|| requested.to_string())
}
