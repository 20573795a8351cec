use crate::remote::types::{deserialize_conclusion, deserialize_timestamp};
use crate::remote::{
    canonical_run_url, Conclusion, LifecycleState, RunStatus, RunSummary, WorkflowSummary,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunViewPayload {
    status: LifecycleState,
    #[serde(default, deserialize_with = "deserialize_conclusion")]
    conclusion: Option<Conclusion>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    name: String,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    updated_at: Option<DateTime<Utc>>,
}

pub fn parse_workflow_list(stdout: &str) -> Result<Vec<WorkflowSummary>, String> {
    parse_json_array(stdout)
}

pub fn parse_run_list(stdout: &str) -> Result<Vec<RunSummary>, String> {
    parse_json_array(stdout)
}

pub fn parse_run_view(stdout: &str, repository: &str, run_id: &str) -> Result<RunStatus, String> {
    let payload: RunViewPayload =
        serde_json::from_str(stdout.trim()).map_err(|err| err.to_string())?;
    let url = if payload.url.trim().is_empty() {
        canonical_run_url(repository, run_id)
    } else {
        payload.url
    };
    Ok(RunStatus {
        run_id: run_id.to_string(),
        repository: repository.to_string(),
        state: payload.status,
        conclusion: payload.conclusion,
        url,
        name: payload.name,
        created_at: payload.created_at,
        updated_at: payload.updated_at,
    })
}

fn parse_json_array<T: for<'de> Deserialize<'de>>(stdout: &str) -> Result<Vec<T>, String> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_view_fills_missing_url_from_repository_and_id() {
        let status = parse_run_view(
            r#"{"status":"in_progress","conclusion":"","url":"","name":"Build","createdAt":"2024-05-01T10:00:00Z","updatedAt":"2024-05-01T10:01:00Z"}"#,
            "org/demo",
            "4821",
        )
        .expect("parse run view");

        assert_eq!(status.state, LifecycleState::InProgress);
        assert_eq!(status.conclusion, None);
        assert_eq!(status.url, "https://github.com/org/demo/actions/runs/4821");
        assert_eq!(status.run_id, "4821");
        assert!(status.created_at.is_some());
    }

    #[test]
    fn run_view_keeps_unknown_conclusions_verbatim() {
        let status = parse_run_view(
            r#"{"status":"completed","conclusion":"startup_failure","url":"https://x/1"}"#,
            "org/demo",
            "1",
        )
        .expect("parse run view");
        assert!(status.is_terminal());
        assert_eq!(
            status.conclusion,
            Some(Conclusion::Other("startup_failure".to_string()))
        );
        assert_eq!(status.url, "https://x/1");
    }

    #[test]
    fn run_list_parses_summary_fields() {
        let runs = parse_run_list(
            r#"[{"databaseId":99,"status":"completed","conclusion":"failure","createdAt":"2024-05-01T10:00:00Z","headBranch":"main","event":"workflow_dispatch","name":"Build"}]"#,
        )
        .expect("parse run list");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].run_id(), "99");
        assert_eq!(runs[0].conclusion, Some(Conclusion::Failure));
        assert_eq!(runs[0].head_branch, "main");
        assert_eq!(runs[0].label(), "failure");
    }

    #[test]
    fn empty_list_output_is_empty() {
        assert!(parse_run_list("  \n").expect("parse").is_empty());
        assert!(parse_workflow_list("[]").expect("parse").is_empty());
    }

    #[test]
    fn malformed_output_is_an_error() {
        assert!(parse_run_list("not json").is_err());
        assert!(parse_run_view("{}", "org/demo", "1").is_err());
    }
}
