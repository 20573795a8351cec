use std::collections::BTreeMap;

pub const WORKFLOW_LIST_FIELDS: &str = "name,path,state";
pub const RUN_LIST_FIELDS: &str =
    "databaseId,status,conclusion,createdAt,updatedAt,headBranch,event,name,url";
pub const RUN_VIEW_FIELDS: &str = "status,conclusion,url,name,createdAt,updatedAt";
pub const RAW_CONTENT_ACCEPT: &str = "Accept: application/vnd.github.raw";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhInvocation {
    pub args: Vec<String>,
}

impl GhInvocation {
    fn new(args: &[&str]) -> Self {
        Self {
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    fn push(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn command_form(&self, binary: &str) -> String {
        format!("{} {}", binary, self.args.join(" "))
    }
}

pub fn auth_status() -> GhInvocation {
    GhInvocation::new(&["auth", "status"])
}

pub fn workflow_list(repository: &str) -> GhInvocation {
    GhInvocation::new(&[
        "workflow",
        "list",
        "-R",
        repository,
        "--json",
        WORKFLOW_LIST_FIELDS,
    ])
}

pub fn file_contents(repository: &str, path: &str, git_ref: Option<&str>) -> GhInvocation {
    let encoded_path = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    let mut endpoint = format!("repos/{repository}/contents/{encoded_path}");
    if let Some(git_ref) = git_ref.filter(|r| !r.is_empty()) {
        endpoint.push_str("?ref=");
        endpoint.push_str(&urlencoding::encode(git_ref));
    }
    GhInvocation::new(&["api"])
        .push(endpoint)
        .push("-H")
        .push(RAW_CONTENT_ACCEPT)
}

pub fn workflow_run(
    repository: &str,
    workflow: &str,
    branch: &str,
    inputs: &BTreeMap<String, String>,
) -> GhInvocation {
    let mut invocation =
        GhInvocation::new(&["workflow", "run", workflow, "-R", repository, "--ref", branch]);
    for (key, value) in inputs {
        invocation = invocation.push("-f").push(format!("{key}={value}"));
    }
    invocation
}

pub fn run_list(
    repository: &str,
    workflow: &str,
    branch: Option<&str>,
    limit: u32,
) -> GhInvocation {
    let mut invocation = GhInvocation::new(&["run", "list", "-R", repository, "-w", workflow]);
    if let Some(branch) = branch {
        invocation = invocation.push("-b").push(branch);
    }
    invocation
        .push("--limit")
        .push(limit.max(1).to_string())
        .push("--json")
        .push(RUN_LIST_FIELDS)
}

pub fn run_view(repository: &str, run_id: &str) -> GhInvocation {
    GhInvocation::new(&[
        "run",
        "view",
        run_id,
        "-R",
        repository,
        "--json",
        RUN_VIEW_FIELDS,
    ])
}

pub fn run_logs(repository: &str, run_id: &str, failed_only: bool) -> GhInvocation {
    let flag = if failed_only { "--log-failed" } else { "--log" };
    GhInvocation::new(&["run", "view", run_id, "-R", repository, flag])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_run_passes_inputs_as_fields() {
        let mut inputs = BTreeMap::new();
        inputs.insert("env".to_string(), "staging".to_string());
        inputs.insert("message".to_string(), "a=b".to_string());

        let invocation = workflow_run("org/demo", "build.yaml", "main", &inputs);
        assert_eq!(
            invocation.args,
            vec![
                "workflow", "run", "build.yaml", "-R", "org/demo", "--ref", "main", "-f",
                "env=staging", "-f", "message=a=b",
            ]
        );
    }

    #[test]
    fn run_list_includes_branch_only_when_given() {
        let without = run_list("org/demo", "build.yml", None, 1);
        assert!(!without.args.contains(&"-b".to_string()));

        let with = run_list("org/demo", "build.yml", Some("main"), 1);
        let idx = with.args.iter().position(|a| a == "-b").expect("branch flag");
        assert_eq!(with.args[idx + 1], "main");
        assert!(with.args.contains(&RUN_LIST_FIELDS.to_string()));
    }

    #[test]
    fn file_contents_encodes_ref_and_requests_raw_body() {
        let invocation = file_contents("org/demo", ".github/workflows/build.yaml", Some("feat/x"));
        assert_eq!(
            invocation.args[1],
            "repos/org/demo/contents/.github/workflows/build.yaml?ref=feat%2Fx"
        );
        assert_eq!(invocation.args[3], RAW_CONTENT_ACCEPT);
    }

    #[test]
    fn log_flag_depends_on_failed_only() {
        assert!(run_logs("org/demo", "1", true)
            .args
            .contains(&"--log-failed".to_string()));
        assert!(run_logs("org/demo", "1", false)
            .args
            .contains(&"--log".to_string()));
    }
}
