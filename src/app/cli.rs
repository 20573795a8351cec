#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Dispatch,
    Status,
    StatusAll,
    Workflows,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "dispatch" => CliVerb::Dispatch,
        "status" => CliVerb::Status,
        "status-all" => CliVerb::StatusAll,
        "workflows" => CliVerb::Workflows,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub const DISPATCH_USAGE: &str = "usage: dispatch --project <name> [--workflow <file>] [--branch <name>] [--param KEY=VALUE]... [--no-wait] [--verbose] [--json]";
pub const STATUS_USAGE: &str =
    "usage: status --project <name> [--workflow <file>] [--verbose] [--json]";
pub const STATUS_ALL_USAGE: &str = "usage: status-all [--json]";
pub const WORKFLOWS_USAGE: &str = "usage: workflows --project <name> [--verbose] [--json]";

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  dispatch --project <name> ...        Trigger a workflow run and wait for its result"
            .to_string(),
        "  status --project <name>              Show the most recent run of a project's workflow"
            .to_string(),
        "  status-all                           Show the latest run of every configured project"
            .to_string(),
        "  workflows --project <name>           List workflows and their dispatch inputs"
            .to_string(),
        "  help                                 Show this help".to_string(),
        String::new(),
        "Options:".to_string(),
        "  --workflow <file>                    Override the project's workflow file".to_string(),
        "  --branch <name>                      Override the project's branch (dispatch)"
            .to_string(),
        "  --param KEY=VALUE                    Workflow input, repeatable (dispatch)".to_string(),
        "  --no-wait                            Return once the run is discovered (dispatch)"
            .to_string(),
        "  --verbose, -v                        Include full logs and input descriptions"
            .to_string(),
        "  --json                               Print the result envelope as JSON".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    pub project: Option<String>,
    pub workflow: Option<String>,
    pub branch: Option<String>,
    pub params: Vec<String>,
    pub no_wait: bool,
    pub verbose: bool,
    pub json: bool,
}

impl CommandOptions {
    pub fn require_project(&self, usage: &str) -> Result<String, String> {
        self.project
            .clone()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| format!("--project is required\n{usage}"))
    }
}

/// Parses `args` accepting only the flags in `allowed`.
pub fn parse_options(args: &[String], allowed: &[&str]) -> Result<CommandOptions, String> {
    let mut options = CommandOptions::default();
    let mut i = 0usize;
    while i < args.len() {
        let flag = args[i].as_str();
        let canonical = if flag == "-v" { "--verbose" } else { flag };
        if !allowed.contains(&canonical) {
            return Err(format!("unknown option `{flag}`"));
        }
        match canonical {
            "--project" | "--workflow" | "--branch" | "--param" => {
                let value = args
                    .get(i + 1)
                    .cloned()
                    .ok_or_else(|| format!("missing value for {flag}"))?;
                match canonical {
                    "--project" => options.project = Some(value),
                    "--workflow" => options.workflow = Some(value),
                    "--branch" => options.branch = Some(value),
                    _ => options.params.push(value),
                }
                i += 2;
            }
            "--no-wait" => {
                options.no_wait = true;
                i += 1;
            }
            "--verbose" => {
                options.verbose = true;
                i += 1;
            }
            "--json" => {
                options.json = true;
                i += 1;
            }
            other => return Err(format!("unknown option `{other}`")),
        }
    }
    Ok(options)
}
