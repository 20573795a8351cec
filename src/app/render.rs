use crate::dispatch::DispatchReport;
use crate::outcome::CommandResult;
use crate::remote::{Conclusion, LifecycleState};
use crate::schema::WorkflowListing;
use crate::status::{format_relative_time, ProjectStatus, ProjectStatusReport, StatusReport};
use chrono::{DateTime, Utc};
use crossterm::style::{Color, Stylize};
use crossterm::tty::IsTty;

/// The stream a rendered result ends up on. `Ok` output goes to stdout and
/// `Err` output to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    pub fn for_result(result: &CommandResult) -> Self {
        if result.success {
            Self::Stdout
        } else {
            Self::Stderr
        }
    }

    fn is_tty(self) -> bool {
        match self {
            Self::Stdout => std::io::stdout().is_tty(),
            Self::Stderr => std::io::stderr().is_tty(),
        }
    }
}

/// Whether rendered text carries ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn plain() -> Self {
        Self { enabled: false }
    }

    pub fn colored() -> Self {
        Self { enabled: true }
    }

    pub fn for_stream(stream: OutputStream) -> Self {
        Self {
            enabled: std::env::var_os("NO_COLOR").is_none() && stream.is_tty(),
        }
    }

    pub fn paint(self, text: &str, color: Color) -> String {
        if self.enabled {
            text.with(color).bold().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Upper-case run label and its display color. Conclusion wins over state.
pub fn status_label(state: &LifecycleState, conclusion: Option<&Conclusion>) -> (String, Color) {
    match (conclusion, state) {
        (Some(Conclusion::Success), _) => ("SUCCESS".to_string(), Color::Green),
        (Some(Conclusion::Failure), _) => ("FAILURE".to_string(), Color::Red),
        (Some(Conclusion::Cancelled), _) => ("CANCELLED".to_string(), Color::Yellow),
        (Some(Conclusion::Other(raw)), _) => (raw.to_uppercase(), Color::White),
        (None, LifecycleState::InProgress) => ("IN PROGRESS".to_string(), Color::Cyan),
        (None, LifecycleState::Queued) => ("QUEUED".to_string(), Color::Blue),
        (None, other) => (other.as_str().to_uppercase(), Color::White),
    }
}

fn painted_status(
    palette: Palette,
    state: &LifecycleState,
    conclusion: Option<&Conclusion>,
) -> String {
    let (label, color) = status_label(state, conclusion);
    palette.paint(&label, color)
}

/// `75` -> `1m 15s`.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}m {}s", seconds / 60, seconds % 60)
}

fn property_block(title: &str, rows: &[(&str, String)]) -> String {
    let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut lines = vec![title.to_string()];
    lines.extend(
        rows.iter()
            .map(|(key, value)| format!("  {key:width$}  {value}")),
    );
    lines.join("\n")
}

fn result_footer(result: &CommandResult, palette: Palette) -> String {
    let mut lines = Vec::new();
    if result.success {
        lines.push(palette.paint(&format!("Result: {}", result.message), Color::Green));
    } else {
        lines.push(palette.paint(&format!("Result: {}", result.message), Color::Red));
        lines.extend(result.errors.iter().map(|err| format!("  - {err}")));
    }
    lines.join("\n")
}

/// Body followed by the `Result:` footer.
pub fn with_footer(body: &str, result: &CommandResult, palette: Palette) -> String {
    if body.is_empty() {
        result_footer(result, palette)
    } else {
        format!("{body}\n\n{}", result_footer(result, palette))
    }
}

pub fn render_dispatch(report: &DispatchReport, palette: Palette) -> String {
    let handle = &report.triggered.handle;
    let mut sections = Vec::new();
    if !report.triggered.warnings.is_empty() {
        sections.push(
            report
                .triggered
                .warnings
                .iter()
                .map(|warning| palette.paint(&format!("Warning: {warning}"), Color::Yellow))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }

    let status = match &report.outcome {
        Some(outcome) => match &outcome.run_info {
            Some(run) => painted_status(palette, &run.state, run.conclusion.as_ref()),
            None => palette.paint("UNKNOWN", Color::White),
        },
        None => palette.paint("TRIGGERED", Color::Cyan),
    };
    let mut rows = vec![
        ("Status", status),
        ("Repository", handle.repository.clone()),
        ("Workflow", handle.workflow.clone()),
        ("Branch", handle.branch.clone()),
        ("Run ID", handle.run_id.clone()),
    ];
    if let Some(outcome) = &report.outcome {
        rows.push(("Duration", format_elapsed(outcome.elapsed_seconds)));
    }
    rows.push(("URL", handle.url()));
    if !report.triggered.parameters.is_empty() {
        let params = report
            .triggered
            .parameters
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(", ");
        rows.push(("Parameters", params));
    }
    sections.push(property_block(
        &format!("Workflow Result: {}", report.project),
        &rows,
    ));

    if let Some(logs) = &report.logs {
        sections.push(format!("Logs:\n{logs}"));
    }
    sections.join("\n\n")
}

pub fn render_project_status(report: &ProjectStatusReport, palette: Palette) -> String {
    let ProjectStatus::Found(last) = &report.status else {
        return String::new();
    };
    let run = &last.run;
    let created = run
        .created_at
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_default();
    let rows = vec![
        ("Status", painted_status(palette, &run.status, run.conclusion.as_ref())),
        ("Repository", report.target.repository.clone()),
        ("Workflow", last.workflow.clone()),
        ("Run ID", run.run_id()),
        ("Branch", run.head_branch.clone()),
        ("Event", run.event.clone()),
        ("Created", created),
        ("URL", last.url(&report.target.repository)),
    ];
    let mut out = property_block(&format!("Workflow Status: {}", report.project), &rows);
    if let Some(logs) = &report.logs {
        out.push_str(&format!("\n\nLogs:\n{logs}"));
    }
    out
}

pub fn render_status_all(
    report: &StatusReport,
    now: DateTime<Utc>,
    palette: Palette,
) -> String {
    let mut rows: Vec<[String; 4]> = vec![[
        "Project".to_string(),
        "Status".to_string(),
        "Branch".to_string(),
        "Last Run".to_string(),
    ]];
    let mut colors: Vec<Option<Color>> = vec![None];
    for (name, status) in &report.results {
        let (label, color, branch, when) = match status {
            ProjectStatus::Found(last) => {
                let (label, color) =
                    status_label(&last.run.status, last.run.conclusion.as_ref());
                (
                    label,
                    Some(color),
                    last.run.head_branch.clone(),
                    format_relative_time(last.run.created_at, now),
                )
            }
            ProjectStatus::NoRuns => (
                "N/A".to_string(),
                None,
                "-".to_string(),
                "No runs found".to_string(),
            ),
            ProjectStatus::Failed(reason) => {
                ("N/A".to_string(), None, "-".to_string(), reason.clone())
            }
            ProjectStatus::Cancelled => (
                "N/A".to_string(),
                None,
                "-".to_string(),
                "Not checked".to_string(),
            ),
        };
        rows.push([name.clone(), label, branch, when]);
        colors.push(color);
    }

    let widths: Vec<usize> = (0..3)
        .map(|col| rows.iter().map(|row| row[col].chars().count()).max().unwrap_or(0))
        .collect();
    let mut lines = vec!["Workflow Status: All Projects".to_string()];
    for (row, color) in rows.iter().zip(colors) {
        let status = format!("{:width$}", row[1], width = widths[1]);
        let status = match color {
            Some(color) => palette.paint(&status, color),
            None => status,
        };
        lines.push(format!(
            "  {:w0$}  {status}  {:w2$}  {}",
            row[0],
            row[2],
            row[3],
            w0 = widths[0],
            w2 = widths[2],
        ));
    }
    lines.join("\n")
}

pub fn render_workflows(
    project: &str,
    repository: &str,
    listings: &[WorkflowListing],
    verbose: bool,
    palette: Palette,
) -> String {
    let mut lines = vec![format!("Workflows for {project} ({repository})"), String::new()];
    for listing in listings {
        let color = if listing.is_active() {
            Color::Green
        } else {
            Color::Yellow
        };
        lines.push(format!(
            "  {} {}",
            listing.file_name,
            palette.paint(&listing.state, color)
        ));
        if listing.inputs.is_empty() {
            lines.push("    No workflow_dispatch inputs".to_string());
        }
        for (name, input) in &listing.inputs {
            let marker = if input.required { "*" } else { "" };
            if input.options.is_empty() {
                lines.push(format!(
                    "    {name}{marker}: ({})",
                    input.input_type.as_str()
                ));
            } else {
                lines.push(format!("    {name}{marker}: [{}]", input.options.join(", ")));
            }
            if let Some(default) = input.default_value.as_deref().filter(|d| !d.is_empty()) {
                lines.push(format!("      default: {default}"));
            }
            if verbose && !input.description.is_empty() {
                lines.push(format!("      {}", input.description));
            }
        }
        lines.push(String::new());
    }
    lines.join("\n").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{InputType, WorkflowInputSpec, WorkflowSchema};

    #[test]
    fn conclusion_takes_precedence_over_state() {
        assert_eq!(
            status_label(&LifecycleState::Completed, Some(&Conclusion::Failure)).0,
            "FAILURE"
        );
        assert_eq!(status_label(&LifecycleState::InProgress, None).0, "IN PROGRESS");
        assert_eq!(
            status_label(&LifecycleState::Completed, Some(&Conclusion::parse("timed_out"))).0,
            "TIMED_OUT"
        );
    }

    #[test]
    fn failed_results_are_colored_for_stderr() {
        let ok = CommandResult::success("Status: success", serde_json::Value::Null);
        let failed = CommandResult::failure("Workflow failure", vec!["boom".to_string()]);
        assert_eq!(OutputStream::for_result(&ok), OutputStream::Stdout);
        assert_eq!(OutputStream::for_result(&failed), OutputStream::Stderr);

        let colored = with_footer("", &failed, Palette::colored());
        assert!(colored.contains("\u{1b}["));
        assert!(colored.contains("Result: Workflow failure"));
        assert_eq!(
            with_footer("", &failed, Palette::plain()),
            "Result: Workflow failure\n  - boom"
        );
    }

    #[test]
    fn elapsed_is_minutes_and_seconds() {
        assert_eq!(format_elapsed(0), "0m 0s");
        assert_eq!(format_elapsed(75), "1m 15s");
        assert_eq!(format_elapsed(3_600), "60m 0s");
    }

    #[test]
    fn workflow_listing_marks_required_and_defaults() {
        let mut inputs = WorkflowSchema::new();
        inputs.insert(
            "env".to_string(),
            WorkflowInputSpec {
                name: "env".to_string(),
                input_type: InputType::Choice,
                options: vec!["staging".to_string(), "production".to_string()],
                default_value: Some("staging".to_string()),
                required: true,
                description: "Target environment".to_string(),
            },
        );
        let listings = vec![
            WorkflowListing {
                name: "Deploy".to_string(),
                path: ".github/workflows/deploy.yml".to_string(),
                file_name: "deploy.yml".to_string(),
                state: "active".to_string(),
                inputs,
            },
            WorkflowListing {
                name: "Lint".to_string(),
                path: ".github/workflows/lint.yml".to_string(),
                file_name: "lint.yml".to_string(),
                state: "disabled_manually".to_string(),
                inputs: WorkflowSchema::new(),
            },
        ];

        let text = render_workflows("demo", "org/demo", &listings, true, Palette::plain());
        assert!(text.contains("env*: [staging, production]"));
        assert!(text.contains("default: staging"));
        assert!(text.contains("Target environment"));
        assert!(text.contains("No workflow_dispatch inputs"));

        let terse = render_workflows("demo", "org/demo", &listings, false, Palette::plain());
        assert!(!terse.contains("Target environment"));
    }
}
