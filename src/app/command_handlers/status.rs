use crate::app::cli::{parse_options, STATUS_ALL_USAGE, STATUS_USAGE};
use crate::app::command_support::{load_context, respond, respond_failure};
use crate::app::render::{render_project_status, render_status_all};
use crate::dispatch::{config_failure, CancelToken};
use crate::outcome::CommandResult;
use crate::status::{project_status, StatusAggregator};

pub fn cmd_status(args: &[String]) -> Result<String, String> {
    let options = parse_options(args, &["--project", "--workflow", "--verbose", "--json"])?;
    let project = options.require_project(STATUS_USAGE)?;
    let context = match load_context() {
        Ok(context) => context,
        Err(failure) => return failure.respond(options.json),
    };
    let target = match context.registry.target(&project) {
        Ok(target) => target.with_overrides(options.workflow.as_deref(), None),
        Err(err) => return respond_failure(&config_failure(&err), options.json),
    };

    let report = project_status(
        context.remote.as_ref(),
        &project,
        &target,
        options.verbose,
        &context.log,
    );
    respond(&report.to_command_result(), options.json, |palette| {
        render_project_status(&report, palette)
    })
}

pub fn cmd_status_all(args: &[String]) -> Result<String, String> {
    let options = parse_options(args, &["--json"])
        .map_err(|err| format!("{err}\n{STATUS_ALL_USAGE}"))?;
    let context = match load_context() {
        Ok(context) => context,
        Err(failure) => return failure.respond(options.json),
    };
    if context.registry.is_empty() {
        return respond_failure(
            &CommandResult::failure(
                "No projects configured",
                vec!["Add projects to projects.yaml".to_string()],
            ),
            options.json,
        );
    }

    let report = StatusAggregator::new(context.remote.clone(), context.log.clone())
        .fetch_all(&context.registry.targets(), &CancelToken::new());
    respond(&report.to_command_result(), options.json, |palette| {
        render_status_all(&report, chrono::Utc::now(), palette)
    })
}
