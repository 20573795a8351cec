use crate::app::cli::{parse_options, WORKFLOWS_USAGE};
use crate::app::command_support::{load_context, respond, respond_failure};
use crate::app::render::render_workflows;
use crate::dispatch::config_failure;
use crate::outcome::CommandResult;
use crate::schema::list_workflow_catalog;

pub fn cmd_workflows(args: &[String]) -> Result<String, String> {
    let options = parse_options(args, &["--project", "--verbose", "--json"])?;
    let project = options.require_project(WORKFLOWS_USAGE)?;
    let context = match load_context() {
        Ok(context) => context,
        Err(failure) => return failure.respond(options.json),
    };
    let target = match context.registry.target(&project) {
        Ok(target) => target,
        Err(err) => return respond_failure(&config_failure(&err), options.json),
    };
    let repository = target.repository.as_str();

    let listings = match list_workflow_catalog(
        context.remote.as_ref(),
        repository,
        &target.branch,
        &context.log,
    ) {
        Ok(listings) => listings,
        Err(err) => {
            context.log.warn(
                "schema.list_failed",
                &format!("{repository}: {}", err.diagnostic()),
            );
            Vec::new()
        }
    };
    if listings.is_empty() {
        return respond_failure(
            &CommandResult::failure(
                "No workflows found",
                vec![format!("No workflows found in {repository}")],
            ),
            options.json,
        );
    }

    let result = CommandResult::success(
        format!("Found {} workflows", listings.len()),
        serde_json::json!({ "workflows": listings }),
    );
    respond(&result, options.json, |palette| {
        render_workflows(&project, repository, &listings, options.verbose, palette)
    })
}
