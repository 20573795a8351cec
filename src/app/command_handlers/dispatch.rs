use crate::app::cli::{parse_options, DISPATCH_USAGE};
use crate::app::command_support::{load_context, progress_heartbeat, respond, respond_failure};
use crate::app::render::render_dispatch;
use crate::dispatch::{CancelToken, DispatchRequest, Dispatcher, PollSettings, SystemClock};

const DISPATCH_FLAGS: &[&str] = &[
    "--project",
    "--workflow",
    "--branch",
    "--param",
    "--no-wait",
    "--verbose",
    "--json",
];

pub fn cmd_dispatch(args: &[String]) -> Result<String, String> {
    let options = parse_options(args, DISPATCH_FLAGS)?;
    let project = options.require_project(DISPATCH_USAGE)?;
    let context = match load_context() {
        Ok(context) => context,
        Err(failure) => return failure.respond(options.json),
    };

    let request = DispatchRequest {
        project,
        workflow: options.workflow.clone(),
        branch: options.branch.clone(),
        params: options.params.clone(),
        wait: !options.no_wait,
        verbose: options.verbose,
    };
    let show_progress = context.tunables.workflow.show_progress && !options.json;
    let heartbeat = progress_heartbeat(show_progress);
    let clock = SystemClock::default();
    let dispatcher = Dispatcher::new(
        context.remote.as_ref(),
        &clock,
        &context.registry,
        PollSettings::from_tunables(&context.tunables.workflow),
        &context.log,
    );

    match dispatcher.dispatch(&request, &CancelToken::new(), &heartbeat) {
        Ok(report) => {
            if show_progress && report.outcome.is_some() {
                eprintln!();
            }
            respond(&report.to_command_result(), options.json, |palette| {
                render_dispatch(&report, palette)
            })
        }
        Err(err) => respond_failure(&err.to_command_result(), options.json),
    }
}
