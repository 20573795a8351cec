use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod dispatch;
pub mod status;
pub mod workflows;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Dispatch => dispatch::cmd_dispatch(&args[1..]),
        CliVerb::Status => status::cmd_status(&args[1..]),
        CliVerb::StatusAll => status::cmd_status_all(&args[1..]),
        CliVerb::Workflows => workflows::cmd_workflows(&args[1..]),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`\n\n{}", args[0], help_text())),
    }
}
