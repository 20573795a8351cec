pub mod app;
pub mod config;
pub mod dispatch;
pub mod outcome;
pub mod remote;
pub mod schema;
pub mod shared;
pub mod status;

pub fn run(args: Vec<String>) -> Result<String, String> {
    app::command_handlers::run_cli(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_adapter_delegates_to_command_handlers() {
        let args = vec!["unknown-command".to_string()];
        assert_eq!(run(args.clone()), app::command_handlers::run_cli(args));
    }

    #[test]
    fn no_arguments_prints_help() {
        let help = run(Vec::new()).expect("help");
        assert!(help.contains("dispatch --project"));
        assert!(help.contains("status-all"));
    }
}
