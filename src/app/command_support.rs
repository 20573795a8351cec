use crate::app::render::{with_footer, OutputStream, Palette};
use crate::config::{
    default_log_path, load_project_registry, load_tunables, ConfigError, ProjectRegistry,
    Tunables, TUNABLES_FILE_NAME,
};
use crate::dispatch::config_failure;
use crate::outcome::CommandResult;
use crate::remote::{GhCli, RemoteControl};
use crate::shared::EventLog;
use std::io::Write;
use std::sync::Arc;

/// Everything a command needs, built once per invocation.
pub struct CommandContext {
    pub registry: ProjectRegistry,
    pub tunables: Tunables,
    pub remote: Arc<dyn RemoteControl>,
    pub log: EventLog,
}

#[derive(Debug)]
pub enum ContextFailure {
    Tunables(ConfigError),
    Registry(ConfigError),
}

impl ContextFailure {
    pub fn respond(&self, json: bool) -> Result<String, String> {
        match self {
            Self::Tunables(err) => respond_failure(
                &CommandResult::failure(
                    format!("Failed to load {TUNABLES_FILE_NAME}"),
                    vec![err.to_string()],
                ),
                json,
            ),
            Self::Registry(err) => respond_failure(&config_failure(err), json),
        }
    }
}

pub fn event_log_for(tunables: &Tunables) -> EventLog {
    match &tunables.logging.path {
        Some(path) => EventLog::to_file(path),
        None => default_log_path()
            .map(EventLog::to_file)
            .unwrap_or_else(|_| EventLog::disabled()),
    }
}

pub fn load_context() -> Result<CommandContext, ContextFailure> {
    let tunables = load_tunables().map_err(ContextFailure::Tunables)?;
    let log = event_log_for(&tunables);
    let registry = load_project_registry().map_err(|err| {
        log.error("config.registry_failed", &err.to_string());
        ContextFailure::Registry(err)
    })?;
    let remote: Arc<dyn RemoteControl> = Arc::new(GhCli::from_tunables(&tunables.remote));
    Ok(CommandContext {
        registry,
        tunables,
        remote,
        log,
    })
}

/// Successful results print to stdout; failures become `Err` so the binary
/// writes them to stderr and exits non-zero. `body` is only rendered in text
/// mode, colored for the stream it lands on.
pub fn respond(
    result: &CommandResult,
    json: bool,
    body: impl FnOnce(Palette) -> String,
) -> Result<String, String> {
    let text = if json {
        result.to_json()
    } else {
        let palette = Palette::for_stream(OutputStream::for_result(result));
        with_footer(&body(palette), result, palette)
    };
    if result.success {
        Ok(text)
    } else {
        Err(text)
    }
}

pub fn respond_failure(result: &CommandResult, json: bool) -> Result<String, String> {
    respond(result, json, |_| String::new())
}

/// One `.` on stderr per poll cycle when enabled.
pub fn progress_heartbeat(enabled: bool) -> impl Fn() {
    move || {
        if enabled {
            let mut stderr = std::io::stderr();
            let _ = write!(stderr, ".");
            let _ = stderr.flush();
        }
    }
}
