use super::RemoteControl;
use crate::shared::EventLog;

pub const LOG_EXCERPT_LIMIT: usize = 15_000;
pub const TRUNCATION_NOTICE: &str = "\n\n... (truncated, see the run page for full logs)";

/// Keeps the first `limit` characters. Cuts on a char boundary.
pub fn truncate_logs(logs: &str, limit: usize) -> String {
    match logs.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{TRUNCATION_NOTICE}", &logs[..cut]),
        None => logs.to_string(),
    }
}

/// Best-effort log excerpt; `None` when the provider has nothing to show.
pub fn fetch_log_excerpt(
    remote: &dyn RemoteControl,
    repository: &str,
    run_id: &str,
    failed_only: bool,
    log: &EventLog,
) -> Option<String> {
    match remote.get_run_logs(repository, run_id, failed_only) {
        Ok(logs) if logs.trim().is_empty() => None,
        Ok(logs) => Some(truncate_logs(&logs, LOG_EXCERPT_LIMIT)),
        Err(err) => {
            log.warn(
                "remote.logs_failed",
                &format!("{repository}#{run_id}: {}", err.diagnostic()),
            );
            None
        }
    }
}
