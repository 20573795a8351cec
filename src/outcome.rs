use crate::remote::RunStatus;
use serde::Serialize;
use serde_json::Value;

/// Result of monitoring one run to a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub succeeded: bool,
    pub message: String,
    pub elapsed_seconds: u64,
    pub run_info: Option<RunStatus>,
    pub errors: Vec<String>,
}

/// Uniform envelope returned by every command entry point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub success: bool,
    pub message: String,
    pub data: Value,
    pub errors: Vec<String>,
}

impl CommandResult {
    pub fn success(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            errors: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: Value::Null,
            errors,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|err| {
            serde_json::json!({
                "success": false,
                "message": "failed to encode result",
                "data": null,
                "errors": [err.to_string()],
            })
            .to_string()
        })
    }
}

impl From<Outcome> for CommandResult {
    fn from(outcome: Outcome) -> Self {
        let data = serde_json::json!({
            "elapsedSeconds": outcome.elapsed_seconds,
            "runInfo": outcome.run_info,
        });
        Self {
            success: outcome.succeeded,
            message: outcome.message,
            data,
            errors: outcome.errors,
        }
    }
}
