use crate::remote::RemoteControl;
use crate::schema::workflow_definition_path;
use crate::shared::serde_ext::scalar_to_string;
use crate::shared::EventLog;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

pub const DISPATCH_TRIGGER: &str = "workflow_dispatch";

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("workflow definition is not valid yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("workflow_dispatch section is malformed: {0}")]
    DispatchSection(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    String,
    Boolean,
    Choice,
    Environment,
    Number,
}

impl InputType {
    /// Unrecognized types are treated as free-form strings.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "boolean" => Self::Boolean,
            "choice" => Self::Choice,
            "environment" => Self::Environment,
            "number" => Self::Number,
            _ => Self::String,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Choice => "choice",
            Self::Environment => "environment",
            Self::Number => "number",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInputSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub input_type: InputType,
    pub options: Vec<String>,
    pub default_value: Option<String>,
    pub required: bool,
    pub description: String,
}

pub type WorkflowSchema = BTreeMap<String, WorkflowInputSpec>;

/// Where a workflow document stands with respect to manual dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchSection {
    Present(Mapping),
    Absent,
    Malformed(String),
}

/// Finds the `on:` block. YAML 1.1 loaders read the bare key `on` as the
/// boolean `true`, so documents written by such tools carry `true:` instead.
pub fn trigger_section(document: &Value) -> Option<&Value> {
    let mapping = document.as_mapping()?;
    mapping
        .get("on")
        .filter(|value| !value.is_null())
        .or_else(|| mapping.get(Value::Bool(true)))
}

pub fn locate_dispatch_section(document: &Value) -> DispatchSection {
    let Some(trigger) = trigger_section(document) else {
        return DispatchSection::Absent;
    };

    match trigger {
        Value::String(event) if event == DISPATCH_TRIGGER => DispatchSection::Present(Mapping::new()),
        Value::String(_) | Value::Null => DispatchSection::Absent,
        Value::Sequence(events) => {
            if events.iter().any(|e| e.as_str() == Some(DISPATCH_TRIGGER)) {
                DispatchSection::Present(Mapping::new())
            } else {
                DispatchSection::Absent
            }
        }
        Value::Mapping(events) => match events.get(DISPATCH_TRIGGER) {
            None => DispatchSection::Absent,
            Some(Value::Null) => DispatchSection::Present(Mapping::new()),
            Some(Value::Mapping(section)) => DispatchSection::Present(section.clone()),
            Some(_) => DispatchSection::Malformed(format!("`{DISPATCH_TRIGGER}` must be a mapping")),
        },
        _ => DispatchSection::Malformed("`on` must be a string, list or mapping".to_string()),
    }
}

pub fn parse_input_schema(content: &str) -> Result<WorkflowSchema, SchemaError> {
    let document: Value = serde_yaml::from_str(content)?;
    let section = match locate_dispatch_section(&document) {
        DispatchSection::Present(section) => section,
        DispatchSection::Absent => return Ok(WorkflowSchema::new()),
        DispatchSection::Malformed(reason) => return Err(SchemaError::DispatchSection(reason)),
    };

    let inputs = match section.get("inputs") {
        None | Some(Value::Null) => return Ok(WorkflowSchema::new()),
        Some(Value::Mapping(inputs)) => inputs,
        Some(_) => {
            return Err(SchemaError::DispatchSection(
                "`inputs` must be a mapping".to_string(),
            ))
        }
    };

    let mut schema = WorkflowSchema::new();
    for (key, config) in inputs {
        let Some(name) = scalar_to_string(key) else {
            continue;
        };
        let Value::Mapping(config) = config else {
            continue;
        };
        schema.insert(name.clone(), input_spec(name, config));
    }
    Ok(schema)
}

fn input_spec(name: String, config: &Mapping) -> WorkflowInputSpec {
    let input_type = config
        .get("type")
        .and_then(Value::as_str)
        .map(InputType::parse)
        .unwrap_or(InputType::String);
    let options = match config.get("options") {
        Some(Value::Sequence(options)) => options.iter().filter_map(scalar_to_string).collect(),
        _ => Vec::new(),
    };
    let default_value = config
        .get("default")
        .filter(|value| !value.is_null())
        .and_then(scalar_to_string);
    let required = match config.get("required") {
        Some(Value::Bool(required)) => *required,
        Some(Value::String(raw)) => raw.trim().eq_ignore_ascii_case("true"),
        _ => false,
    };
    let description = config
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    WorkflowInputSpec {
        name,
        input_type,
        options,
        default_value,
        required,
        description,
    }
}

/// Fetches and parses the dispatch inputs of `workflow` at `branch`.
/// Fails open: any fetch or parse problem yields an empty schema.
pub fn fetch_input_schema(
    remote: &dyn RemoteControl,
    repository: &str,
    workflow: &str,
    branch: &str,
    log: &EventLog,
) -> WorkflowSchema {
    let path = workflow_definition_path(workflow);
    let git_ref = Some(branch).filter(|b| !b.is_empty());
    let content = match remote.fetch_file_content(repository, &path, git_ref) {
        Ok(content) => content,
        Err(err) => {
            log.warn(
                "schema.fetch_failed",
                &format!("{repository}:{path}@{branch}: {err}"),
            );
            return WorkflowSchema::new();
        }
    };
    if content.trim().is_empty() {
        return WorkflowSchema::new();
    }

    match parse_input_schema(&content) {
        Ok(schema) => schema,
        Err(err) => {
            log.warn("schema.parse_failed", &format!("{repository}:{path}: {err}"));
            WorkflowSchema::new()
        }
    }
}
