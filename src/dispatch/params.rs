use crate::schema::WorkflowSchema;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterWarning {
    CaseCorrected {
        key: String,
        from: String,
        to: String,
    },
    NotAllowed {
        key: String,
        value: String,
        allowed: Vec<String>,
    },
    Malformed {
        raw: String,
    },
}

impl std::fmt::Display for ParameterWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CaseCorrected { key, from, to } => {
                write!(f, "Correcting '{from}' to '{to}' for '{key}'")
            }
            Self::NotAllowed {
                key,
                value,
                allowed,
            } => write!(
                f,
                "Invalid value '{value}' for '{key}'; allowed values: {}",
                allowed.join(", ")
            ),
            Self::Malformed { raw } => {
                write!(f, "Ignoring parameter '{raw}'; expected KEY=VALUE")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedParameters {
    pub parameters: BTreeMap<String, String>,
    pub ignored: Vec<ParameterWarning>,
}

/// Project defaults overlaid with `KEY=VALUE` overrides, applied in order.
/// Only the first `=` separates key from value.
pub fn merge_parameters(
    defaults: &BTreeMap<String, String>,
    overrides: &[String],
) -> MergedParameters {
    let mut merged = MergedParameters {
        parameters: defaults.clone(),
        ignored: Vec::new(),
    };
    for raw in overrides {
        match raw.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                merged.parameters.insert(key.to_string(), value.to_string());
            }
            _ => merged.ignored.push(ParameterWarning::Malformed { raw: raw.clone() }),
        }
    }
    merged
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedParameters {
    pub parameters: BTreeMap<String, String>,
    pub warnings: Vec<ParameterWarning>,
}

/// Advisory reconciliation against the declared options. Never drops or adds
/// a key; values outside the options are kept and only warned about.
pub fn normalize(
    schema: &WorkflowSchema,
    params: &BTreeMap<String, String>,
) -> NormalizedParameters {
    let mut out = NormalizedParameters::default();
    for (key, value) in params {
        let fixed = match schema.get(key).filter(|spec| !spec.options.is_empty()) {
            None => value.clone(),
            Some(spec) if spec.options.iter().any(|opt| opt == value) => value.clone(),
            Some(spec) => match spec
                .options
                .iter()
                .find(|opt| opt.to_lowercase() == value.to_lowercase())
            {
                Some(canonical) => {
                    out.warnings.push(ParameterWarning::CaseCorrected {
                        key: key.clone(),
                        from: value.clone(),
                        to: canonical.clone(),
                    });
                    canonical.clone()
                }
                None => {
                    out.warnings.push(ParameterWarning::NotAllowed {
                        key: key.clone(),
                        value: value.clone(),
                        allowed: spec.options.clone(),
                    });
                    value.clone()
                }
            },
        };
        out.parameters.insert(key.clone(), fixed);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{InputType, WorkflowInputSpec};

    fn choice(name: &str, options: &[&str]) -> (String, WorkflowInputSpec) {
        (
            name.to_string(),
            WorkflowInputSpec {
                name: name.to_string(),
                input_type: InputType::Choice,
                options: options.iter().map(|o| o.to_string()).collect(),
                default_value: None,
                required: false,
                description: String::new(),
            },
        )
    }

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn overrides_win_and_split_on_first_equals() {
        let defaults = params(&[("env", "staging"), ("region", "eu")]);
        let merged = merge_parameters(
            &defaults,
            &[
                "env=production".to_string(),
                "message=a=b".to_string(),
                "env=canary".to_string(),
            ],
        );
        assert_eq!(
            merged.parameters,
            params(&[("env", "canary"), ("message", "a=b"), ("region", "eu")])
        );
        assert!(merged.ignored.is_empty());
    }

    #[test]
    fn overrides_without_equals_are_reported() {
        let merged = merge_parameters(&BTreeMap::new(), &["flag".to_string(), "=x".to_string()]);
        assert!(merged.parameters.is_empty());
        assert_eq!(merged.ignored.len(), 2);
    }

    #[test]
    fn case_mismatch_is_corrected_with_warning() {
        let schema: WorkflowSchema = [choice("env", &["staging", "production"])].into();
        let result = normalize(&schema, &params(&[("env", "Staging")]));
        assert_eq!(result.parameters, params(&[("env", "staging")]));
        assert_eq!(
            result.warnings,
            vec![ParameterWarning::CaseCorrected {
                key: "env".to_string(),
                from: "Staging".to_string(),
                to: "staging".to_string(),
            }]
        );
    }

    #[test]
    fn unknown_value_is_kept_with_warning() {
        let schema: WorkflowSchema = [choice("env", &["staging", "production"])].into();
        let result = normalize(&schema, &params(&[("env", "qa")]));
        assert_eq!(result.parameters, params(&[("env", "qa")]));
        assert!(matches!(
            result.warnings.as_slice(),
            [ParameterWarning::NotAllowed { value, .. }] if value == "qa"
        ));
        assert!(result.warnings[0].to_string().contains("staging, production"));
    }

    #[test]
    fn unconstrained_and_unknown_keys_pass_through() {
        let mut schema: WorkflowSchema = [choice("env", &["staging"])].into();
        let (name, mut free) = choice("message", &[]);
        free.input_type = InputType::String;
        schema.insert(name, free);

        let input = params(&[("message", "Hello"), ("extra", "X")]);
        let result = normalize(&schema, &input);
        assert_eq!(result.parameters, input);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn normalize_is_idempotent_and_preserves_keys() {
        let schema: WorkflowSchema = [
            choice("env", &["staging", "production"]),
            choice("tier", &["Gold", "silver"]),
        ]
        .into();
        let input = params(&[("env", "PRODUCTION"), ("tier", "gold"), ("other", "z")]);

        let once = normalize(&schema, &input);
        assert_eq!(
            once.parameters.keys().collect::<Vec<_>>(),
            input.keys().collect::<Vec<_>>()
        );

        let twice = normalize(&schema, &once.parameters);
        assert_eq!(twice.parameters, once.parameters);
        assert!(twice.warnings.is_empty());
    }

    #[test]
    fn empty_schema_passes_everything_through() {
        let input = params(&[("env", "Staging")]);
        let result = normalize(&WorkflowSchema::new(), &input);
        assert_eq!(result.parameters, input);
        assert!(result.warnings.is_empty());
    }
}
