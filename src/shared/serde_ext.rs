use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

pub fn parse_via_string<'de, D, T, F>(deserializer: D, kind: &str, parser: F) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    F: FnOnce(&str) -> Result<T, String>,
{
    let raw = String::deserialize(deserializer)?;
    parser(&raw).map_err(|err| D::Error::custom(format!("invalid {kind} `{raw}`: {err}")))
}

/// Renders a YAML scalar the way it would be typed on a command line.
/// Returns `None` for sequences and mappings.
pub fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Null => Some(String::new()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => None,
    }
}

pub fn deserialize_scalar_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, serde_yaml::Value>>::deserialize(deserializer)?;
    let mut out = BTreeMap::new();
    for (key, value) in raw.unwrap_or_default() {
        let rendered = scalar_to_string(&value)
            .ok_or_else(|| D::Error::custom(format!("value for `{key}` must be a scalar")))?;
        out.insert(key, rendered);
    }
    Ok(out)
}
