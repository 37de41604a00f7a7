use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value as Json};
use tracing::{debug, info};

use crate::error::{CompileError, Result};
use crate::model::{Params, RuleSet, Value};

/// Trims every line and drops blank lines and `#` comments.
pub fn preprocess_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Reads a mission script and returns its pre-processed lines.
pub fn load_script(path: &Path) -> std::io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    info!("Script loaded, size: {} bytes", text.len());
    Ok(preprocess_lines(&text))
}

/// On-disk shape of the rule set.
///
/// ```json
/// { "Required":            { "cmd": ["p", …] },
///   "Optional":            { "cmd": [{ "p": default, … }] },
///   "TrajectoryDependent": { "cmd": { "pattern": ["p", …] } } }
/// ```
#[derive(Debug, Deserialize)]
struct RawRules {
    #[serde(rename = "Required", default)]
    required: HashMap<String, Vec<String>>,
    #[serde(rename = "Optional", default)]
    optional: HashMap<String, OptionalDefaults>,
    #[serde(rename = "TrajectoryDependent", default)]
    trajectory_dependent: HashMap<String, Map<String, Json>>,
}

/// Defaults are historically stored as a one-element list holding the map.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OptionalDefaults {
    Listed(Vec<Map<String, Json>>),
    Bare(Map<String, Json>),
}

/// Parse the rule-set JSON. Any structural problem is a resource error.
pub fn load_rules(json: &str) -> Result<RuleSet> {
    let raw: RawRules = serde_json::from_str(json)
        .map_err(|e| CompileError::Resource(format!("malformed rule set: {e}")))?;

    let mut rules = RuleSet {
        required: raw.required,
        ..RuleSet::default()
    };

    for (cmd, defaults) in raw.optional {
        let map = match defaults {
            OptionalDefaults::Listed(list) => list.into_iter().next().unwrap_or_default(),
            OptionalDefaults::Bare(map) => map,
        };
        let mut params = Params::new();
        for (param, value) in map {
            let value: Value = serde_json::from_value(value).map_err(|e| {
                CompileError::Resource(format!("default for `{cmd}.{param}`: {e}"))
            })?;
            params.insert(param, value);
        }
        rules.optional.insert(cmd, params);
    }

    for (cmd, patterns) in raw.trajectory_dependent {
        let mut dependent = Vec::with_capacity(patterns.len());
        for (pattern, params) in patterns {
            let params: Vec<String> = serde_json::from_value(params).map_err(|e| {
                CompileError::Resource(format!("dependent parameters of `{cmd}.{pattern}`: {e}"))
            })?;
            dependent.push((pattern, params));
        }
        rules.trajectory_dependent.insert(cmd, dependent);
    }

    debug!(
        required = rules.required.len(),
        optional = rules.optional.len(),
        dependent = rules.trajectory_dependent.len(),
        "rule set parsed"
    );
    Ok(rules)
}

pub fn load_rules_file(path: &Path) -> Result<RuleSet> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        CompileError::Resource(format!("cannot read rule set {}: {e}", path.display()))
    })?;
    load_rules(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_drops_comments_and_blanks() {
        let text = "# миссия\n\n  глубина = 5  \n\t# ещё комментарий\nмиссия(имя(тест))\n";
        assert_eq!(
            preprocess_lines(text),
            vec!["глубина = 5".to_string(), "миссия(имя(тест))".to_string()]
        );
    }

    #[test]
    fn test_load_rules_both_optional_shapes() {
        let json = r#"{
            "Required": { "обследование_точки": ["высота", "скорость"] },
            "Optional": {
                "обследование_точки": [{ "прибор": "гбо", "угол": 0, "заметка": null }],
                "миссия": { "время_без_связи": 60 }
            },
            "TrajectoryDependent": {
                "обследование_точки": { "меандр": ["длина", "ширина", "межгалс"], "спираль": ["радиус"] }
            }
        }"#;
        let rules = load_rules(json).unwrap();

        assert_eq!(rules.required_for("обследование_точки"), ["высота", "скорость"]);
        let point = &rules.optional["обследование_точки"];
        let keys: Vec<_> = point.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["прибор", "угол", "заметка"]);
        assert_eq!(point.get("угол"), Some(&Value::Integer(0)));
        assert_eq!(point.get("заметка"), Some(&Value::Null));
        assert_eq!(
            rules.optional["миссия"].get("время_без_связи"),
            Some(&Value::Integer(60))
        );

        let dependent = &rules.trajectory_dependent["обследование_точки"];
        assert_eq!(dependent[0].0, "меандр");
        assert_eq!(dependent[1].1, vec!["радиус".to_string()]);
    }

    #[test]
    fn test_sections_are_optional() {
        let rules = load_rules("{}").unwrap();
        assert!(rules.required.is_empty());
        assert!(rules.required_for("миссия").is_empty());
    }

    #[test]
    fn test_malformed_rules_are_resource_errors() {
        for json in [
            "not json",
            r#"{ "Required": { "миссия": "высота" } }"#,
            r#"{ "Optional": { "миссия": { "x": [1, 2] } } }"#,
            r#"{ "TrajectoryDependent": { "миссия": { "меандр": 5 } } }"#,
        ] {
            assert!(
                matches!(load_rules(json), Err(CompileError::Resource(_))),
                "{json}"
            );
        }
    }
}
