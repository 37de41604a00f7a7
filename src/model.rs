// parameter names understood by the validator and the trajectory generator
pub const HEIGHT: &str = "высота";
pub const DEPTH: &str = "глубина";
pub const SPEED: &str = "скорость";
pub const DEVICE: &str = "прибор";
pub const COORDINATES: &str = "координаты";
pub const TRAJECTORY: &str = "траектория";
pub const LENGTH: &str = "длина";
pub const WIDTH: &str = "ширина";
pub const SPACING: &str = "межгалс";
pub const RADIUS: &str = "радиус";
pub const ANGLE: &str = "угол";
pub const LINES: &str = "линии";
pub const RAY_LENGTH: &str = "длина_луча";
pub const PASSES: &str = "проходы";
pub const DIRECTION: &str = "направление";
pub const DECIMATION: &str = "прореживание";
pub const MAX_TIME: &str = "максимальное_время";
pub const NO_LINK_TIME: &str = "время_без_связи";

// command names with special handling
pub const MISSION: &str = "миссия";
pub const FIGURE_SURVEY: &str = "обследование_фигуры";
pub const POINT_SURVEY: &str = "обследование_точки";
pub const LINE_SURVEY: &str = "обследование_линии";

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Declared type of a parameter in the global type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Float,
    Integer,
}

impl ParamType {
    /// Looks a parameter up in the global type table.
    pub fn of(parameter: &str) -> Option<ParamType> {
        match parameter {
            WIDTH | LENGTH | HEIGHT | DEPTH | SPACING | RADIUS | SPEED | ANGLE => {
                Some(ParamType::Float)
            }
            LINES | MAX_TIME | NO_LINK_TIME => Some(ParamType::Integer),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParamType::Float => "float",
            ParamType::Integer => "integer",
        }
    }
}

/// A parameter value as written in the script, a rule-set default,
/// or a value supplied by the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value; text is parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Null | Value::Bool(_) => None,
        }
    }

    pub fn is_type(&self, ty: ParamType) -> bool {
        matches!(
            (self, ty),
            (Value::Number(_), ParamType::Float) | (Value::Integer(_), ParamType::Integer)
        )
    }

    /// Converts the value to `ty`. `None` when the conversion is impossible.
    pub fn coerce(&self, ty: ParamType) -> Option<Value> {
        match (ty, self) {
            (ParamType::Float, Value::Number(n)) => Some(Value::Number(*n)),
            (ParamType::Float, Value::Integer(i)) => Some(Value::Number(*i as f64)),
            (ParamType::Float, Value::Text(s)) => s.trim().parse().ok().map(Value::Number),
            (ParamType::Integer, Value::Integer(i)) => Some(Value::Integer(*i)),
            (ParamType::Integer, Value::Number(n)) if n.is_finite() => {
                Some(Value::Integer(n.trunc() as i64))
            }
            (ParamType::Integer, Value::Text(s)) => s.trim().parse().ok().map(Value::Integer),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            // whole floats keep their decimal point so they read back as floats
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{n:.1}")
            }
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Parameter map of a command. Lookup is by key; iteration follows
/// insertion order so emitted artifacts keep the script's layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Value)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Overwrites in place when the key exists, appends otherwise.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// One navigation target in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub lon: f64,
    pub lat: f64,
}

impl Waypoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Both axes rounded to 6 decimal places (~0.11 m).
    pub fn rounded(lon: f64, lat: f64) -> Self {
        Self {
            lon: round6(lon),
            lat: round6(lat),
        }
    }
}

pub fn round6(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}

/// Validation rule set: what every command must carry, what it gets by
/// default, and what a survey pattern additionally demands.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub required: HashMap<String, Vec<String>>,
    pub optional: HashMap<String, Params>,
    /// command → ordered (pattern keyword, dependent parameters)
    pub trajectory_dependent: HashMap<String, Vec<(String, Vec<String>)>>,
}

impl RuleSet {
    pub fn required_for(&self, command: &str) -> &[String] {
        self.required.get(command).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_required(&self, command: &str, parameter: &str) -> bool {
        self.required_for(command).iter().any(|p| p == parameter)
    }
}
