//! Script-level `name = value` bindings.

use std::collections::HashMap;

use super::expr;
use crate::model::Value;

// bound on identifier chains followed during one evaluation; cyclic
// bindings give up here and fall back to the raw text
const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    vars: HashMap<String, Value>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the literal right-hand side of a raw `name = value` line.
    /// Text without `=` is ignored.
    pub fn bind(&mut self, raw: &str) {
        if let Some((name, value)) = raw.split_once('=') {
            self.vars
                .insert(name.trim().to_string(), Value::text(value.trim()));
        }
    }

    /// Binds `name` to `expr` evaluated over the current bindings, or to
    /// the raw text when it is not arithmetic.
    pub fn bind_evaluated(&mut self, name: &str, expr: &str) {
        let value = self
            .evaluate(expr, 0)
            .map(Value::Number)
            .unwrap_or_else(|| Value::text(expr));
        self.vars.insert(name.to_string(), value);
    }

    /// Bound value, evaluated best-effort when it is stored as text.
    pub fn resolve(&self, name: &str) -> Option<Value> {
        let value = self.vars.get(name)?;
        Some(match value {
            Value::Text(s) => self
                .evaluate(s, 0)
                .map(Value::Number)
                .unwrap_or_else(|| value.clone()),
            other => other.clone(),
        })
    }

    pub fn resolve_or(&self, name: &str, default: Value) -> Value {
        self.resolve(name).unwrap_or(default)
    }

    fn evaluate(&self, src: &str, depth: usize) -> Option<f64> {
        if depth > MAX_DEPTH {
            return None;
        }
        expr::evaluate(src, &|name: &str| self.number(name, depth + 1))
    }

    fn number(&self, name: &str, depth: usize) -> Option<f64> {
        match self.vars.get(name)? {
            Value::Text(s) => self.evaluate(s, depth),
            other => other.as_f64(),
        }
    }
}
