//! Rule-driven parameter validation.
//!
//! Every command goes through the same fixed sequence: pattern bootstrap
//! (point survey only), height/depth normalization, required check,
//! optional defaults, type coercion. Values that cannot be derived are
//! asked from a [`ValueResolver`].

use tracing::debug;

use super::ast::Command;
use crate::error::{CompileError, Result, ValidationIssue};
use crate::model::{DEPTH, HEIGHT, POINT_SURVEY, ParamType, Params, RuleSet, TRAJECTORY, Value};

/// Source of values the script did not provide, typically the operator.
pub trait ValueResolver {
    /// `Err(reason)` when no value can be supplied.
    fn resolve_missing(
        &mut self,
        command: &str,
        parameter: &str,
    ) -> std::result::Result<Value, String>;
}

impl<F> ValueResolver for F
where
    F: FnMut(&str, &str) -> std::result::Result<Value, String>,
{
    fn resolve_missing(
        &mut self,
        command: &str,
        parameter: &str,
    ) -> std::result::Result<Value, String> {
        self(command, parameter)
    }
}

/// Resolver for non-interactive runs: every request is refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decline;

impl ValueResolver for Decline {
    fn resolve_missing(&mut self, _: &str, _: &str) -> std::result::Result<Value, String> {
        Err("interactive input is disabled".to_string())
    }
}

pub struct Validator<'a> {
    rules: &'a RuleSet,
}

impl<'a> Validator<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Runs the fixed sequence on one command; conditions never get here.
    pub fn validate_command(
        &self,
        mut cmd: Command,
        resolver: &mut dyn ValueResolver,
    ) -> Result<Command> {
        if cmd.name == POINT_SURVEY {
            self.bootstrap_pattern(&mut cmd, resolver)?;
        }
        self.normalize_height_depth(&mut cmd, resolver)?;
        self.check_required(&mut cmd, resolver)?;
        self.apply_optional(&mut cmd);
        coerce_types(&cmd.name, &mut cmd.params)?;
        debug!(command = %cmd.name, params = cmd.params.len(), "command validated");
        Ok(cmd)
    }

    /// Makes sure the survey pattern is known, then completes whatever
    /// parameters the matching patterns depend on.
    fn bootstrap_pattern(&self, cmd: &mut Command, resolver: &mut dyn ValueResolver) -> Result<()> {
        if !cmd.params.contains(TRAJECTORY) {
            let value = ask(resolver, &cmd.name, TRAJECTORY)?;
            cmd.params.insert(TRAJECTORY, value);
        }
        let Some(dependent) = self.rules.trajectory_dependent.get(&cmd.name) else {
            return Ok(());
        };

        let pattern = match cmd.params.get(TRAJECTORY) {
            Some(Value::Text(s)) => s.to_lowercase(),
            Some(other) => other.to_string().to_lowercase(),
            None => String::new(),
        };
        for (keyword, params) in dependent {
            if !pattern.contains(&keyword.to_lowercase()) {
                continue;
            }
            for param in params {
                if !cmd.params.contains(param) {
                    let value = ask(resolver, &cmd.name, param)?;
                    cmd.params.insert(param.as_str(), value);
                }
            }
        }
        Ok(())
    }

    /// Folds depth into a negative height; never leaves both behind.
    pub fn normalize_height_depth(
        &self,
        cmd: &mut Command,
        resolver: &mut dyn ValueResolver,
    ) -> Result<()> {
        let has_height = cmd.params.contains(HEIGHT);
        match cmd.params.remove(DEPTH) {
            Some(_) if has_height => {}
            Some(depth) => {
                let metres = depth.as_f64().ok_or_else(|| {
                    CompileError::validation(
                        &cmd.name,
                        ValidationIssue::Coercion {
                            parameter: DEPTH.to_string(),
                            value: depth.to_string(),
                            expected: ParamType::Float.name(),
                        },
                    )
                })?;
                cmd.params.insert(HEIGHT, Value::Number(-metres.abs()));
            }
            None if !has_height && self.rules.is_required(&cmd.name, HEIGHT) => {
                let value = ask(resolver, &cmd.name, HEIGHT)?;
                cmd.params.insert(HEIGHT, value);
            }
            None => {}
        }
        Ok(())
    }

    fn check_required(&self, cmd: &mut Command, resolver: &mut dyn ValueResolver) -> Result<()> {
        for param in self.rules.required_for(&cmd.name) {
            if !cmd.params.contains(param) {
                let value = ask(resolver, &cmd.name, param)?;
                cmd.params.insert(param.as_str(), value);
            }
        }
        Ok(())
    }

    fn apply_optional(&self, cmd: &mut Command) {
        let Some(defaults) = self.rules.optional.get(&cmd.name) else {
            return;
        };
        for (param, default) in defaults.iter() {
            if !cmd.params.contains(param) {
                cmd.params.insert(param, default.clone());
            }
        }
    }
}

/// Asks the resolver and types the answer per the global type table.
fn ask(resolver: &mut dyn ValueResolver, command: &str, parameter: &str) -> Result<Value> {
    debug!(command, parameter, "resolving missing parameter");
    let value = resolver
        .resolve_missing(command, parameter)
        .map_err(|reason| {
            CompileError::validation(
                command,
                ValidationIssue::Declined {
                    parameter: parameter.to_string(),
                    reason,
                },
            )
        })?;
    match ParamType::of(parameter) {
        Some(ty) => coerce(command, parameter, &value, ty),
        None => Ok(value),
    }
}

/// Converts every parameter with a declared type; `null` is left alone.
pub fn coerce_types(command: &str, params: &mut Params) -> Result<()> {
    for (name, value) in params.iter_mut() {
        let Some(ty) = ParamType::of(name) else {
            continue;
        };
        if *value == Value::Null || value.is_type(ty) {
            continue;
        }
        *value = coerce(command, name, value, ty)?;
    }
    Ok(())
}

fn coerce(command: &str, parameter: &str, value: &Value, ty: ParamType) -> Result<Value> {
    value.coerce(ty).ok_or_else(|| {
        CompileError::validation(
            command,
            ValidationIssue::Coercion {
                parameter: parameter.to_string(),
                value: value.to_string(),
                expected: ty.name(),
            },
        )
    })
}
