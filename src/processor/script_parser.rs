//! Analyzer: turns classified tokens into structured commands.
//!
//! Variables are bound as they appear, function calls are pulled apart
//! into `name + parameters` with variable references substituted, and
//! condition blocks are passed through verbatim.

use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use super::ast::{Command, Entry};
use super::lexer::{Lexer, TokenKind};
use super::variables::VariableTable;
use crate::error::{CompileError, Result};
use crate::model::{Params, Value};

/// `key(value)` where the value holds no parentheses.
static PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\(([^()]+)\)").expect("static regex"));

pub fn analyze<S: AsRef<str>>(lines: &[S]) -> Result<Vec<Entry>> {
    let mut analyzer = Analyzer::new();
    analyzer.analyze(lines)
}

#[derive(Debug, Default)]
pub struct Analyzer {
    vars: VariableTable,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analyze<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<Vec<Entry>> {
        let mut res = Vec::<Entry>::new();
        for token in Lexer::new(lines) {
            let token = token?;
            match token.kind {
                TokenKind::Variable => self.vars.bind(&token.text),
                TokenKind::Function => {
                    let cmd = extract_command(&token.text)?;
                    res.push(Entry::Command(self.substitute(cmd)));
                }
                TokenKind::Condition => res.push(Entry::Condition(token.text)),
                // the lexer never yields a bare continuation
                TokenKind::Continuation => {}
            }
        }
        info!(entries = res.len(), "analysis finished");
        Ok(res)
    }

    /// Replaces every value that names a bound variable with its value.
    fn substitute(&self, mut cmd: Command) -> Command {
        for (_, value) in cmd.params.iter_mut() {
            let resolved = match value {
                Value::Text(name) => self.vars.resolve(name),
                _ => None,
            };
            if let Some(resolved) = resolved {
                *value = resolved;
            }
        }
        cmd
    }
}

/// Splits `name(key1(v1), key2(v2), …)` into a command.
pub fn extract_command(text: &str) -> Result<Command> {
    let (open, close) = match (text.find('('), text.rfind(')')) {
        (Some(open), Some(close)) if open < close => (open, close),
        _ => {
            return Err(CompileError::Format(format!(
                "`{text}` is not a complete call"
            )));
        }
    };
    if text.matches('(').count() != text.matches(')').count() {
        return Err(CompileError::Format(format!(
            "unbalanced parentheses in `{text}`"
        )));
    }

    let name = text[..open].trim();
    if name.is_empty() {
        return Err(CompileError::Format(format!(
            "call without a command name: `{text}`"
        )));
    }

    let params = PARAM
        .captures_iter(&text[open + 1..close])
        .map(|caps| (caps[1].to_string(), literal(caps[2].trim())))
        .collect::<Params>();

    Ok(Command::new(name, params))
}

/// Digits with at most one decimal point become a number.
fn literal(payload: &str) -> Value {
    let digits = payload.replacen('.', "", 1);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(n) = payload.parse::<f64>() {
            return Value::Number(n);
        }
    }
    Value::text(payload)
}
