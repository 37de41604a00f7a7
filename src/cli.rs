use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Parser;

use crate::model::{ParamType, Value};
use crate::processor::validator::ValueResolver;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Mission script (.yappi)
    pub input: PathBuf,
    /// Validation rule set (.json)
    pub rules: PathBuf,
    /// Mission plan output file
    #[arg(short, long, default_value = "mission.json")]
    pub output: PathBuf,
    /// Also write the verified script listing here
    #[arg(long)]
    pub verified: Option<PathBuf>,
    /// Fail on missing parameters instead of asking for them
    #[arg(long)]
    pub no_prompt: bool,
    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Asks the operator for missing parameters, re-asking until the answer
/// converts to the parameter's declared type.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_answer(&mut self) -> Result<String, String> {
        let mut line = String::new();
        let n = self.input.read_line(&mut line).map_err(|e| e.to_string())?;
        if n == 0 {
            return Err("input closed".to_string());
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> ValueResolver for Prompt<R, W> {
    fn resolve_missing(&mut self, command: &str, parameter: &str) -> Result<Value, String> {
        let ty = ParamType::of(parameter);
        loop {
            write!(
                self.output,
                "Введите значение параметра '{parameter}' для команды '{command}': "
            )
            .and_then(|_| self.output.flush())
            .map_err(|e| e.to_string())?;

            let answer = Value::text(self.read_answer()?);
            let Some(ty) = ty else {
                return Ok(answer);
            };
            match answer.coerce(ty) {
                Some(value) => return Ok(value),
                None => writeln!(
                    self.output,
                    "Ошибка: введите корректное значение для параметра {parameter} (ожидается {})",
                    ty.name()
                )
                .map_err(|e| e.to_string())?,
            }
        }
    }
}
