//! Error kinds raised by the compiler core.
//!
//! A `Resource` error aborts the whole compilation. Every other kind is
//! fatal for the command (or trajectory) that raised it only; the host
//! decides whether to keep going with the rest of the script.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// Rule-set resource unreadable or malformed.
    #[error("resource error: {0}")]
    Resource(String),

    /// Unparsable coordinate text or unbalanced call syntax.
    #[error("format error: {0}")]
    Format(String),

    #[error("validation error in `{command}`: {issue}")]
    Validation {
        command: String,
        issue: ValidationIssue,
    },

    /// Invalid survey-pattern argument.
    #[error("geometry error: {0}")]
    Geometry(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationIssue {
    #[error("required parameter `{parameter}` is missing")]
    Missing { parameter: String },

    #[error("cannot convert parameter `{parameter}` with value `{value}` to {expected}")]
    Coercion {
        parameter: String,
        value: String,
        expected: &'static str,
    },

    #[error("no value supplied for `{parameter}`: {reason}")]
    Declined { parameter: String, reason: String },
}

impl CompileError {
    pub fn validation(command: &str, issue: ValidationIssue) -> Self {
        CompileError::Validation {
            command: command.to_string(),
            issue,
        }
    }

    pub fn missing(command: &str, parameter: &str) -> Self {
        Self::validation(
            command,
            ValidationIssue::Missing {
                parameter: parameter.to_string(),
            },
        )
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
