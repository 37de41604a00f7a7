//! Line classifier for the mission language.
//!
//! The script arrives as already pre-processed lines. Every line is given
//! a kind on its own; lines that match nothing continue the statement
//! opened by the previous non-continuation line and are glued onto it
//! with a single space.
//
//  Classification order (first match wins):
//
//      variable      ::= … '=' …
//      function      ::= IDENT '(' …   with more '(' than ')', or balanced
//                                      and ending in '))'
//      condition     ::= 'событие' …
//      continuation  ::= anything else

use std::iter::Peekable;
use std::slice::Iter;

use tracing::debug;

use crate::error::{CompileError, Result};

/// Reserved keyword that opens an event/condition block.
pub const CONDITION_KEYWORD: &str = "событие";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Variable,
    Function,
    Condition,
    Continuation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

pub fn classify(line: &str) -> TokenKind {
    if line.contains('=') {
        TokenKind::Variable
    } else if is_function(line) {
        TokenKind::Function
    } else if line.trim().starts_with(CONDITION_KEYWORD) {
        TokenKind::Condition
    } else {
        TokenKind::Continuation
    }
}

fn is_function(line: &str) -> bool {
    if !line.contains('(') {
        return false;
    }
    let open = line.matches('(').count();
    let close = line.matches(')').count();
    if open > close {
        return true;
    }
    // balanced: only a call whose last argument is itself a call counts
    open == close
        && line
            .rfind(')')
            .and_then(|idx| line[..idx].chars().next_back())
            == Some(')')
}

/// Yields one merged token per logical statement.
pub struct Lexer<'a, S> {
    lines: Peekable<Iter<'a, S>>,
}

impl<'a, S: AsRef<str>> Lexer<'a, S> {
    pub fn new(lines: &'a [S]) -> Self {
        Self {
            lines: lines.iter().peekable(),
        }
    }
}

impl<S: AsRef<str>> Iterator for Lexer<'_, S> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.lines.next()?.as_ref();
        let kind = classify(first);
        if kind == TokenKind::Continuation {
            return Some(Err(CompileError::Format(format!(
                "`{first}` continues a statement but no statement precedes it"
            ))));
        }

        let mut text = first.to_string();
        while let Some(line) = self
            .lines
            .next_if(|l| classify(l.as_ref()) == TokenKind::Continuation)
        {
            text.push(' ');
            text.push_str(line.as_ref());
        }

        debug!(?kind, %text, "classified token");
        Some(Ok(Token { kind, text }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let test_cases = vec![
            ("глубина = 10", TokenKind::Variable),
            ("обследование_точки(высота(5), скорость(1))", TokenKind::Function),
            ("обследование_точки(", TokenKind::Function),
            ("миссия(имя(тест)", TokenKind::Function),
            ("событие(потеря_связи)", TokenKind::Condition),
            ("  событие потеря_связи", TokenKind::Condition),
            ("скорость(1), высота(5)", TokenKind::Continuation),
            (")", TokenKind::Continuation),
            // equal counts without a nested call at the end
            ("погружение(5)", TokenKind::Continuation),
        ];

        for (line, expected) in test_cases {
            assert_eq!(classify(line), expected, "{line}");
        }
    }

    #[test]
    fn test_assignment_wins_over_call() {
        assert_eq!(classify("x = f(g(1))"), TokenKind::Variable);
    }

    #[test]
    fn test_continuations_merge_into_previous_statement() {
        let lines = vec![
            "обследование_фигуры(",
            "прибор(гбо),",
            "высота(5))",
            "глубина = 3",
        ];
        let tokens: Result<Vec<_>> = Lexer::new(&lines).collect();
        let tokens = tokens.unwrap();

        assert_eq!(
            tokens,
            vec![
                Token {
                    kind: TokenKind::Function,
                    text: "обследование_фигуры( прибор(гбо), высота(5))".into(),
                },
                Token {
                    kind: TokenKind::Variable,
                    text: "глубина = 3".into(),
                },
            ]
        );
    }

    #[test]
    fn test_leading_continuation_is_an_error() {
        let lines = vec!["прибор(гбо)"];
        let first = Lexer::new(&lines).next().unwrap();
        assert!(matches!(first, Err(CompileError::Format(_))));
    }
}
