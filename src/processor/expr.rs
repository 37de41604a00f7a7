//! Closed arithmetic evaluator for variable expressions.
//!
//! Only numeric literals, bound variable names, unary `+`/`-`, the four
//! binary operators and parentheses are understood. Anything else makes
//! the evaluation fail and the caller keeps the raw text.
//
//      expr    ::= term (('+' | '-') term)*
//      term    ::= unary (('*' | '/') unary)*
//      unary   ::= ('+' | '-') unary | primary
//      primary ::= NUMBER | IDENT | '(' expr ')'

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Num(f64),
    Ident(String),
    Op(char),
    Open,
    Close,
}

fn tokenize(src: &str) -> Option<Vec<Tok>> {
    let mut chars = src.chars().peekable();
    let mut out = Vec::new();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' | '-' | '*' | '/' => {
                chars.next();
                out.push(Tok::Op(c));
            }
            '(' => {
                chars.next();
                out.push(Tok::Open);
            }
            ')' => {
                chars.next();
                out.push(Tok::Close);
            }
            c if c.is_ascii_digit() || c == '.' => out.push(Tok::Num(read_number(&mut chars)?)),
            c if c.is_alphabetic() || c == '_' => {
                let mut id = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        id.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push(Tok::Ident(id));
            }
            _ => return None,
        }
    }
    Some(out)
}

fn read_number(chars: &mut Peekable<Chars<'_>>) -> Option<f64> {
    let mut num = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            num.push(c);
            chars.next();
        } else {
            break;
        }
    }
    num.parse().ok()
}

struct Eval<'a, F> {
    toks: &'a [Tok],
    pos: usize,
    lookup: &'a F,
}

impl<F: Fn(&str) -> Option<f64>> Eval<'_, F> {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    fn bump(&mut self) -> Option<&Tok> {
        let tok = self.toks.get(self.pos);
        self.pos += 1;
        tok
    }

    fn expr(&mut self) -> Option<f64> {
        let mut acc = self.term()?;
        while let Some(Tok::Op(op @ ('+' | '-'))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.term()?;
            acc = if op == '+' { acc + rhs } else { acc - rhs };
        }
        Some(acc)
    }

    fn term(&mut self) -> Option<f64> {
        let mut acc = self.unary()?;
        while let Some(Tok::Op(op @ ('*' | '/'))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.unary()?;
            if op == '*' {
                acc *= rhs;
            } else if rhs == 0.0 {
                return None;
            } else {
                acc /= rhs;
            }
        }
        Some(acc)
    }

    fn unary(&mut self) -> Option<f64> {
        match self.peek() {
            Some(Tok::Op('-')) => {
                self.pos += 1;
                Some(-self.unary()?)
            }
            Some(Tok::Op('+')) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Option<f64> {
        match self.bump()?.clone() {
            Tok::Num(n) => Some(n),
            Tok::Ident(name) => (self.lookup)(&name),
            Tok::Open => {
                let v = self.expr()?;
                match self.bump()? {
                    Tok::Close => Some(v),
                    _ => None,
                }
            }
            Tok::Op(_) | Tok::Close => None,
        }
    }
}

/// Evaluates `src`, resolving identifiers through `lookup`.
/// `None` when the text is not a complete arithmetic expression.
pub fn evaluate<F>(src: &str, lookup: &F) -> Option<f64>
where
    F: Fn(&str) -> Option<f64>,
{
    let toks = tokenize(src)?;
    if toks.is_empty() {
        return None;
    }
    let mut eval = Eval {
        toks: &toks,
        pos: 0,
        lookup,
    };
    let value = eval.expr()?;
    (eval.pos == toks.len() && value.is_finite()).then_some(value)
}
