//! Expression tokenizer.
//!
//! Raw tokens are rewritten on the fly:
//!
//! | Input          | Tokens produced                     |
//! |----------------|-------------------------------------|
//! | `3!=4`, `1<=2` | one merged `≠` / `≤` / `≥` operator |
//! | `-2`, `(+1)`   | prefix `-` / `+`                    |
//! | `2(3)`, `$A$B` | `2 * (3)`, `$A * $B`                |
//! | `2 3`          | two numbers, no `*` inserted        |

use tortoise_graphics::types::Scalar;

use crate::chars::{is_digit, is_identifier_char, is_whitespace};
use crate::error::{ErrorKind, Log};
use crate::token::Token;

use super::operators;

pub struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    log: &'a mut Log,
    /// Raw token read ahead while looking for a trailing `=`.
    lookahead: Option<Token>,
    /// Token displaced by an inserted `*`.
    pending: Option<Token>,
    /// The last token handed out.
    last: Option<Token>,
    has_variable: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &str, log: &'a mut Log) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            log,
            lookahead: None,
            pending: None,
            last: None,
            has_variable: false,
        }
    }

    /// Whether any variable reference has been scanned so far.
    pub const fn has_variable(&self) -> bool {
        self.has_variable
    }

    /// The log problems are reported to.
    pub fn log(&mut self) -> &mut Log {
        self.log
    }

    /// Next token after applying the contextual rewrites.
    pub fn next_token(&mut self) -> Option<Token> {
        if let Some(token) = self.pending.take() {
            self.last = Some(token.clone());
            return Some(token);
        }

        let mut token = self.raw_token()?;

        if let Some(merged) = token.operator().and_then(operators::Operator::merged_with_eq) {
            match self.raw_token() {
                Some(Token::Operator(next)) if next.symbol == '=' => {
                    token = Token::Operator(merged);
                }
                other => self.lookahead = other,
            }
        }

        if let Token::Operator(op) = token {
            let after_operand = self
                .last
                .as_ref()
                .is_some_and(|t| !t.is_operator() && *t != Token::Open);
            if !op.is_unary() && matches!(op.symbol, '+' | '-') && !after_operand {
                if let Some(prefix) = operators::unary(op.symbol) {
                    token = Token::Operator(prefix);
                }
            }
        }

        let implicit_times = self.last.as_ref().is_some_and(|last| {
            last.ends_operand() && token.starts_operand() && !(last.is_number() && token.is_number())
        });
        if implicit_times {
            self.pending = Some(token);
            token = Token::Operator(operators::times());
        }

        self.last = Some(token.clone());
        Some(token)
    }

    fn raw_token(&mut self) -> Option<Token> {
        if let Some(token) = self.lookahead.take() {
            return Some(token);
        }
        self.scan()
    }

    fn scan(&mut self) -> Option<Token> {
        while let Some(&c) = self.chars.get(self.pos) {
            self.pos += 1;

            if is_whitespace(c) {
                continue;
            }
            if is_digit(c) || c == '.' {
                return Some(Token::Number(self.scan_number(c)));
            }
            if let Some(op) = operators::lookup(c) {
                return Some(Token::Operator(op));
            }
            match c {
                '(' => return Some(Token::Open),
                ')' => return Some(Token::Close),
                '$' => {
                    let name = self.scan_name();
                    if name.is_empty() {
                        self.log
                            .error(ErrorKind::InvalidExpression, "Empty identifier");
                        continue;
                    }
                    self.has_variable = true;
                    return Some(Token::Variable(name));
                }
                _ => self.log.error(
                    ErrorKind::InvalidExpression,
                    format!("Unknown expression token: {c}"),
                ),
            }
        }
        None
    }

    /// Digits and dots. A dot directly after another dot is dropped.
    fn scan_number(&mut self, first: char) -> Scalar {
        let mut text = String::from(first);
        let mut last_dot = first == '.';
        while let Some(&c) = self.chars.get(self.pos) {
            if is_digit(c) {
                last_dot = false;
            } else if c == '.' {
                if last_dot {
                    self.pos += 1;
                    continue;
                }
                last_dot = true;
            } else {
                break;
            }
            text.push(c);
            self.pos += 1;
        }
        leading_decimal(&text)
    }

    fn scan_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(&c) = self.chars.get(self.pos) {
            if !is_identifier_char(c) {
                break;
            }
            name.extend(c.to_uppercase());
            self.pos += 1;
        }
        name
    }
}

/// Value of the longest prefix of `text` that reads as a decimal number,
/// or 0 if there is none.
fn leading_decimal(text: &str) -> Scalar {
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in text.char_indices() {
        if c == '.' {
            if seen_dot {
                break;
            }
            seen_dot = true;
        } else if !is_digit(c) {
            break;
        }
        end = i + c.len_utf8();
    }
    text[..end].parse().unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
