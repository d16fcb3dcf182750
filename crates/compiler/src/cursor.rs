//! Random-access cursor over a materialized token stream.
//!
//! The compilation engine looks at the current token, occasionally peeks
//! one ahead, and consumes tokens with `expect`. Running off the end of
//! the stream mid-grammar is a syntax error reported at the last token's
//! line.

use crate::error::CompileError;
use crate::tokenizer::{Token, TokenKind};

pub struct TokenCursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenCursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenCursor { tokens, pos: 0 }
    }

    pub fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub fn peek(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    pub fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub fn has_more(&self) -> bool {
        self.pos < self.tokens.len()
    }

    /// Line of the current token, or of the last token once the stream is
    /// exhausted. Used to annotate diagnostics.
    pub fn line(&self) -> usize {
        match self.current() {
            Some(token) => token.line,
            None => self.tokens.last().map_or(0, |t| t.line),
        }
    }

    /// True when the current token's text equals `text`.
    pub fn at(&self, text: &str) -> bool {
        self.current().is_some_and(|t| t == text)
    }

    /// True when the current token's text is one of `set`.
    pub fn at_any(&self, set: &[&str]) -> bool {
        self.current().is_some_and(|t| set.contains(&t.text.as_str()))
    }

    /// Consume the current token if its text is in `expected`, otherwise
    /// fail with the expected/found diagnostic.
    pub fn expect(&mut self, expected: &[&str]) -> Result<Token, CompileError> {
        match self.current() {
            Some(token) if expected.contains(&token.text.as_str()) => {
                let token = token.clone();
                self.advance();
                Ok(token)
            }
            _ => Err(self.mismatch(&quote_list(expected))),
        }
    }

    /// Consume the current token, which must be an identifier.
    pub fn expect_identifier(&mut self) -> Result<Token, CompileError> {
        match self.current() {
            Some(token) if token.kind == TokenKind::Identifier => {
                let token = token.clone();
                self.advance();
                Ok(token)
            }
            _ => Err(self.mismatch("an identifier")),
        }
    }

    /// Build a syntax error describing what was expected at the current
    /// position.
    pub fn mismatch(&self, expected: &str) -> CompileError {
        CompileError::Syntax {
            line: self.line(),
            expected: expected.to_string(),
            found: self
                .current()
                .map_or_else(|| "end of file".to_string(), |t| t.text.clone()),
        }
    }
}

fn quote_list(set: &[&str]) -> String {
    set.iter()
        .map(|s| format!("'{}'", s))
        .collect::<Vec<_>>()
        .join(" or ")
}
