//! Token stream XML dump.
//!
//! Debug aid: renders the materialized token stream as `<tokens>` markup.
//! This is a second pass over the token vector and shares no state with
//! the code generator.

use crate::tokenizer::{Token, TokenKind};

/// Escape the characters that collide with the markup itself.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render tokens as `<tokens>` markup, one element per line.
pub fn tokens_to_xml(tokens: &[Token]) -> String {
    let mut out = String::from("<tokens>\n");
    for token in tokens {
        let (tag, text) = match token.kind {
            TokenKind::Keyword => ("keyword", token.text.clone()),
            TokenKind::Symbol => ("symbol", escape(&token.text)),
            TokenKind::IntConst => ("integerConstant", token.text.clone()),
            TokenKind::StringConst => ("stringConstant", escape(token.string_value())),
            TokenKind::Identifier => ("identifier", escape(&token.text)),
        };
        out.push_str(&format!("<{}>{}</{}>\n", tag, text, tag));
    }
    out.push_str("</tokens>\n");
    out
}
