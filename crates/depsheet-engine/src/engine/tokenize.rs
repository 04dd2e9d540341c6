//! Formula tokenizer.
//!
//! Splits formula text into raw tokens: parentheses, the four operators,
//! variables (`A1`, `bc27`) and non-negative number literals (`3`, `2.5`,
//! `.5`, `1e-3`). Whitespace only separates tokens. Any stretch of text that
//! matches none of these is still returned as a token of its own, so the
//! validator can reject it with a precise message.

use regex::Regex;
use std::sync::OnceLock;

use super::cell_name::NAME_PATTERN;

/// Non-negative decimal literal with optional exponent (unanchored).
pub(crate) const NUMBER_PATTERN: &str =
    r"(?:[0-9]+\.[0-9]*|[0-9]*\.[0-9]+|[0-9]+)(?:[eE][+-]?[0-9]+)?";

fn token_re() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| {
        let pattern = format!(r"\(|\)|[+\-*/]|{NAME_PATTERN}|{NUMBER_PATTERN}|\s+");
        Regex::new(&pattern).expect("formula token regex must compile")
    })
}

fn number_re() -> &'static Regex {
    static NUMBER_RE: OnceLock<Regex> = OnceLock::new();
    NUMBER_RE.get_or_init(|| {
        Regex::new(&format!("^{NUMBER_PATTERN}$")).expect("number literal regex must compile")
    })
}

/// Returns true if `token` is a complete number literal.
pub fn is_number_literal(token: &str) -> bool {
    number_re().is_match(token)
}

/// Split a formula into raw tokens, dropping whitespace.
pub fn tokenize(formula: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut last_end = 0;

    for m in token_re().find_iter(formula) {
        push_unmatched(&formula[last_end..m.start()], &mut tokens);
        if !m.as_str().trim().is_empty() {
            tokens.push(m.as_str());
        }
        last_end = m.end();
    }
    push_unmatched(&formula[last_end..], &mut tokens);

    tokens
}

fn push_unmatched<'a>(gap: &'a str, tokens: &mut Vec<&'a str>) {
    if !gap.trim().is_empty() {
        tokens.push(gap);
    }
}
