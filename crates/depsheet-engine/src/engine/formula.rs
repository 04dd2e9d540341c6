//! Formula parsing and validation.
//!
//! A [`Formula`] is built once from text, validated against the grammar, and
//! is immutable afterwards. Its canonical text (variables uppercased, numbers
//! normalized, no whitespace) is computed at construction and defines
//! equality and hashing: `x1 + 2.0` and `X1+2` are the same formula.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use thiserror::Error;

use super::cell_name::CellName;
use super::format::format_number;
use super::tokenize::{is_number_literal, tokenize};

/// Binary arithmetic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    fn from_token(token: &str) -> Option<Operator> {
        match token {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Sub),
            "*" => Some(Operator::Mul),
            "/" => Some(Operator::Div),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }

    /// `+` or `-`.
    pub fn is_additive(self) -> bool {
        matches!(self, Operator::Add | Operator::Sub)
    }

    /// `*` or `/`.
    pub fn is_multiplicative(self) -> bool {
        !self.is_additive()
    }
}

/// A validated formula token.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Open,
    Close,
    Op(Operator),
    Var(CellName),
    Number(f64),
}

impl Token {
    /// Numbers, variables and `(` may start an operand.
    fn starts_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Var(_) | Token::Open)
    }

    /// Numbers, variables and `)` may end an operand.
    fn ends_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Var(_) | Token::Close)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Open => f.write_str("("),
            Token::Close => f.write_str(")"),
            Token::Op(op) => write!(f, "{}", op.symbol()),
            Token::Var(name) => write!(f, "{}", name),
            Token::Number(n) => f.write_str(&format_number(*n)),
        }
    }
}

/// Why formula text was rejected. [`FormulaFormatError::rule`] gives the
/// number of the grammar rule that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormulaFormatError {
    #[error("formula is empty")]
    Empty,

    #[error("formula cannot start with '{0}'")]
    InvalidFirstToken(String),

    #[error("formula cannot end with '{0}'")]
    InvalidLastToken(String),

    #[error("closing parenthesis at token {position} has no matching opening parenthesis")]
    UnbalancedClosing { position: usize },

    #[error("unbalanced parentheses: {open} opening, {close} closing")]
    UnbalancedParentheses { open: usize, close: usize },

    #[error("'{found}' cannot follow '{after}': expected a number, variable or '('")]
    InvalidAfterOpening { after: String, found: String },

    #[error("'{found}' cannot follow '{after}': expected an operator or ')'")]
    InvalidAfterOperand { after: String, found: String },

    #[error("unrecognized token '{0}'")]
    UnrecognizedToken(String),

    #[error("number '{0}' is out of range")]
    NumberOutOfRange(String),
}

impl FormulaFormatError {
    /// Number of the grammar rule that was violated (1-8).
    pub fn rule(&self) -> u8 {
        match self {
            FormulaFormatError::Empty => 1,
            FormulaFormatError::InvalidFirstToken(_) => 2,
            FormulaFormatError::InvalidLastToken(_) => 3,
            FormulaFormatError::UnbalancedClosing { .. } => 4,
            FormulaFormatError::UnbalancedParentheses { .. } => 5,
            FormulaFormatError::InvalidAfterOpening { .. } => 6,
            FormulaFormatError::InvalidAfterOperand { .. } => 7,
            FormulaFormatError::UnrecognizedToken(_)
            | FormulaFormatError::NumberOutOfRange(_) => 8,
        }
    }
}

/// A parsed, validated infix formula.
#[derive(Clone, Debug)]
pub struct Formula {
    tokens: Vec<Token>,
    canonical: String,
}

impl Formula {
    /// Parse and validate formula text (without a leading `=`).
    pub fn parse(text: &str) -> Result<Formula, FormulaFormatError> {
        let raw = tokenize(text);
        if raw.is_empty() {
            return Err(FormulaFormatError::Empty);
        }

        let mut tokens: Vec<Token> = Vec::with_capacity(raw.len());
        let mut open = 0usize;
        let mut close = 0usize;

        for (position, raw_token) in raw.iter().enumerate() {
            let token = classify(raw_token)?;

            match tokens.last() {
                None if !token.starts_operand() => {
                    return Err(FormulaFormatError::InvalidFirstToken(raw_token.to_string()));
                }
                Some(prev) if !prev.ends_operand() && !token.starts_operand() => {
                    return Err(FormulaFormatError::InvalidAfterOpening {
                        after: prev.to_string(),
                        found: raw_token.to_string(),
                    });
                }
                Some(prev) if prev.ends_operand() && token.starts_operand() => {
                    return Err(FormulaFormatError::InvalidAfterOperand {
                        after: prev.to_string(),
                        found: raw_token.to_string(),
                    });
                }
                _ => {}
            }

            match token {
                Token::Open => open += 1,
                Token::Close => {
                    close += 1;
                    if close > open {
                        return Err(FormulaFormatError::UnbalancedClosing { position });
                    }
                }
                _ => {}
            }

            tokens.push(token);
        }

        if let Some(last) = tokens.last().filter(|t| !t.ends_operand()) {
            return Err(FormulaFormatError::InvalidLastToken(last.to_string()));
        }
        if open != close {
            return Err(FormulaFormatError::UnbalancedParentheses { open, close });
        }

        let canonical = tokens.iter().map(Token::to_string).collect();
        Ok(Formula { tokens, canonical })
    }

    /// The validated tokens, in order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Distinct variables referenced by the formula.
    pub fn variables(&self) -> BTreeSet<CellName> {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                Token::Var(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Canonical text: uppercase variables, normalized numbers, no spaces.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

fn classify(text: &str) -> Result<Token, FormulaFormatError> {
    if text == "(" {
        return Ok(Token::Open);
    }
    if text == ")" {
        return Ok(Token::Close);
    }
    if let Some(op) = Operator::from_token(text) {
        return Ok(Token::Op(op));
    }
    if let Some(name) = CellName::parse(text) {
        return Ok(Token::Var(name));
    }
    if is_number_literal(text) {
        return match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Token::Number(n)),
            _ => Err(FormulaFormatError::NumberOutOfRange(text.to_string())),
        };
    }
    Err(FormulaFormatError::UnrecognizedToken(text.to_string()))
}

impl std::str::FromStr for Formula {
    type Err = FormulaFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::parse(s)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Formula {}

impl Hash for Formula {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}
