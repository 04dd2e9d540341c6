//! Cell contents and values.
//!
//! - [`Contents`] - what the user typed: a number, text, or a formula
//! - [`CellValue`] - what the cell shows: a number, text, or a formula error

use std::collections::BTreeSet;
use std::fmt;

use super::CellName;
use super::eval::FormulaError;
use super::format::format_number;
use super::formula::{Formula, FormulaFormatError};

/// The contents of a cell. Empty text means "no contents".
#[derive(Clone, Debug, PartialEq)]
pub enum Contents {
    Number(f64),
    Text(String),
    Formula(Formula),
}

impl Contents {
    /// The contents of a cell that was never set.
    pub fn empty() -> Contents {
        Contents::Text(String::new())
    }

    /// Classify user input.
    /// - Starts with '=' -> Formula (the rest must be a valid formula)
    /// - Parses as a finite number (surrounding whitespace allowed) -> Number
    /// - Otherwise -> Text, kept exactly as typed (including the empty string)
    pub fn from_input(input: &str) -> Result<Contents, FormulaFormatError> {
        if let Some(formula) = input.strip_prefix('=') {
            return Ok(Contents::Formula(Formula::parse(formula)?));
        }

        match input.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Contents::Number(n)),
            _ => Ok(Contents::Text(input.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Contents::Text(s) if s.is_empty())
    }

    /// Cells this contents reads: the formula's variables, else nothing.
    pub fn dependees(&self) -> BTreeSet<CellName> {
        match self {
            Contents::Formula(f) => f.variables(),
            _ => BTreeSet::new(),
        }
    }

    /// Text that recreates these contents when passed back to [`Contents::from_input`].
    pub fn to_input_string(&self) -> String {
        match self {
            Contents::Number(n) => format_number(*n),
            Contents::Text(s) => s.clone(),
            Contents::Formula(f) => format!("={}", f),
        }
    }
}

impl Default for Contents {
    fn default() -> Self {
        Contents::empty()
    }
}

/// The computed value of a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Error(FormulaError),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Text(String::new())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Error(e) => write!(f, "#ERROR: {}", e),
        }
    }
}
