//! Error types for depsheet core.

use std::fmt;

use depsheet_engine::engine::{CellName, CircularDependency, FormulaFormatError};
use thiserror::Error;

/// Errors that abort a spreadsheet operation without changing it.
///
/// Formula evaluation problems (an undefined cell, division by zero) are not
/// errors here: they become the cell's value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SheetError {
    #[error("Invalid cell name: {0}")]
    InvalidName(String),

    #[error("Invalid formula: {0}")]
    FormulaFormat(#[from] FormulaFormatError),

    #[error("Circular dependency detected through {0}")]
    CircularDependency(CellName),

    #[error("Contents cannot be stored as cell input: {0:?}")]
    InvalidContents(String),

    #[error("Read/write error: {0}")]
    ReadWrite(String),
}

impl SheetError {
    /// Wrap a lower-level failure, keeping only its message.
    pub(crate) fn read_write(context: impl fmt::Display, cause: impl fmt::Display) -> Self {
        SheetError::ReadWrite(format!("{}: {}", context, cause))
    }
}

impl From<CircularDependency<CellName>> for SheetError {
    fn from(err: CircularDependency<CellName>) -> Self {
        SheetError::CircularDependency(err.start)
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
