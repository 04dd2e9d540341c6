//! Spreadsheet engine API.
//!
//! This module provides the computation pieces the document layer builds on:
//!
//! - [`Contents`], [`CellValue`] - what a cell holds and what it shows
//! - [`CellName`] - canonical cell names (`A1`, `BC27`)
//! - [`DependencyGraph`] - bidirectional edge set between cells
//! - [`recalculation_order`] - dependency-ordered recompute list with cycle detection
//! - [`tokenize`], [`Formula`] - formula tokenizing, validation and canonical form
//! - [`Formula::evaluate`] - two-stack arithmetic evaluation
//! - [`format_number`] - canonical number text

mod cell;
mod cell_name;
mod cycle;
mod eval;
mod format;
mod formula;
mod graph;
mod tokenize;

pub use cell::{CellValue, Contents};
pub use cell_name::{CellName, is_valid_name};
pub use cycle::{CircularDependency, recalculation_order};
pub use eval::{Evaluation, FormulaError};
pub use format::format_number;
pub use formula::{Formula, FormulaFormatError, Operator, Token};
pub use graph::DependencyGraph;
pub use tokenize::tokenize;
