//! Storage format for spreadsheets.
//!
//! The on-disk format is JSON:
//!
//! ```json
//! { "Cells": { "A1": { "StringForm": "5" }, "B1": { "StringForm": "=A1+2" } } }
//! ```
//!
//! Each `StringForm` is exactly the input that recreates the cell.

mod json;

pub use json::{
    CellRecord, SheetFile, parse_sheet_file, parse_sheet_json, write_sheet_file, write_sheet_json,
};
