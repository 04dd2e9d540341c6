//! depsheet-core - UI-agnostic cell store, recalculation + storage.

pub mod error;
pub mod sheet;
pub mod storage;

pub use error::{Result, SheetError};
pub use sheet::Spreadsheet;

pub use depsheet_engine::engine::{CellName, CellValue, Contents, Formula, FormulaError};
