//! Spreadsheet state and logic (UI-agnostic).

mod io;
mod ops;
mod state;

pub use state::Spreadsheet;
