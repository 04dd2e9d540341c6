use crate::error::{Result, SheetError};
use depsheet_engine::engine::{CellName, CellValue, Contents, DependencyGraph};
use std::collections::{BTreeSet, HashMap};

/// A non-empty cell: what was typed and what it currently evaluates to.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Cell {
    pub contents: Contents,
    pub value: CellValue,
}

/// UI-agnostic spreadsheet state.
///
/// Only non-empty cells are stored. Each entry keeps contents and cached value
/// together, so a cell is present with both or absent with neither.
#[derive(Clone, Debug, Default)]
pub struct Spreadsheet {
    /// Non-empty cells by canonical name
    pub(crate) cells: HashMap<CellName, Cell>,
    /// (dependee, dependent) edges derived from formula contents
    pub(crate) graph: DependencyGraph<CellName>,
    /// Whether contents changed since the last load or save
    pub(crate) changed: bool,
}

impl Spreadsheet {
    /// Create an empty spreadsheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a cell: a number, text, or formula error.
    /// Empty cells have the value `""`.
    pub fn value(&self, name: &str) -> Result<CellValue> {
        let name = parse_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map(|cell| cell.value.clone())
            .unwrap_or_default())
    }

    /// Contents of a cell as typed. Empty cells contain `""`.
    pub fn contents(&self, name: &str) -> Result<Contents> {
        let name = parse_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map(|cell| cell.contents.clone())
            .unwrap_or_default())
    }

    /// Text that recreates a cell through `set_content`; `""` for empty cells.
    pub fn string_form(&self, name: &str) -> Result<String> {
        let name = parse_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map(|cell| cell.contents.to_input_string())
            .unwrap_or_default())
    }

    /// Names of all non-empty cells.
    pub fn non_empty_names(&self) -> BTreeSet<CellName> {
        self.cells.keys().cloned().collect()
    }

    /// Cells whose formulas mention `name` directly, sorted.
    /// `name` itself need not be non-empty.
    pub fn direct_dependents(&self, name: &str) -> Result<Vec<CellName>> {
        let name = parse_name(name)?;
        let mut dependents: Vec<CellName> = self.graph.dependents(&name).cloned().collect();
        dependents.sort();
        Ok(dependents)
    }

    /// Whether contents changed since the spreadsheet was created, loaded or saved.
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

pub(crate) fn parse_name(name: &str) -> Result<CellName> {
    CellName::parse(name).ok_or_else(|| SheetError::InvalidName(name.to_string()))
}
