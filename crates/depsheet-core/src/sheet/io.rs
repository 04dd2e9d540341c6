use super::Spreadsheet;
use crate::error::{Result, SheetError};
use crate::storage::{
    CellRecord, SheetFile, parse_sheet_file, parse_sheet_json, write_sheet_file, write_sheet_json,
};
use std::path::Path;
use tracing::info;

impl Spreadsheet {
    /// Load a spreadsheet from a JSON file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let sheet = Self::from_sheet_file(parse_sheet_file(path)?)?;
        info!(path = %path.display(), cells = sheet.len(), "opened spreadsheet");
        Ok(sheet)
    }

    /// Build a spreadsheet from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_sheet_file(parse_sheet_json(json)?)
    }

    /// Replace every cell with the contents of `json`.
    /// On error the spreadsheet is left as it was.
    pub fn replace_from_json(&mut self, json: &str) -> Result<()> {
        *self = Self::from_json_str(json)?;
        Ok(())
    }

    /// Serialize to JSON, cells sorted by name.
    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        write_sheet_json(&self.to_sheet_file(), pretty)
    }

    /// Write the spreadsheet to `path` as compact JSON and clear the changed flag.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.write_to(path.as_ref(), false)
    }

    /// Like [`Spreadsheet::save`], with indented JSON.
    pub fn save_pretty(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.write_to(path.as_ref(), true)
    }

    fn write_to(&mut self, path: &Path, pretty: bool) -> Result<()> {
        write_sheet_file(path, &self.to_sheet_file(), pretty)?;
        self.changed = false;
        info!(path = %path.display(), cells = self.len(), "saved spreadsheet");
        Ok(())
    }

    fn to_sheet_file(&self) -> SheetFile {
        let cells = self
            .non_empty_names()
            .into_iter()
            .filter_map(|name| {
                let cell = self.cells.get(&name)?;
                Some((name.into_string(), CellRecord::new(cell.contents.to_input_string())))
            })
            .collect();
        SheetFile { cells }
    }

    /// Replay every stored entry through `set_content`, in file order.
    fn from_sheet_file(file: SheetFile) -> Result<Self> {
        let mut sheet = Spreadsheet::new();
        for (name, record) in file.cells {
            let Some(input) = record.string_form else {
                continue;
            };
            sheet
                .set_content(&name, &input)
                .map_err(|e| SheetError::read_write(format!("cell {}", name), e))?;
        }
        sheet.changed = false;
        Ok(sheet)
    }
}
