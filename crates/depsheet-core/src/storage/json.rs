//! Reader and writer for the JSON spreadsheet format.

use crate::error::{Result, SheetError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

const MAX_SHEET_FILE_BYTES: u64 = 64 * 1_048_576; // 64 MiB

/// One stored cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    /// Input that recreates the cell. Entries without one are skipped on load.
    #[serde(rename = "StringForm")]
    pub string_form: Option<String>,
}

impl CellRecord {
    pub fn new(string_form: impl Into<String>) -> Self {
        CellRecord {
            string_form: Some(string_form.into()),
        }
    }
}

/// A whole spreadsheet file. Cells keep the order they appear in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetFile {
    #[serde(rename = "Cells", with = "ordered_cells")]
    pub cells: Vec<(String, CellRecord)>,
}

/// Parse spreadsheet JSON from a string.
pub fn parse_sheet_json(content: &str) -> Result<SheetFile> {
    serde_json::from_str(content).map_err(|e| SheetError::read_write("Invalid spreadsheet data", e))
}

/// Read and parse a spreadsheet file.
pub fn parse_sheet_file(path: &Path) -> Result<SheetFile> {
    let meta = fs::metadata(path)
        .map_err(|e| SheetError::read_write(format!("Cannot read {}", path.display()), e))?;
    if meta.len() > MAX_SHEET_FILE_BYTES {
        return Err(SheetError::ReadWrite(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_SHEET_FILE_BYTES
        )));
    }
    let content = fs::read_to_string(path)
        .map_err(|e| SheetError::read_write(format!("Cannot read {}", path.display()), e))?;
    debug!(path = %path.display(), bytes = content.len(), "read spreadsheet file");
    parse_sheet_json(&content)
}

/// Serialize a spreadsheet, optionally indented.
pub fn write_sheet_json(file: &SheetFile, pretty: bool) -> Result<String> {
    let result = if pretty {
        serde_json::to_string_pretty(file)
    } else {
        serde_json::to_string(file)
    };
    result.map_err(|e| SheetError::read_write("Cannot serialize spreadsheet", e))
}

/// Serialize a spreadsheet and write it to `path`.
pub fn write_sheet_file(path: &Path, file: &SheetFile, pretty: bool) -> Result<()> {
    let content = write_sheet_json(file, pretty)?;
    fs::write(path, content)
        .map_err(|e| SheetError::read_write(format!("Cannot write {}", path.display()), e))?;
    debug!(path = %path.display(), cells = file.cells.len(), "wrote spreadsheet file");
    Ok(())
}

/// `Cells` as a JSON object, read and written in document order.
mod ordered_cells {
    use super::CellRecord;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(
        cells: &[(String, CellRecord)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(cells.len()))?;
        for (name, record) in cells {
            map.serialize_entry(name, record)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, CellRecord)>, D::Error> {
        struct CellsVisitor;

        impl<'de> Visitor<'de> for CellsVisitor {
            type Value = Vec<(String, CellRecord)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from cell names to cells")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut cells = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, CellRecord>()? {
                    cells.push(entry);
                }
                Ok(cells)
            }
        }

        deserializer.deserialize_map(CellsVisitor)
    }
}
