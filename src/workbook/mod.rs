//! # Workbook Access
//!
//! The I/O rim around the engine: opening an XLSX container and yielding an
//! untyped [`Grid`](crate::grid::Grid) per sheet, and writing a rectangular
//! grid back out as a minimal single-sheet XLSX file. No cell typing happens
//! here — values stay empty, text, or number exactly as stored.

use crate::error::SheetCarverError;
use std::ffi::OsStr;
use std::path::Path;
use thiserror::Error;

pub mod criteria;
pub mod writer;
pub(crate) mod xlsx;

pub use writer::write_table;
pub use xlsx::XlsxWorkbook;

/// Errors raised while opening and reading workbook containers.
#[derive(Error, Debug)]
pub enum WorkbookError {
    /// Unsupported or unrecognized file format
    #[error("Cannot detect file format for '{name}'")]
    InvalidFileFormat { name: String },

    /// Requested sheet does not exist in the workbook
    #[error("Sheet '{name}' not found in '{file}'")]
    SheetNotFound { file: String, name: String },

    /// A required archive member is missing
    #[error("Missing '{0}' in workbook archive")]
    MissingArchiveFile(String),

    /// A cell referenced a shared string the string table does not hold
    #[error("Shared string {index} not found in '{file}'")]
    SharedStringNotFound { file: String, index: usize },
}

/// Opens a workbook file, dispatching on the file extension.
/// Only the Excel 2007+ XML formats are supported.
pub fn open_workbook<P>(path: P) -> Result<XlsxWorkbook, SheetCarverError>
where
    P: AsRef<Path>,
{
    match path.as_ref().extension().and_then(OsStr::to_str) {
        Some("xlsx") | Some("xlsm") => XlsxWorkbook::open(path.as_ref()),
        _ => Err(WorkbookError::InvalidFileFormat {
            name: path.as_ref().to_string_lossy().to_string(),
        })?,
    }
}

/// Converts 0-based row & column indexes to an Excel-style cell reference
/// ("A1", "B7", "AA10").
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let row = (row + 1).to_string();
    let mut col: u32 = col as u32 + 1;
    let mut reference = String::new();
    while col > 0 {
        col -= 1;
        let digit = char::from_u32(65 + col % 26).expect("Hardcode letters");
        col /= 26;
        reference.insert(0, digit);
    }
    reference.push_str(row.as_str());
    reference
}

/// Parses an Excel-style cell reference back to 0-based (row, column)
/// indexes. Returns None for malformed references.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    let col = letters
        .chars()
        .map(|letter| letter.to_ascii_uppercase() as usize - 'A' as usize + 1)
        .reduce(|index, digit| index * 26 + digit)?;
    let row: usize = digits.parse().ok().filter(|row| *row > 0)?;
    Some((row - 1, col - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_round_trip() {
        for (row, col, reference) in [(0, 0, "A1"), (6, 1, "B7"), (9, 26, "AA10"), (99, 701, "ZZ100")] {
            assert_eq!(index_to_reference(row, col), reference);
            assert_eq!(reference_to_index(reference), Some((row, col)));
        }
    }

    #[test]
    fn malformed_references_parse_to_none() {
        assert_eq!(reference_to_index(""), None);
        assert_eq!(reference_to_index("B"), None);
        assert_eq!(reference_to_index("7B"), None);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(matches!(
            open_workbook("dictionary.ods"),
            Err(SheetCarverError::WorkbookError(WorkbookError::InvalidFileFormat { .. }))
        ));
    }
}
