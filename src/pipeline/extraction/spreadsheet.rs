//! Spreadsheet decoder (.xls, .xlsx, .xlsm, .ods) via calamine.
//!
//! All sheets of a workbook are stacked vertically on their absolute
//! column positions, then the stacked table is read column by column.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use super::types::{BatchExtraction, FormatDecoder};
use super::DecodeError;
use crate::pipeline::import::{FormatFamily, SourceFile};

pub struct SpreadsheetDecoder;

impl FormatDecoder for SpreadsheetDecoder {
    fn family(&self) -> FormatFamily {
        FormatFamily::Spreadsheet
    }

    fn extract_batch(&self, files: &[SourceFile]) -> BatchExtraction {
        BatchExtraction::per_file(files, |source| extract_workbook(&source.path))
    }
}

pub fn extract_workbook(path: &Path) -> Result<Vec<String>, DecodeError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| DecodeError::Spreadsheet(e.to_string()))?;

    let mut stacked: Vec<Vec<Option<String>>> = Vec::new();
    for name in workbook.sheet_names().to_owned() {
        match workbook.worksheet_range(&name) {
            Ok(range) => stacked.extend(sheet_rows(&range)),
            Err(e) => {
                tracing::warn!(sheet = %name, error = %e, "Skipping unreadable sheet");
            }
        }
    }

    Ok(column_major(&stacked))
}

/// Rows of a sheet, padded on the left so cells keep their absolute column.
fn sheet_rows(range: &Range<Data>) -> Vec<Vec<Option<String>>> {
    let column_offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    range
        .rows()
        .map(|row| {
            let mut cells = vec![None; column_offset];
            cells.extend(row.iter().map(cell_to_string));
            cells
        })
        .collect()
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(text) => Some(text.clone()),
        _ => Some(cell.to_string()),
    }
}

/// Read a ragged table column by column, skipping empty cells.
pub fn column_major(rows: &[Vec<Option<String>>]) -> Vec<String> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    (0..width)
        .flat_map(|col| rows.iter().filter_map(move |row| row.get(col).cloned().flatten()))
        .collect()
}
