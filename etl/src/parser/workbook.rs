//! Spreadsheet workbook reader (xlsx, xls, xlsb, ods) built on calamine.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::error::{WorkbookError, WorkbookResult};
use crate::parser::{RawCell, RawSheet, SheetLayout};

fn to_raw_cell(data: &Data) -> RawCell {
    match data {
        Data::Empty | Data::Error(_) => RawCell::Empty,
        Data::String(s) if s.trim().is_empty() => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        other => RawCell::Other(other.to_string()),
    }
}

/// Turn a sheet range into a [`RawSheet`].
///
/// Row and column indexes are absolute: calamine ranges start at the first
/// used cell, so leading empty rows still count towards `layout.skip_rows`.
pub fn range_to_sheet(name: &str, range: &Range<Data>, layout: SheetLayout) -> WorkbookResult<RawSheet> {
    let Some((end_row, end_col)) = range.end() else {
        return Err(WorkbookError::EmptySheet(name.to_string()));
    };

    let grid: Vec<Vec<RawCell>> = (0..=end_row)
        .map(|r| {
            (0..=end_col)
                .map(|c| range.get_value((r, c)).map(to_raw_cell).unwrap_or(RawCell::Empty))
                .collect()
        })
        .collect();

    RawSheet::from_grid(name, grid, layout)
}

/// List the sheet names of a workbook.
pub fn sheet_names<P: AsRef<Path>>(path: P) -> WorkbookResult<Vec<String>> {
    let path = path.as_ref();
    let workbook = open_workbook_auto(path).map_err(|source| WorkbookError::Open {
        path: path.display().to_string(),
        source,
    })?;
    Ok(workbook.sheet_names())
}

/// Read the requested sheets, in order.
pub fn read_workbook<P: AsRef<Path>>(path: P, sheets: &[String], layout: SheetLayout) -> WorkbookResult<Vec<RawSheet>> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path).map_err(|source| WorkbookError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let mut result = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let range = workbook
            .worksheet_range(sheet)
            .map_err(|source| WorkbookError::Sheet {
                sheet: sheet.clone(),
                source,
            })?;
        result.push(range_to_sheet(sheet, &range, layout)?);
    }

    Ok(result)
}
