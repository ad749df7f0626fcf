//! Source workbook reading.
//!
//! Each sheet becomes a [`RawSheet`]: the header row found after skipping
//! the fixed preamble, and the data rows above the footer. [`RawSheet::into_table`]
//! then applies the IGME column layout and numeric parsing.
//!
//! ```text
//! row 0..9     preamble (title, notes)        skipped
//! row 10       ISO Code | Country | Uncertainty bounds* | U5MR.1950 | ...
//! row 11..n-1  data
//! row n        footer note                    skipped
//! ```

pub mod workbook;

use std::collections::HashSet;

use crate::error::{WorkbookError, WorkbookResult};
use crate::models::{WideRow, WideTable, LEADING_COLUMNS};

pub use workbook::{read_workbook, sheet_names};

/// Where the header sits and how many trailing rows to ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    /// Rows before the header row.
    pub skip_rows: usize,
    /// Rows after the last data row.
    pub skip_footer: usize,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            skip_rows: 10,
            skip_footer: 1,
        }
    }
}

/// A cell as read from the source, before any typing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    /// Something that is neither text nor a number (dates, booleans).
    Other(String),
}

impl RawCell {
    pub fn is_empty(&self) -> bool {
        matches!(self, RawCell::Empty)
    }

    /// Cell rendered as text; integral numbers lose their `.0`.
    pub fn text(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(s) => s.trim().to_string(),
            RawCell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            RawCell::Number(n) => n.to_string(),
            RawCell::Other(s) => s.clone(),
        }
    }

    /// Explicit numeric parse: empty and non-finite cells are missing.
    fn number(&self) -> Result<Option<f64>, String> {
        match self {
            RawCell::Empty => Ok(None),
            RawCell::Number(n) => Ok(n.is_finite().then_some(*n)),
            RawCell::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                s.parse::<f64>()
                    .map(|n| n.is_finite().then_some(n))
                    .map_err(|_| s.to_string())
            }
            RawCell::Other(s) => Err(s.clone()),
        }
    }
}

/// One sheet cut down to header + data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
    /// 1-based source row number of `rows[0]`, for error messages.
    pub first_row: usize,
}

impl RawSheet {
    /// Cut a full cell grid into header and data rows according to `layout`.
    pub fn from_grid(name: &str, grid: Vec<Vec<RawCell>>, layout: SheetLayout) -> WorkbookResult<Self> {
        let total_rows = grid.len();
        if total_rows == 0 {
            return Err(WorkbookError::EmptySheet(name.to_string()));
        }

        let header_row = layout.skip_rows;
        if header_row >= total_rows {
            return Err(WorkbookError::SheetTooShort {
                sheet: name.to_string(),
                rows: total_rows,
                header_row: header_row + 1,
            });
        }

        let data_end = total_rows.saturating_sub(layout.skip_footer);
        let data_len = data_end.saturating_sub(header_row + 1);

        let mut remaining = grid.into_iter().skip(header_row);
        let headers = remaining
            .next()
            .map(|cells| cells.iter().map(RawCell::text).collect())
            .unwrap_or_default();
        let rows = remaining.take(data_len).collect();

        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
            first_row: header_row + 2,
        })
    }

    /// Apply the IGME layout and parse value cells.
    ///
    /// Columns with no data at all are dropped first (header-only columns
    /// included); then the first three columns must be the fixed leading
    /// columns and every remaining column becomes a value column.
    /// Fully blank rows are skipped.
    pub fn into_table(self) -> WorkbookResult<WideTable> {
        let width = self
            .rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(self.headers.len());

        let cell = |row: &[RawCell], col: usize| row.get(col).cloned().unwrap_or(RawCell::Empty);

        let kept: Vec<usize> = (0..width)
            .filter(|&c| self.rows.iter().any(|r| !cell(r, c).is_empty()))
            .collect();

        let names: Vec<String> = kept
            .iter()
            .map(|&c| match self.headers.get(c).map(|h| h.trim()) {
                Some(h) if !h.is_empty() => h.to_string(),
                _ => format!("Unnamed: {}", c),
            })
            .collect();

        for (position, expected) in LEADING_COLUMNS.iter().enumerate() {
            let found = names.get(position).map(String::as_str).unwrap_or("<none>");
            if found != *expected {
                return Err(WorkbookError::MissingColumn {
                    sheet: self.name.clone(),
                    expected: expected.to_string(),
                    position,
                    found: found.to_string(),
                });
            }
        }

        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(WorkbookError::DuplicateColumn {
                    sheet: self.name.clone(),
                    column: name.clone(),
                });
            }
        }

        let value_cols = &kept[LEADING_COLUMNS.len()..];
        let mut table = WideTable::new(names[LEADING_COLUMNS.len()..].to_vec());

        for (offset, row) in self.rows.iter().enumerate() {
            if kept.iter().all(|&c| cell(row, c).is_empty()) {
                continue;
            }

            let mut values = Vec::with_capacity(value_cols.len());
            for (i, &c) in value_cols.iter().enumerate() {
                let value = cell(row, c).number().map_err(|value| WorkbookError::InvalidNumber {
                    sheet: self.name.clone(),
                    row: self.first_row + offset,
                    column: table.value_columns[i].clone(),
                    value,
                })?;
                values.push(value);
            }

            table.push_row(WideRow {
                iso_code: cell(row, kept[0]).text(),
                country: cell(row, kept[1]).text(),
                bound_label: cell(row, kept[2]).text(),
                values,
            });
        }

        Ok(table)
    }
}
