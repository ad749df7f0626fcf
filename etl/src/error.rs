//! Error types for the IGME to DDF pipeline.
//!
//! - [`WorkbookError`] - reading the source workbook
//! - [`ReshapeError`] - wide to long reshaping
//! - [`ValidationError`] - wide table invariants
//! - [`OutputError`] - writing DDF CSV files
//! - [`PackageError`] - building `datapackage.json`
//! - [`PipelineError`] - top-level orchestration
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Source Reading Errors
// =============================================================================

/// Errors while loading the wide table from the workbook.
#[derive(Debug, Error)]
pub enum WorkbookError {
    /// Workbook could not be opened.
    #[error("Failed to open workbook '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: calamine::Error,
    },

    /// Sheet could not be read (missing or corrupt).
    #[error("Failed to read sheet '{sheet}': {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    /// Sheet holds no cells at all.
    #[error("Sheet '{0}' is empty")]
    EmptySheet(String),

    /// Sheet ends before the header row.
    #[error("Sheet '{sheet}' has {rows} rows, header expected at row {header_row}")]
    SheetTooShort {
        sheet: String,
        rows: usize,
        header_row: usize,
    },

    /// One of the fixed leading columns is absent or misplaced.
    #[error("Sheet '{sheet}': expected column '{expected}' at position {position}, found '{found}'")]
    MissingColumn {
        sheet: String,
        expected: String,
        position: usize,
        found: String,
    },

    /// The same header appears twice in one sheet.
    #[error("Sheet '{sheet}': duplicate column '{column}'")]
    DuplicateColumn { sheet: String, column: String },

    /// A value cell is neither empty nor numeric.
    #[error("Sheet '{sheet}', row {row}, column '{column}': not a number ('{value}')")]
    InvalidNumber {
        sheet: String,
        row: usize,
        column: String,
        value: String,
    },
}

// =============================================================================
// Reshape Errors
// =============================================================================

/// Errors while reshaping the wide table into long datapoints.
#[derive(Debug, Error)]
pub enum ReshapeError {
    /// Value column name is not `<Metric>.<Year>`.
    #[error("Invalid value column '{column}': {reason}")]
    InvalidColumn { column: String, reason: String },

    /// Column name appears more than once.
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// No row carries one of the three bound labels.
    #[error("Metric '{metric}' has no '{bound}' rows")]
    MissingBound { metric: String, bound: String },

    /// Bound label outside Lower/Median/Upper.
    #[error("Unknown uncertainty bound '{label}' for country '{iso_code}'")]
    UnknownBound { iso_code: String, label: String },

    /// Two input cells map to the same output row.
    #[error("Duplicate datapoint for '{concept}': country '{country}', year {year}")]
    DuplicateDatapoint {
        concept: String,
        country: String,
        year: i32,
    },
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Wide table invariant violations.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One or more invariants failed.
    #[error("Validation failed: {}", errors.join("; "))]
    Invariants { errors: Vec<String> },
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors while writing DDF CSV files.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Output IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Datapackage Errors
// =============================================================================

/// Errors while building or writing `datapackage.json`.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Datapackage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read CSV header: {0}")]
    Csv(#[from] csv::Error),

    #[error("Datapackage JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File name does not follow the `ddf--<kind>--...` convention.
    #[error("Not a DDF file name: {0}")]
    InvalidFileName(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Source error: {0}")]
    Workbook(#[from] WorkbookError),

    #[error("Reshape error: {0}")]
    Reshape(#[from] ReshapeError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Datapackage error: {0}")]
    Package(#[from] PackageError),

    /// Source holds no data rows.
    #[error("No rows to transform")]
    EmptyInput,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

pub type WorkbookResult<T> = Result<T, WorkbookError>;

pub type ReshapeResult<T> = Result<T, ReshapeError>;

pub type OutputResult<T> = Result<T, OutputError>;

pub type PackageResult<T> = Result<T, PackageError>;

pub type PipelineResult<T> = Result<T, PipelineError>;
