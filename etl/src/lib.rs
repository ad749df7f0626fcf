//! # igme-ddf - UN IGME child mortality estimates as a DDF dataset
//!
//! Reads the UN IGME "Rates & Deaths" workbook and writes the DDF files of
//! the child mortality dataset: concepts, country entities, one datapoint
//! file per metric and uncertainty bound, and `datapackage.json`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Workbook   │────▶│   Parser    │────▶│  Transform  │────▶│  DDF CSVs   │
//! │ (4 sheets)  │     │ (wide rows) │     │ (reshape)   │     │ + manifest  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use igme_ddf::{run, EtlOptions};
//!
//! let summary = run(&EtlOptions::default()).unwrap();
//! println!("{} datapoints", summary.datapoints);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Wide table, concepts, entities, datapoints
//! - [`parser`] - Workbook reader
//! - [`transform`] - Reshaping, extraction and the pipeline
//! - [`validation`] - Wide table invariants
//! - [`output`] - DDF CSV writers and `datapackage.json`
//! - [`logs`] - Progress logging

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Reading
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Writing
pub mod output;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{OutputError, PackageError, PipelineError, ReshapeError, ValidationError, WorkbookError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Bound, Concept, ConceptType, Datapoint, Entity, MetricSeries, WideRow, WideTable};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{read_workbook, sheet_names, RawCell, RawSheet, SheetLayout};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    distinct_metrics, extract_concepts_continuous, extract_concepts_discrete, extract_entities_country,
    format_float_sigfig, parse_value_column, reshape, to_concept_id,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::validate_wide_table;

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use output::{datapoints_file_name, regenerate_datapackage, write_concepts, write_datapoints, write_entities};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    inspect, load_wide_table, run, run_table, validate_source, EtlOptions, RunSummary, SheetInfo, SourceInfo,
};
