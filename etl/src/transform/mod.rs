//! Transformation module.
//!
//! This module turns the IGME wide table into DDF tables:
//! - Ids: identifier normalization and value formatting
//! - Reshape: wide metric-year columns to long datapoint series
//! - Concepts / Entities: the metadata tables
//! - Pipeline: end-to-end run

pub mod concepts;
pub mod entities;
pub mod ids;
pub mod pipeline;
pub mod reshape;

pub use concepts::{extract_concepts_continuous, extract_concepts_discrete};
pub use entities::extract_entities_country;
pub use ids::{format_float_sigfig, to_concept_id};
pub use pipeline::*;
pub use reshape::{distinct_metrics, parse_value_column, reshape, series_concept, MetricColumn};
