//! Domain models for the IGME to DDF pipeline.
//!
//! - [`WideTable`] / [`WideRow`] - the source layout, one row per country and bound
//! - [`Bound`] - Lower / Median / Upper uncertainty bound
//! - [`Concept`] / [`ConceptType`] - rows of the DDF concept files
//! - [`Entity`] - rows of the country entity file
//! - [`Datapoint`] / [`MetricSeries`] - long rows for one metric-bound

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Leading Columns
// =============================================================================

/// Country ISO code column.
pub const ISO_CODE_COLUMN: &str = "ISO Code";

/// Country display name column.
pub const COUNTRY_COLUMN: &str = "Country";

/// Uncertainty bound label column.
pub const BOUND_COLUMN: &str = "Uncertainty bounds*";

/// The fixed columns preceding the `<Metric>.<Year>` value columns.
pub const LEADING_COLUMNS: [&str; 3] = [ISO_CODE_COLUMN, COUNTRY_COLUMN, BOUND_COLUMN];

// =============================================================================
// Bound
// =============================================================================

/// Uncertainty interval endpoint or central estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bound {
    Lower,
    Median,
    Upper,
}

impl Bound {
    /// All bounds, in output order.
    pub const ALL: [Bound; 3] = [Bound::Lower, Bound::Median, Bound::Upper];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bound::Lower => "Lower",
            Bound::Median => "Median",
            Bound::Upper => "Upper",
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bound {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Lower" => Ok(Bound::Lower),
            "Median" => Ok(Bound::Median),
            "Upper" => Ok(Bound::Upper),
            other => Err(other.to_string()),
        }
    }
}

// =============================================================================
// Wide Table
// =============================================================================

/// One source row: a country, a bound label, and its value cells.
///
/// `values` is aligned with [`WideTable::value_columns`]; `None` is a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub iso_code: String,
    pub country: String,
    pub bound_label: String,
    pub values: Vec<Option<f64>>,
}

/// The source table: leading columns are implicit, value columns are named.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideTable {
    pub value_columns: Vec<String>,
    pub rows: Vec<WideRow>,
}

impl WideTable {
    pub fn new(value_columns: Vec<String>) -> Self {
        Self {
            value_columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating its values to the column count.
    pub fn push_row(&mut self, mut row: WideRow) {
        row.values.resize(self.value_columns.len(), None);
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stack tables vertically.
    ///
    /// Columns are the union of all inputs in first-seen order; a row gets
    /// a missing cell for every column its own table did not have.
    pub fn concat(tables: Vec<WideTable>) -> WideTable {
        let mut columns: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for table in &tables {
            for column in &table.value_columns {
                if !positions.contains_key(column) {
                    positions.insert(column.clone(), columns.len());
                    columns.push(column.clone());
                }
            }
        }

        let mut result = WideTable::new(columns);
        for table in tables {
            let mapping: Vec<usize> = table
                .value_columns
                .iter()
                .map(|c| positions[c])
                .collect();

            for row in table.rows {
                let mut values = vec![None; result.value_columns.len()];
                for (src, value) in row.values.into_iter().enumerate() {
                    if let Some(&dst) = mapping.get(src) {
                        values[dst] = value;
                    }
                }
                result.rows.push(WideRow { values, ..row });
            }
        }

        result
    }
}

// =============================================================================
// Concepts & Entities
// =============================================================================

/// DDF concept type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptType {
    Measure,
    String,
    EntityDomain,
    Time,
}

/// A row of `ddf--concepts--*.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub concept: String,
    pub name: String,
    pub concept_type: ConceptType,
}

impl Concept {
    pub fn new(concept: impl Into<String>, name: impl Into<String>, concept_type: ConceptType) -> Self {
        Self {
            concept: concept.into(),
            name: name.into(),
            concept_type,
        }
    }
}

/// A row of `ddf--entities--country.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub country: String,
    pub iso_code: String,
    pub name: String,
}

// =============================================================================
// Datapoints
// =============================================================================

/// One long row: a country-year value for a single metric-bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Datapoint {
    pub country: String,
    pub year: i32,
    pub value: f64,
}

/// All datapoints of one metric-bound concept, sorted by (country, year).
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    /// Concept id, e.g. `u5mr_lower`.
    pub concept: String,
    /// Source metric name, e.g. `U5MR`.
    pub metric: String,
    pub bound: Bound,
    pub datapoints: Vec<Datapoint>,
}

impl MetricSeries {
    pub fn len(&self) -> usize {
        self.datapoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datapoints.is_empty()
    }
}
