//! Wide to long reshaping of the IGME estimates.
//!
//! The source has one row per (country, bound) and one column per metric-year:
//!
//! ```text
//! Wide Input                                 Long Output
//! ┌──────┬────────┬───────────┬───────────┐   ┌─────────┬──────┬─────────────┐
//! │ ISO  │ Bound  │ U5MR.1990 │ U5MR.1991 │   │ country │ year │ u5mr_median │
//! │ AFG  │ Median │ 180.1     │ 175.3     │ → │ afg     │ 1990 │ 180.1       │
//! │ AFG  │ Lower  │ 170.0     │ 166.2     │   │ afg     │ 1991 │ 175.3       │
//! └──────┴────────┴───────────┴───────────┘   └─────────┴──────┴─────────────┘
//! ```
//!
//! Each metric yields three series, one per [`Bound`]. Missing cells are
//! dropped, never emitted as empty values.

use std::collections::{HashMap, HashSet};

use crate::error::{ReshapeError, ReshapeResult};
use crate::models::{Bound, Datapoint, MetricSeries, WideRow, WideTable};
use crate::transform::ids::to_concept_id;

/// A value column name split into its metric and year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricColumn {
    pub metric: String,
    pub year: i32,
}

/// Split `<Metric>.<Year>` at the last dot.
///
/// The year must be exactly four ASCII digits.
pub fn parse_value_column(column: &str) -> ReshapeResult<MetricColumn> {
    let invalid = |reason: &str| ReshapeError::InvalidColumn {
        column: column.to_string(),
        reason: reason.to_string(),
    };

    let (metric, year) = column
        .rsplit_once('.')
        .ok_or_else(|| invalid("expected '<Metric>.<Year>'"))?;

    if metric.is_empty() {
        return Err(invalid("empty metric name"));
    }
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("year suffix is not a four digit year"));
    }

    let year = year.parse::<i32>().map_err(|_| invalid("year suffix is not a number"))?;

    Ok(MetricColumn {
        metric: metric.to_string(),
        year,
    })
}

/// Distinct metric names in first-seen column order.
pub fn distinct_metrics(columns: &[String]) -> ReshapeResult<Vec<String>> {
    Ok(group_columns(columns)?
        .into_iter()
        .map(|group| group.metric)
        .collect())
}

/// Concept id of one metric-bound, e.g. `U5MR` + `Lower` → `u5mr_lower`.
pub fn series_concept(metric: &str, bound: Bound) -> String {
    to_concept_id(&format!("{}.{}", metric, bound))
}

/// Value columns of one metric as (column index, year) pairs.
struct MetricGroup {
    metric: String,
    columns: Vec<(usize, i32)>,
}

fn group_columns(columns: &[String]) -> ReshapeResult<Vec<MetricGroup>> {
    let mut seen = HashSet::new();
    let mut groups: Vec<MetricGroup> = Vec::new();
    let mut by_metric: HashMap<String, usize> = HashMap::new();

    for (idx, column) in columns.iter().enumerate() {
        if !seen.insert(column.as_str()) {
            return Err(ReshapeError::DuplicateColumn(column.clone()));
        }

        let parsed = parse_value_column(column)?;
        let slot = *by_metric.entry(parsed.metric.clone()).or_insert_with(|| {
            groups.push(MetricGroup {
                metric: parsed.metric.clone(),
                columns: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].columns.push((idx, parsed.year));
    }

    Ok(groups)
}

/// Partition rows by bound label.
fn partition_rows(rows: &[WideRow]) -> ReshapeResult<HashMap<Bound, Vec<&WideRow>>> {
    let mut partitions: HashMap<Bound, Vec<&WideRow>> = HashMap::new();

    for row in rows {
        let bound = row
            .bound_label
            .parse::<Bound>()
            .map_err(|label| ReshapeError::UnknownBound {
                iso_code: row.iso_code.clone(),
                label,
            })?;
        partitions.entry(bound).or_default().push(row);
    }

    Ok(partitions)
}

/// Unpivot one bound group of one metric.
fn unpivot(concept: &str, rows: &[&WideRow], columns: &[(usize, i32)]) -> ReshapeResult<Vec<Datapoint>> {
    let mut seen: HashSet<(String, i32)> = HashSet::new();
    let mut datapoints = Vec::new();

    for row in rows {
        let country = to_concept_id(&row.iso_code);
        for &(idx, year) in columns {
            let Some(value) = row.values.get(idx).copied().flatten() else {
                continue;
            };
            if !seen.insert((country.clone(), year)) {
                return Err(ReshapeError::DuplicateDatapoint {
                    concept: concept.to_string(),
                    country,
                    year,
                });
            }
            datapoints.push(Datapoint {
                country: country.clone(),
                year,
                value,
            });
        }
    }

    datapoints.sort_by(|a, b| a.country.cmp(&b.country).then(a.year.cmp(&b.year)));
    Ok(datapoints)
}

/// Reshape the wide table into one long series per metric and bound.
///
/// Series come out in metric first-seen order, then Lower, Median, Upper.
pub fn reshape(table: &WideTable) -> ReshapeResult<Vec<MetricSeries>> {
    let groups = group_columns(&table.value_columns)?;
    let partitions = partition_rows(&table.rows)?;
    let mut series = Vec::with_capacity(groups.len() * Bound::ALL.len());

    for group in &groups {
        for bound in Bound::ALL {
            let rows = partitions
                .get(&bound)
                .ok_or_else(|| ReshapeError::MissingBound {
                    metric: group.metric.clone(),
                    bound: bound.to_string(),
                })?;

            let concept = series_concept(&group.metric, bound);
            let datapoints = unpivot(&concept, rows, &group.columns)?;

            series.push(MetricSeries {
                concept,
                metric: group.metric.clone(),
                bound,
                datapoints,
            });
        }
    }

    Ok(series)
}
