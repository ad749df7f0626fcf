//! Wide table invariant checks.
//!
//! The reshaper stops at the first problem it meets; this module collects
//! every violation at once so a bad source can be fixed in one pass.
//!
//! Checked:
//! - every value column is `<Metric>.<Year>` and appears once
//! - every row has an ISO code and a Lower / Median / Upper bound label
//! - each of the three bounds occurs in at least one row
//!
//! # Example
//!
//! ```
//! use igme_ddf::{validate_wide_table, WideRow, WideTable};
//!
//! let mut table = WideTable::new(vec!["U5MR.1990".into()]);
//! for bound in ["Lower", "Median", "Upper"] {
//!     table.push_row(WideRow {
//!         iso_code: "AFG".into(),
//!         country: "Afghanistan".into(),
//!         bound_label: bound.into(),
//!         values: vec![Some(1.0)],
//!     });
//! }
//! assert!(validate_wide_table(&table).is_ok());
//! ```

use std::collections::HashSet;

use crate::models::{Bound, WideTable};
use crate::transform::reshape::parse_value_column;

/// Check all invariants.
///
/// # Returns
/// * `Ok(())` if the table can be reshaped
/// * `Err(Vec<String>)` with one message per violation
pub fn validate_wide_table(table: &WideTable) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for column in &table.value_columns {
        if !seen.insert(column.as_str()) {
            errors.push(format!("Duplicate column '{}'", column));
        }
        if let Err(e) = parse_value_column(column) {
            errors.push(e.to_string());
        }
    }

    let mut bounds = HashSet::new();
    for (i, row) in table.rows.iter().enumerate() {
        if row.iso_code.trim().is_empty() {
            errors.push(format!("Row {}: empty ISO code", i));
        }
        match row.bound_label.parse::<Bound>() {
            Ok(bound) => {
                bounds.insert(bound);
            }
            Err(label) => errors.push(format!(
                "Row {} ({}): unknown uncertainty bound '{}'",
                i, row.iso_code, label
            )),
        }
    }

    if !table.value_columns.is_empty() {
        for bound in Bound::ALL {
            if !bounds.contains(&bound) {
                errors.push(format!("No rows with uncertainty bound '{}'", bound));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
