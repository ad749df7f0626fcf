//! Country entity extraction.

use std::collections::HashSet;

use crate::models::{Entity, WideTable};
use crate::transform::ids::to_concept_id;

/// Project (ISO code, name) from every row, derive the `country` id and
/// drop duplicates, keeping first-seen order.
pub fn extract_entities_country(table: &WideTable) -> Vec<Entity> {
    let mut seen = HashSet::new();

    table
        .rows
        .iter()
        .map(|row| Entity {
            country: to_concept_id(&row.iso_code),
            iso_code: row.iso_code.clone(),
            name: row.country.clone(),
        })
        .filter(|entity| seen.insert(entity.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WideRow;

    fn row(iso: &str, name: &str, bound: &str) -> WideRow {
        WideRow {
            iso_code: iso.into(),
            country: name.into(),
            bound_label: bound.into(),
            values: vec![],
        }
    }

    #[test]
    fn test_deduplicates_bounds() {
        let mut table = WideTable::new(vec![]);
        for bound in ["Lower", "Median", "Upper"] {
            table.push_row(row("AFG", "Afghanistan", bound));
        }
        table.push_row(row("CIV", "Côte d'Ivoire", "Median"));

        let entities = extract_entities_country(&table);
        assert_eq!(
            entities,
            vec![
                Entity {
                    country: "afg".into(),
                    iso_code: "AFG".into(),
                    name: "Afghanistan".into(),
                },
                Entity {
                    country: "civ".into(),
                    iso_code: "CIV".into(),
                    name: "Côte d'Ivoire".into(),
                },
            ]
        );
    }

    #[test]
    fn test_name_variants_kept_apart() {
        let mut table = WideTable::new(vec![]);
        table.push_row(row("BOL", "Bolivia", "Median"));
        table.push_row(row("BOL", "Bolivia (Plurinational State of)", "Median"));

        assert_eq!(extract_entities_country(&table).len(), 2);
    }
}
