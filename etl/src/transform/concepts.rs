//! Concept extraction: the continuous (measure) and discrete concept tables.

use crate::error::ReshapeResult;
use crate::models::{Bound, Concept, ConceptType, COUNTRY_COLUMN, ISO_CODE_COLUMN};
use crate::transform::ids::to_concept_id;
use crate::transform::reshape::distinct_metrics;

/// One `measure` concept per metric and bound.
///
/// Pure function of the value column names; row count has no influence.
pub fn extract_concepts_continuous(value_columns: &[String]) -> ReshapeResult<Vec<Concept>> {
    let metrics = distinct_metrics(value_columns)?;

    Ok(metrics
        .iter()
        .flat_map(|metric| {
            Bound::ALL.into_iter().map(move |bound| {
                let name = format!("{}.{}", metric, bound);
                Concept::new(to_concept_id(&name), name, ConceptType::Measure)
            })
        })
        .collect())
}

/// The fixed discrete concepts: ISO code, country domain, name and year.
pub fn extract_concepts_discrete() -> Vec<Concept> {
    let string_and_domain = [
        (ISO_CODE_COLUMN, ConceptType::String),
        (COUNTRY_COLUMN, ConceptType::EntityDomain),
        ("Name", ConceptType::String),
    ];

    let mut concepts: Vec<Concept> = string_and_domain
        .into_iter()
        .map(|(name, kind)| Concept::new(to_concept_id(name), name, kind))
        .collect();

    concepts.push(Concept::new("year", "Year", ConceptType::Time));
    concepts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_three_concepts_per_metric() {
        let cols = columns(&["U5MR.1990", "U5MR.1991", "IMR.1990", "Neonatal Deaths.1990"]);
        let concepts = extract_concepts_continuous(&cols).unwrap();

        assert_eq!(concepts.len(), 9);
        assert!(concepts.iter().all(|c| c.concept_type == ConceptType::Measure));
        assert_eq!(concepts[0], Concept::new("u5mr_lower", "U5MR.Lower", ConceptType::Measure));
        assert_eq!(concepts[5].concept, "imr_upper");
        assert_eq!(concepts[7].name, "Neonatal Deaths.Median");
        assert_eq!(concepts[7].concept, "neonatal_deaths_median");
    }

    #[test]
    fn test_no_value_columns() {
        assert!(extract_concepts_continuous(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_column_propagates() {
        assert!(extract_concepts_continuous(&columns(&["U5MR"])).is_err());
    }

    #[test]
    fn test_discrete_concepts_fixed() {
        let concepts = extract_concepts_discrete();
        let rows: Vec<(&str, &str, ConceptType)> = concepts
            .iter()
            .map(|c| (c.concept.as_str(), c.name.as_str(), c.concept_type))
            .collect();

        assert_eq!(
            rows,
            vec![
                ("iso_code", "ISO Code", ConceptType::String),
                ("country", "Country", ConceptType::EntityDomain),
                ("name", "Name", ConceptType::String),
                ("year", "Year", ConceptType::Time),
            ]
        );
    }
}
