//! DDF CSV writers.
//!
//! File names follow the DDF convention:
//!
//! - `ddf--concepts--continuous.csv`, `ddf--concepts--discrete.csv`
//! - `ddf--entities--country.csv`
//! - `ddf--datapoints--<concept>--by--country--year.csv`
//!
//! Files are overwritten on every run.

pub mod datapackage;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::OutputResult;
use crate::models::{Concept, Entity, MetricSeries};
use crate::transform::ids::format_float_sigfig;

pub use datapackage::{build_datapackage, regenerate_datapackage, write_datapackage, DATAPACKAGE_FILE};

pub const CONCEPTS_CONTINUOUS_FILE: &str = "ddf--concepts--continuous.csv";
pub const CONCEPTS_DISCRETE_FILE: &str = "ddf--concepts--discrete.csv";
pub const ENTITIES_COUNTRY_FILE: &str = "ddf--entities--country.csv";

/// `ddf--datapoints--<concept>--by--country--year.csv`
pub fn datapoints_file_name(concept: &str) -> String {
    format!("ddf--datapoints--{}--by--country--year.csv", concept)
}

fn writer(path: &Path) -> OutputResult<csv::Writer<fs::File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(csv::WriterBuilder::new().has_headers(false).from_path(path)?)
}

/// Write a concept table (`concept,name,concept_type`).
pub fn write_concepts(path: &Path, concepts: &[Concept]) -> OutputResult<()> {
    let mut wtr = writer(path)?;
    wtr.write_record(["concept", "name", "concept_type"])?;
    for concept in concepts {
        wtr.serialize(concept)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the country entity table (`country,iso_code,name`).
pub fn write_entities(path: &Path, entities: &[Entity]) -> OutputResult<()> {
    let mut wtr = writer(path)?;
    wtr.write_record(["country", "iso_code", "name"])?;
    for entity in entities {
        wtr.serialize(entity)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write one series (`country,year,<concept>`), values rounded to `sigfig`.
pub fn write_datapoints(path: &Path, series: &MetricSeries, sigfig: usize) -> OutputResult<()> {
    let mut wtr = writer(path)?;
    wtr.write_record(["country", "year", series.concept.as_str()])?;
    for dp in &series.datapoints {
        wtr.write_record([
            dp.country.as_str(),
            dp.year.to_string().as_str(),
            format_float_sigfig(dp.value, sigfig).as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write every series into `dir`, returning the paths in series order.
pub fn write_all_datapoints(dir: &Path, series: &[MetricSeries], sigfig: usize) -> OutputResult<Vec<PathBuf>> {
    series
        .iter()
        .map(|s| {
            let path = dir.join(datapoints_file_name(&s.concept));
            write_datapoints(&path, s, sigfig)?;
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bound, ConceptType, Datapoint};
    use tempfile::tempdir;

    #[test]
    fn test_datapoints_file_name() {
        assert_eq!(
            datapoints_file_name("u5mr_lower"),
            "ddf--datapoints--u5mr_lower--by--country--year.csv"
        );
    }

    #[test]
    fn test_write_concepts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONCEPTS_DISCRETE_FILE);
        let concepts = vec![
            Concept::new("country", "Country", ConceptType::EntityDomain),
            Concept::new("year", "Year", ConceptType::Time),
        ];

        write_concepts(&path, &concepts).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "concept,name,concept_type\ncountry,Country,entity_domain\nyear,Year,time\n"
        );
    }

    #[test]
    fn test_write_empty_concepts_keeps_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONCEPTS_CONTINUOUS_FILE);
        write_concepts(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "concept,name,concept_type\n");
    }

    #[test]
    fn test_write_entities_quotes_commas() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(ENTITIES_COUNTRY_FILE);
        let entities = vec![Entity {
            country: "cod".into(),
            iso_code: "COD".into(),
            name: "Congo, Democratic Republic of the".into(),
        }];

        write_entities(&path, &entities).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "country,iso_code,name\ncod,COD,\"Congo, Democratic Republic of the\"\n"
        );
    }

    #[test]
    fn test_write_datapoints_rounds_values() {
        let dir = tempdir().unwrap();
        let series = MetricSeries {
            concept: "u5mr_median".into(),
            metric: "U5MR".into(),
            bound: Bound::Median,
            datapoints: vec![
                Datapoint { country: "a".into(), year: 1990, value: 5.0 },
                Datapoint { country: "a".into(), year: 1991, value: 123.456789 },
            ],
        };

        let paths = write_all_datapoints(dir.path(), &[series], 5).unwrap();
        assert_eq!(paths.len(), 1);

        let content = fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(content, "country,year,u5mr_median\na,1990,5\na,1991,123.46\n");
    }
}
