//! `datapackage.json` generation for a DDF dataset directory.
//!
//! Every `ddf--*.csv` file becomes a resource whose fields are read from the
//! CSV header and whose primary key is inferred from the file name:
//!
//! ```text
//! ddf--concepts--continuous.csv                   → concept
//! ddf--entities--country.csv                      → country
//! ddf--datapoints--u5mr_lower--by--country--year  → [country, year]
//! ```
//!
//! A `ddfSchema` section groups resources by (primary key, value column).
//! When a manifest already exists, its descriptive metadata (title, author,
//! license, ...) is kept and only the generated sections are replaced.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PackageError, PackageResult};
use crate::logs::log_warning;

/// Manifest file name inside the dataset directory.
pub const DATAPACKAGE_FILE: &str = "datapackage.json";

/// A resource field (CSV column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
}

/// Primary key: a single column, or several for datapoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKey {
    Single(String),
    Composite(Vec<String>),
}

impl PrimaryKey {
    pub fn columns(&self) -> Vec<String> {
        match self {
            PrimaryKey::Single(c) => vec![c.clone()],
            PrimaryKey::Composite(cs) => cs.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSchema {
    pub fields: Vec<Field>,
    #[serde(rename = "primaryKey")]
    pub primary_key: PrimaryKey,
}

/// One CSV file of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub path: String,
    pub schema: ResourceSchema,
}

/// One `ddfSchema` entry: resources sharing a key and a value column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaEntry {
    #[serde(rename = "primaryKey")]
    pub primary_key: Vec<String>,
    pub value: Option<String>,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DdfSchema {
    pub concepts: Vec<SchemaEntry>,
    pub entities: Vec<SchemaEntry>,
    pub datapoints: Vec<SchemaEntry>,
    pub synonyms: Vec<SchemaEntry>,
}

/// DDF file kind, parsed from the file name.
#[derive(Debug, Clone, PartialEq)]
enum DdfKind {
    Concepts,
    Entities { key: String },
    Datapoints { keys: Vec<String> },
}

fn parse_file_name(file_name: &str) -> PackageResult<DdfKind> {
    let invalid = || PackageError::InvalidFileName(file_name.to_string());

    let stem = file_name.strip_suffix(".csv").ok_or_else(invalid)?;
    let parts: Vec<&str> = stem.split("--").collect();
    if parts.first() != Some(&"ddf") || parts.len() < 2 {
        return Err(invalid());
    }

    match parts[1] {
        "concepts" => Ok(DdfKind::Concepts),
        "entities" => {
            let key = parts.last().filter(|_| parts.len() > 2).ok_or_else(invalid)?;
            Ok(DdfKind::Entities { key: key.to_string() })
        }
        "datapoints" => {
            let by = parts.iter().position(|p| *p == "by").ok_or_else(invalid)?;
            let keys: Vec<String> = parts[by + 1..].iter().map(|s| s.to_string()).collect();
            if keys.is_empty() {
                return Err(invalid());
            }
            Ok(DdfKind::Datapoints { keys })
        }
        _ => Err(invalid()),
    }
}

fn read_header(path: &Path) -> PackageResult<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)?;
    Ok(reader.headers()?.iter().map(|h| h.to_string()).collect())
}

/// DDF CSV files in `dir`, sorted by name.
pub fn list_ddf_files(dir: &Path) -> PackageResult<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("ddf--") && n.ends_with(".csv"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Describe one DDF CSV file.
pub fn build_resource(path: &Path) -> PackageResult<(Resource, DdfKindTag)> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PackageError::InvalidFileName(path.display().to_string()))?;

    let kind = parse_file_name(file_name)?;
    let (primary_key, tag) = match kind {
        DdfKind::Concepts => (PrimaryKey::Single("concept".to_string()), DdfKindTag::Concepts),
        DdfKind::Entities { key } => (PrimaryKey::Single(key), DdfKindTag::Entities),
        DdfKind::Datapoints { keys } => (PrimaryKey::Composite(keys), DdfKindTag::Datapoints),
    };

    let fields = read_header(path)?
        .into_iter()
        .map(|name| Field { name })
        .collect();

    let name = file_name.trim_end_matches(".csv").to_string();
    let resource = Resource {
        name,
        path: file_name.to_string(),
        schema: ResourceSchema { fields, primary_key },
    };

    Ok((resource, tag))
}

/// Which `ddfSchema` section a resource belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdfKindTag {
    Concepts,
    Entities,
    Datapoints,
}

/// Group resources into `ddfSchema` entries, one per (key, value column).
pub fn build_ddf_schema(resources: &[(Resource, DdfKindTag)]) -> DdfSchema {
    type Groups = BTreeMap<(Vec<String>, Option<String>), Vec<String>>;
    let mut groups: [Groups; 3] = Default::default();

    for (resource, tag) in resources {
        let key = resource.schema.primary_key.columns();
        let values: Vec<Option<String>> = {
            let v: Vec<Option<String>> = resource
                .schema
                .fields
                .iter()
                .filter(|f| !key.contains(&f.name))
                .map(|f| Some(f.name.clone()))
                .collect();
            if v.is_empty() {
                vec![None]
            } else {
                v
            }
        };

        let slot = match tag {
            DdfKindTag::Concepts => 0,
            DdfKindTag::Entities => 1,
            DdfKindTag::Datapoints => 2,
        };
        for value in values {
            groups[slot]
                .entry((key.clone(), value))
                .or_default()
                .push(resource.name.clone());
        }
    }

    let [concepts, entities, datapoints] = groups.map(|g| {
        g.into_iter()
            .map(|((primary_key, value), resources)| SchemaEntry {
                primary_key,
                value,
                resources,
            })
            .collect::<Vec<SchemaEntry>>()
    });

    DdfSchema {
        concepts,
        entities,
        datapoints,
        synonyms: Vec::new(),
    }
}

/// Build the manifest for `dir`.
///
/// Files whose name is not a concepts, entities or datapoints name
/// (synonyms, for instance) are skipped with a warning.
///
/// `existing` is the current manifest, if any; its top-level fields other
/// than `resources`, `ddfSchema` and `created` are kept.
pub fn build_datapackage(dir: &Path, existing: Option<Value>) -> PackageResult<Value> {
    let mut resources = Vec::new();
    for path in list_ddf_files(dir)? {
        match build_resource(&path) {
            Ok(resource) => resources.push(resource),
            Err(PackageError::InvalidFileName(name)) => {
                log_warning(format!("Skipping {}: not a concepts, entities or datapoints file", name));
            }
            Err(e) => return Err(e),
        }
    }

    let schema = build_ddf_schema(&resources);

    let mut package = match existing {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    if !package.contains_key("name") {
        let name = dir
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .unwrap_or_else(|| "ddf--dataset".to_string());
        package.insert("name".to_string(), json!(name));
    }
    if !package.contains_key("language") {
        package.insert("language".to_string(), json!({ "id": "en" }));
    }
    package.insert("created".to_string(), json!(chrono::Utc::now().to_rfc3339()));

    let resources: Vec<Resource> = resources.into_iter().map(|(r, _)| r).collect();
    package.insert("resources".to_string(), serde_json::to_value(resources)?);
    package.insert("ddfSchema".to_string(), serde_json::to_value(schema)?);

    Ok(Value::Object(package))
}

/// Write the manifest as pretty JSON.
pub fn write_datapackage(dir: &Path, package: &Value) -> PackageResult<PathBuf> {
    let path = dir.join(DATAPACKAGE_FILE);
    let content = serde_json::to_string_pretty(package)?;
    fs::write(&path, content)?;
    Ok(path)
}

/// Rebuild `datapackage.json` in `dir`, keeping existing metadata.
pub fn regenerate_datapackage(dir: &Path) -> PackageResult<PathBuf> {
    let path = dir.join(DATAPACKAGE_FILE);
    let existing = if path.exists() {
        Some(serde_json::from_str::<Value>(&fs::read_to_string(&path)?)?)
    } else {
        None
    };

    let package = build_datapackage(dir, existing)?;
    write_datapackage(dir, &package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn sample_dataset(dir: &Path) {
        write(dir, "ddf--concepts--continuous.csv", "concept,name,concept_type\nu5mr_lower,U5MR.Lower,measure\n");
        write(dir, "ddf--concepts--discrete.csv", "concept,name,concept_type\nyear,Year,time\n");
        write(dir, "ddf--entities--country.csv", "country,iso_code,name\nafg,AFG,Afghanistan\n");
        write(dir, "ddf--datapoints--u5mr_lower--by--country--year.csv", "country,year,u5mr_lower\nafg,1990,170\n");
        write(dir, "ddf--datapoints--u5mr_upper--by--country--year.csv", "country,year,u5mr_upper\nafg,1990,190\n");
        write(dir, "README.md", "not a resource");
    }

    #[test]
    fn test_parse_file_name() {
        assert_eq!(parse_file_name("ddf--concepts--discrete.csv").unwrap(), DdfKind::Concepts);
        assert_eq!(
            parse_file_name("ddf--entities--country.csv").unwrap(),
            DdfKind::Entities { key: "country".into() }
        );
        assert_eq!(
            parse_file_name("ddf--datapoints--imr_median--by--country--year.csv").unwrap(),
            DdfKind::Datapoints { keys: vec!["country".into(), "year".into()] }
        );
        assert!(parse_file_name("ddf--datapoints--imr_median.csv").is_err());
        assert!(parse_file_name("ddf--entities.csv").is_err());
        assert!(parse_file_name("data.csv").is_err());
        assert!(parse_file_name("ddf--synonyms--country.csv").is_err());
    }

    #[test]
    fn test_unknown_ddf_kind_skipped() {
        let dir = tempdir().unwrap();
        sample_dataset(dir.path());
        write(dir.path(), "ddf--synonyms--country.csv", "synonym,country\nAfghanistan,afg\n");

        let package = build_datapackage(dir.path(), None).unwrap();
        let resources = package["resources"].as_array().unwrap();

        assert_eq!(resources.len(), 5);
        assert!(resources.iter().all(|r| r["path"] != "ddf--synonyms--country.csv"));
    }

    #[test]
    fn test_build_datapackage_resources() {
        let dir = tempdir().unwrap();
        sample_dataset(dir.path());

        let package = build_datapackage(dir.path(), None).unwrap();
        let resources = package["resources"].as_array().unwrap();

        assert_eq!(resources.len(), 5);
        assert_eq!(resources[0]["path"], "ddf--concepts--continuous.csv");
        assert_eq!(resources[0]["schema"]["primaryKey"], "concept");
        assert_eq!(resources[2]["schema"]["primaryKey"], json!(["country", "year"]));
        assert_eq!(resources[4]["schema"]["primaryKey"], "country");
        assert_eq!(
            resources[4]["schema"]["fields"],
            json!([{ "name": "country" }, { "name": "iso_code" }, { "name": "name" }])
        );
        assert_eq!(package["language"]["id"], "en");
        assert!(package["created"].is_string());
    }

    #[test]
    fn test_ddf_schema_groups_by_value() {
        let dir = tempdir().unwrap();
        sample_dataset(dir.path());

        let package = build_datapackage(dir.path(), None).unwrap();
        let schema: DdfSchema = serde_json::from_value(package["ddfSchema"].clone()).unwrap();

        // name + concept_type, each across both concept files
        assert_eq!(schema.concepts.len(), 2);
        assert_eq!(schema.concepts[0].resources.len(), 2);
        assert_eq!(schema.entities.len(), 2);
        assert_eq!(schema.datapoints.len(), 2);
        assert_eq!(schema.datapoints[0].value.as_deref(), Some("u5mr_lower"));
        assert_eq!(
            schema.datapoints[0].resources,
            vec!["ddf--datapoints--u5mr_lower--by--country--year"]
        );
        assert!(schema.synonyms.is_empty());
    }

    #[test]
    fn test_regenerate_keeps_metadata() {
        let dir = tempdir().unwrap();
        sample_dataset(dir.path());
        write(
            dir.path(),
            DATAPACKAGE_FILE,
            r#"{"name": "ddf--unigme--child_mortality", "title": "Child mortality", "resources": []}"#,
        );

        let path = regenerate_datapackage(dir.path()).unwrap();
        let package: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(package["name"], "ddf--unigme--child_mortality");
        assert_eq!(package["title"], "Child mortality");
        assert_eq!(package["resources"].as_array().unwrap().len(), 5);
    }
}
