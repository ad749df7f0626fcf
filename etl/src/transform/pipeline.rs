//! High-level pipeline API: workbook in, DDF dataset out.
//!
//! Steps:
//! 1. Read the configured sheets (header/footer skipped, empty columns dropped)
//! 2. Concatenate them into one wide table
//! 3. Validate the wide table invariants
//! 4. Write concept, entity and datapoint CSV files
//! 5. Regenerate `datapackage.json`
//!
//! A failure at any step aborts the run. Files written by earlier steps
//! stay on disk.
//!
//! # Example
//!
//! ```rust,no_run
//! use igme_ddf::{run, EtlOptions};
//!
//! let summary = run(&EtlOptions::default()).unwrap();
//! println!("Wrote {} files", summary.files.len());
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult, ValidationError};
use crate::logs::{log_error, log_info, log_info_indent, log_success, log_success_indent, log_warning};
use crate::models::{MetricSeries, WideTable};
use crate::output::{
    regenerate_datapackage, write_all_datapoints, write_concepts, write_entities, CONCEPTS_CONTINUOUS_FILE,
    CONCEPTS_DISCRETE_FILE, ENTITIES_COUNTRY_FILE,
};
use crate::parser::{read_workbook, sheet_names, RawSheet, SheetLayout};
use crate::transform::concepts::{extract_concepts_continuous, extract_concepts_discrete};
use crate::transform::entities::extract_entities_country;
use crate::transform::ids::DEFAULT_SIGFIG;
use crate::transform::reshape::{distinct_metrics, reshape};
use crate::validation::validate_wide_table;

/// Default source workbook, relative to the working directory.
pub const DEFAULT_SOURCE: &str = "../source/UNIGME Rates & Deaths_Under5.xlsx";

/// Default dataset directory, relative to the working directory.
pub const DEFAULT_OUT_DIR: &str = "../../";

/// Sheets read from the IGME workbook, in order.
pub const DEFAULT_SHEETS: [&str; 4] = [
    "Rates and Deaths U5MR",
    "Rates and Deaths IMR",
    "Rates and Deaths NMR",
    "Rates and Deaths CMR",
];

/// Options for a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtlOptions {
    /// Workbook to read
    pub source: PathBuf,

    /// Sheets to read, in order
    pub sheets: Vec<String>,

    /// Rows before the header row
    pub skip_rows: usize,

    /// Rows after the last data row
    pub skip_footer: usize,

    /// Dataset directory receiving the CSV files and manifest
    pub out_dir: PathBuf,

    /// Significant figures for datapoint values
    pub sigfig: usize,
}

impl Default for EtlOptions {
    fn default() -> Self {
        let layout = SheetLayout::default();
        Self {
            source: PathBuf::from(DEFAULT_SOURCE),
            sheets: DEFAULT_SHEETS.iter().map(|s| s.to_string()).collect(),
            skip_rows: layout.skip_rows,
            skip_footer: layout.skip_footer,
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            sigfig: DEFAULT_SIGFIG,
        }
    }
}

impl EtlOptions {
    pub fn layout(&self) -> SheetLayout {
        SheetLayout {
            skip_rows: self.skip_rows,
            skip_footer: self.skip_footer,
        }
    }
}

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Every file written, manifest last
    pub files: Vec<PathBuf>,

    /// Metric names in source order
    pub metrics: Vec<String>,

    pub continuous_concepts: usize,

    pub discrete_concepts: usize,

    pub entities: usize,

    /// Total long rows across all series
    pub datapoints: usize,
}

/// Per-sheet information for `inspect`
#[derive(Debug, Clone, Serialize)]
pub struct SheetInfo {
    pub name: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub metrics: Vec<String>,
}

/// Source information for `inspect`
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub source: PathBuf,
    /// Every sheet in the workbook, read or not
    pub available_sheets: Vec<String>,
    pub sheets: Vec<SheetInfo>,
    pub rows: usize,
    pub metrics: Vec<String>,
    pub countries: usize,
}

/// Read all configured sheets and concatenate them.
pub fn load_wide_table(options: &EtlOptions) -> PipelineResult<WideTable> {
    Ok(concat_sheets(load_sheets(options)?))
}

fn load_sheets(options: &EtlOptions) -> PipelineResult<Vec<(String, WideTable)>> {
    log_info(format!("📖 Reading source: {}", options.source.display()));
    let raw_sheets: Vec<RawSheet> = read_workbook(&options.source, &options.sheets, options.layout())?;

    let mut sheets = Vec::with_capacity(raw_sheets.len());
    for raw in raw_sheets {
        let name = raw.name.clone();
        let table = raw.into_table()?;
        log_success_indent(
            format!("{}: {} rows, {} value columns", name, table.rows.len(), table.value_columns.len()),
            1,
        );
        sheets.push((name, table));
    }

    Ok(sheets)
}

fn concat_sheets(sheets: Vec<(String, WideTable)>) -> WideTable {
    let table = WideTable::concat(sheets.into_iter().map(|(_, t)| t).collect());
    log_success(format!("Read {} rows, {} value columns", table.rows.len(), table.value_columns.len()));
    table
}

/// Summarize the source without writing anything.
pub fn inspect(options: &EtlOptions) -> PipelineResult<SourceInfo> {
    let available_sheets = sheet_names(&options.source)?;
    let sheets = load_sheets(options)?;

    let infos = sheets
        .iter()
        .map(|(name, t)| -> PipelineResult<SheetInfo> {
            Ok(SheetInfo {
                name: name.clone(),
                rows: t.rows.len(),
                metrics: distinct_metrics(&t.value_columns)?,
                columns: t.value_columns.clone(),
            })
        })
        .collect::<PipelineResult<Vec<_>>>()?;

    let table = concat_sheets(sheets);

    Ok(SourceInfo {
        source: options.source.clone(),
        available_sheets,
        sheets: infos,
        rows: table.rows.len(),
        metrics: distinct_metrics(&table.value_columns)?,
        countries: extract_entities_country(&table).len(),
    })
}

/// Check the source against the wide table invariants.
pub fn validate_source(options: &EtlOptions) -> PipelineResult<WideTable> {
    let table = load_wide_table(options)?;
    check_table(&table)?;
    Ok(table)
}

fn check_table(table: &WideTable) -> PipelineResult<()> {
    log_info("✔️  Validating wide table...");
    if let Err(errors) = validate_wide_table(table) {
        for err in errors.iter().take(10) {
            log_error(err.as_str());
        }
        if errors.len() > 10 {
            log_warning(format!("... and {} more", errors.len() - 10));
        }
        return Err(ValidationError::Invariants { errors }.into());
    }
    log_success("Table is valid");
    Ok(())
}

/// Run the full pipeline: read, reshape, write CSVs and manifest.
pub fn run(options: &EtlOptions) -> PipelineResult<RunSummary> {
    let table = load_wide_table(options)?;
    run_table(&table, options)
}

/// Run everything after reading: useful when the table comes from elsewhere.
pub fn run_table(table: &WideTable, options: &EtlOptions) -> PipelineResult<RunSummary> {
    if table.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    check_table(table)?;

    let out_dir = options.out_dir.as_path();
    let mut files = Vec::new();

    log_info("📋 Extracting concepts...");
    let continuous = extract_concepts_continuous(&table.value_columns)?;
    files.push(write_to(out_dir, CONCEPTS_CONTINUOUS_FILE, |p| write_concepts(p, &continuous))?);
    let discrete = extract_concepts_discrete();
    files.push(write_to(out_dir, CONCEPTS_DISCRETE_FILE, |p| write_concepts(p, &discrete))?);
    log_success(format!("{} continuous, {} discrete concepts", continuous.len(), discrete.len()));

    log_info("🌍 Extracting entities...");
    let entities = extract_entities_country(table);
    files.push(write_to(out_dir, ENTITIES_COUNTRY_FILE, |p| write_entities(p, &entities))?);
    log_success(format!("{} countries", entities.len()));

    log_info("⚙️  Extracting datapoints...");
    let metrics = distinct_metrics(&table.value_columns)?;
    log_info(format!("Metrics in the source: {}", metrics.join(", ")));
    let series = reshape(table)?;
    log_series(&series);
    let datapoints: usize = series.iter().map(MetricSeries::len).sum();
    files.extend(write_all_datapoints(out_dir, &series, options.sigfig)?);
    log_success(format!("{} datapoint files, {} rows", series.len(), datapoints));

    log_info("📦 Generating datapackage.json...");
    let manifest = regenerate_datapackage(out_dir)?;
    log_success(format!("Saved to: {}", manifest.display()));
    files.push(manifest);

    Ok(RunSummary {
        files,
        metrics,
        continuous_concepts: continuous.len(),
        discrete_concepts: discrete.len(),
        entities: entities.len(),
        datapoints,
    })
}

fn write_to<F>(dir: &Path, file_name: &str, write: F) -> PipelineResult<PathBuf>
where
    F: FnOnce(&Path) -> crate::error::OutputResult<()>,
{
    let path = dir.join(file_name);
    write(&path)?;
    log_info_indent(format!("→ {}", file_name), 1);
    Ok(path)
}

fn log_series(series: &[MetricSeries]) {
    for s in series {
        if s.is_empty() {
            log_warning(format!("{}: no values", s.concept));
        } else {
            log_info_indent(format!("{}: {} rows", s.concept, s.len()), 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WideRow;
    use rust_xlsxwriter::Workbook;
    use std::fs;
    use tempfile::tempdir;

    fn row(iso: &str, name: &str, bound: &str, values: Vec<Option<f64>>) -> WideRow {
        WideRow {
            iso_code: iso.into(),
            country: name.into(),
            bound_label: bound.into(),
            values,
        }
    }

    fn options(out_dir: &Path) -> EtlOptions {
        EtlOptions {
            out_dir: out_dir.to_path_buf(),
            ..EtlOptions::default()
        }
    }

    /// A workbook shaped like the IGME download: 10 preamble rows, header,
    /// data, one footer row.
    fn write_igme_workbook(path: &Path) {
        let mut workbook = Workbook::new();
        let sheets: [(&str, &str, [f64; 3]); 2] = [
            ("Rates and Deaths U5MR", "U5MR", [5.0, 5.0, 5.0]),
            ("Rates and Deaths IMR", "IMR", [40.123456, 45.5, 51.0]),
        ];

        for (sheet_name, metric, values) in sheets {
            let sheet = workbook.add_worksheet();
            sheet.set_name(sheet_name).unwrap();
            sheet.write_string(0, 0, "Child mortality estimates").unwrap();
            sheet.write_string(9, 0, "Estimates generated by UN IGME").unwrap();

            let y1990 = format!("{}.1990", metric);
            let y1991 = format!("{}.1991", metric);
            let headers = ["ISO Code", "Country", "Uncertainty bounds*", y1990.as_str(), y1991.as_str()];
            for (c, h) in headers.iter().enumerate() {
                sheet.write_string(10, c as u16, *h).unwrap();
            }

            for (i, bound) in ["Lower", "Median", "Upper"].iter().enumerate() {
                let r = 11 + i as u32;
                sheet.write_string(r, 0, "A").unwrap();
                sheet.write_string(r, 1, "Country A").unwrap();
                sheet.write_string(r, 2, *bound).unwrap();
                sheet.write_number(r, 3, values[i]).unwrap();
                if *bound != "Lower" {
                    sheet.write_number(r, 4, values[i] + 1.0).unwrap();
                }
            }
            sheet.write_string(14, 0, "* 90% uncertainty interval").unwrap();
        }

        workbook.save(path).unwrap();
    }

    #[test]
    fn test_default_options() {
        let opts = EtlOptions::default();
        assert_eq!(opts.sheets.len(), 4);
        assert_eq!(opts.skip_rows, 10);
        assert_eq!(opts.skip_footer, 1);
        assert_eq!(opts.sigfig, 5);
        assert_eq!(opts.out_dir, PathBuf::from("../../"));
    }

    #[test]
    fn test_run_table_writes_dataset() {
        let dir = tempdir().unwrap();
        let mut table = WideTable::new(vec!["U5MR.1990".into()]);
        for bound in ["Lower", "Median", "Upper"] {
            table.push_row(row("A", "Country A", bound, vec![Some(5.0)]));
        }

        let summary = run_table(&table, &options(dir.path())).unwrap();

        assert_eq!(summary.metrics, vec!["U5MR"]);
        assert_eq!(summary.continuous_concepts, 3);
        assert_eq!(summary.discrete_concepts, 4);
        assert_eq!(summary.entities, 1);
        assert_eq!(summary.datapoints, 3);
        // 3 metadata files + 3 series + manifest
        assert_eq!(summary.files.len(), 7);

        for bound in ["lower", "median", "upper"] {
            let path = dir.path().join(format!("ddf--datapoints--u5mr_{}--by--country--year.csv", bound));
            let content = fs::read_to_string(path).unwrap();
            assert_eq!(content, format!("country,year,u5mr_{}\na,1990,5\n", bound));
        }

        let entities = fs::read_to_string(dir.path().join(ENTITIES_COUNTRY_FILE)).unwrap();
        assert_eq!(entities, "country,iso_code,name\na,A,Country A\n");
        assert!(dir.path().join("datapackage.json").exists());
    }

    #[test]
    fn test_run_table_rejects_missing_bound() {
        let dir = tempdir().unwrap();
        let mut table = WideTable::new(vec!["U5MR.1990".into()]);
        table.push_row(row("A", "Country A", "Median", vec![Some(5.0)]));

        let err = run_table(&table, &options(dir.path())).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
        assert!(!dir.path().join(CONCEPTS_CONTINUOUS_FILE).exists());
    }

    #[test]
    fn test_run_table_empty() {
        let dir = tempdir().unwrap();
        let err = run_table(&WideTable::default(), &options(dir.path())).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput));
    }

    #[test]
    fn test_run_from_workbook() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("igme.xlsx");
        write_igme_workbook(&source);
        let out_dir = dir.path().join("dataset");

        let opts = EtlOptions {
            source,
            sheets: vec!["Rates and Deaths U5MR".into(), "Rates and Deaths IMR".into()],
            ..options(&out_dir)
        };

        let summary = run(&opts).unwrap();
        assert_eq!(summary.metrics, vec!["U5MR", "IMR"]);
        assert_eq!(summary.continuous_concepts, 6);
        // rows from both sheets, same country
        assert_eq!(summary.entities, 1);

        let imr_lower = fs::read_to_string(out_dir.join("ddf--datapoints--imr_lower--by--country--year.csv")).unwrap();
        assert_eq!(imr_lower, "country,year,imr_lower\na,1990,40.123\n");

        let imr_median = fs::read_to_string(out_dir.join("ddf--datapoints--imr_median--by--country--year.csv")).unwrap();
        assert_eq!(imr_median, "country,year,imr_median\na,1990,45.5\na,1991,46.5\n");

        let continuous = fs::read_to_string(out_dir.join(CONCEPTS_CONTINUOUS_FILE)).unwrap();
        assert!(continuous.starts_with("concept,name,concept_type\nu5mr_lower,U5MR.Lower,measure\n"));

        let package: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out_dir.join("datapackage.json")).unwrap()).unwrap();
        // 2 concept files + 1 entity file + 6 datapoint files
        assert_eq!(package["resources"].as_array().unwrap().len(), 9);
    }

    #[test]
    fn test_load_wide_table_concatenates_sheets() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("igme.xlsx");
        write_igme_workbook(&source);

        let opts = EtlOptions {
            source,
            sheets: vec!["Rates and Deaths IMR".into(), "Rates and Deaths U5MR".into()],
            ..EtlOptions::default()
        };

        let table = load_wide_table(&opts).unwrap();
        assert_eq!(table.value_columns, vec!["IMR.1990", "IMR.1991", "U5MR.1990", "U5MR.1991"]);
        assert_eq!(table.rows.len(), 6);
        assert_eq!(table.rows[1].values, vec![Some(45.5), Some(46.5), None, None]);
        assert_eq!(table.rows[3].values, vec![None, None, Some(5.0), None]);
    }

    #[test]
    fn test_inspect_workbook() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("igme.xlsx");
        write_igme_workbook(&source);

        let opts = EtlOptions {
            source,
            sheets: vec!["Rates and Deaths IMR".into()],
            ..EtlOptions::default()
        };

        let info = inspect(&opts).unwrap();
        assert_eq!(info.rows, 3);
        assert_eq!(info.metrics, vec!["IMR"]);
        assert_eq!(info.countries, 1);
        assert_eq!(info.sheets[0].columns, vec!["IMR.1990", "IMR.1991"]);
        assert_eq!(info.available_sheets, vec!["Rates and Deaths U5MR", "Rates and Deaths IMR"]);
    }
}
