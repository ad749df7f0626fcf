//! igme-ddf CLI - Convert the UN IGME workbook to a DDF dataset
//!
//! # Main Commands
//!
//! ```bash
//! igme-ddf run                      # Full pipeline: workbook → DDF CSVs + datapackage.json
//! igme-ddf datapackage              # Regenerate datapackage.json only
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! igme-ddf inspect                  # Show sheets, columns and metrics as JSON
//! igme-ddf validate                 # Check the wide table, exit 1 on violation
//! ```

use clap::{Args, Parser, Subcommand};
use igme_ddf::logs::LOGGER;
use igme_ddf::parser::SheetLayout;
use igme_ddf::transform::ids::DEFAULT_SIGFIG;
use igme_ddf::transform::pipeline::{DEFAULT_OUT_DIR, DEFAULT_SHEETS, DEFAULT_SOURCE};
use igme_ddf::{inspect, regenerate_datapackage, run, validate_source, EtlOptions};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "igme-ddf")]
#[command(about = "Convert UN IGME child mortality estimates to DDF", long_about = None)]
struct Cli {
    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: read workbook, write DDF files and datapackage.json
    Run {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print sheet columns, metrics and row counts as JSON
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Check wide table invariants (exit 1 on violation)
    Validate {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Regenerate datapackage.json from the CSV files in a directory
    Datapackage {
        /// Dataset directory
        #[arg(long, env = "IGME_OUT_DIR", default_value = DEFAULT_OUT_DIR)]
        out_dir: PathBuf,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Source workbook (.xlsx/.xls/.ods)
    #[arg(long, env = "IGME_SOURCE", default_value = DEFAULT_SOURCE)]
    source: PathBuf,

    /// Sheet to read (repeatable, default: the four IGME sheets)
    #[arg(long = "sheet")]
    sheets: Vec<String>,

    /// Rows before the header row
    #[arg(long, default_value_t = SheetLayout::default().skip_rows)]
    skip_rows: usize,

    /// Rows after the last data row
    #[arg(long, default_value_t = SheetLayout::default().skip_footer)]
    skip_footer: usize,
}

#[derive(Args)]
struct OutputArgs {
    /// Dataset directory
    #[arg(long, env = "IGME_OUT_DIR", default_value = DEFAULT_OUT_DIR)]
    out_dir: PathBuf,

    /// Significant figures for datapoint values
    #[arg(long, default_value_t = DEFAULT_SIGFIG)]
    sigfig: usize,
}

impl SourceArgs {
    fn into_options(self) -> EtlOptions {
        let sheets = if self.sheets.is_empty() {
            DEFAULT_SHEETS.iter().map(|s| s.to_string()).collect()
        } else {
            self.sheets
        };
        EtlOptions {
            source: self.source,
            sheets,
            skip_rows: self.skip_rows,
            skip_footer: self.skip_footer,
            ..EtlOptions::default()
        }
    }
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    LOGGER.set_quiet(cli.quiet);

    let result = match cli.command {
        Commands::Run { source, output } => {
            let options = EtlOptions {
                out_dir: output.out_dir,
                sigfig: output.sigfig,
                ..source.into_options()
            };
            cmd_run(&options)
        }

        Commands::Inspect { source } => cmd_inspect(&source.into_options()),

        Commands::Validate { source } => cmd_validate(&source.into_options()),

        Commands::Datapackage { out_dir } => cmd_datapackage(&out_dir),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_run(options: &EtlOptions) -> Result<(), Box<dyn std::error::Error>> {
    let summary = run(options)?;

    if !LOGGER.is_quiet() {
        eprintln!(
            "\n✨ Done! {} files, {} metrics, {} countries, {} datapoints",
            summary.files.len(),
            summary.metrics.len(),
            summary.entities,
            summary.datapoints
        );
    }
    Ok(())
}

fn cmd_inspect(options: &EtlOptions) -> Result<(), Box<dyn std::error::Error>> {
    let info = inspect(options)?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn cmd_validate(options: &EtlOptions) -> Result<(), Box<dyn std::error::Error>> {
    let table = validate_source(options)?;

    if !LOGGER.is_quiet() {
        eprintln!(
            "\n📊 Results: {} rows, {} value columns",
            table.rows.len(),
            table.value_columns.len()
        );
    }
    Ok(())
}

fn cmd_datapackage(out_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let path = regenerate_datapackage(out_dir)?;

    if !LOGGER.is_quiet() {
        eprintln!("📦 Saved to: {}", path.display());
    }
    Ok(())
}
