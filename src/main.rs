// src/main.rs

/*
ARCHITECTURE OVERVIEW

This binary turns the coordinate descriptions of fishing restriction zones
into a GeoJSON FeatureCollection.

High-level flow:
1. Parse CLI arguments (input/output paths, input format, pipeline knobs).
2. Load the input as a catalog:
   - text    → one document, zones split on dash labels
   - table   → CSV rows `region,document,zone,coordinates` (headers validated)
   - catalog → JSON with `regions` and `documents`
3. Optionally keep only spawning-season documents.
4. Run the pipeline (DMS parsing, distance segmentation, classification,
   polygon repair) over every document.
5. Write the GeoJSON, log every diagnostic, optionally write them as CSV.

Key design choices:
- Diagnostics never abort a run; `--strict` only turns them into a failing
  exit status once all output has been written.
- Malformed table rows are skipped and counted in permissive mode, fatal in
  strict mode.

The main module focuses on orchestration and I/O only.
*/

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use clap::ValueEnum;
use csv::{ReaderBuilder, Writer};
use thiserror::Error;

use fishban_geo::catalog::{Catalog, TableRecord};
use fishban_geo::config::{
    DEFAULT_FUZZ_STEP, DEFAULT_MAX_EDGE_KM, ParserConfig, PatternError, PipelineConfig, SanitizeConfig,
    SegmentConfig,
};
use fishban_geo::diagnostic::Diagnostic;
use fishban_geo::pipeline::{Pipeline, PipelineOutput};

mod logging;

/* ---------------- CONSTANTES ---------------- */

// Required CSV headers (order-independent).
const REQUIRED_HEADERS: &[&str] = &["region", "document", "zone", "coordinates"];

/* ---------------- CLI ---------------- */

// Command-line interface definition.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Input file path (text, CSV table or JSON catalog)
    #[arg(short, long)]
    input: PathBuf,

    /// Output GeoJSON file path
    #[arg(short, long)]
    output: PathBuf,

    /// Input format
    #[arg(short = 'f', long, value_enum)]
    input_format: InputFormat,

    /// Write diagnostics as CSV to this path
    #[arg(short, long)]
    diagnostics: Option<PathBuf>,

    /// Split coordinate lists at edges longer than this (km)
    #[arg(long, default_value_t = DEFAULT_MAX_EDGE_KM)]
    max_edge_km: f64,

    /// Base offset applied to duplicate polygon vertices (degrees)
    #[arg(long, default_value_t = DEFAULT_FUZZ_STEP)]
    fuzz_step: f64,

    /// Emit polygons as classified, without self-intersection repair
    #[arg(long)]
    no_repair: bool,

    /// Keep only spawning-season restriction documents
    #[arg(long)]
    spawning_only: bool,

    /// Custom DMS literal regex (named groups: deg, min, sec, mark)
    #[arg(long)]
    pattern: Option<String>,

    /// Region name for text input
    #[arg(long, default_value = "Без региона")]
    region: String,

    /// Document title for text input (defaults to the file name)
    #[arg(long)]
    document: Option<String>,

    /// Strict mode: fail on malformed rows and on warning diagnostics
    #[arg(long)]
    strict: bool,
}

// Supported input formats.
#[derive(Copy, Clone, Debug, ValueEnum)]
enum InputFormat {
    Text,
    Table,
    Catalog,
}

/* ---------------- MAIN ERROR ---------------- */

// Application-level errors.
#[derive(Error, Debug)]
enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid header (missing or unreadable)")]
    InvalidHeader,

    #[error("Missing header field '{0}'")]
    MissingHeaderField(String),

    #[error("Line {line}: invalid table row ({source})")]
    InvalidRow { line: usize, source: csv::Error },

    #[error("Invalid coordinate pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("Option --{name} must be a positive finite number, got {value}")]
    InvalidOption { name: &'static str, value: f64 },

    #[error("{count} warning diagnostic(s) in strict mode")]
    StrictFailure { count: usize },
}

/* ---------------- MAIN ---------------- */

fn main() -> Result<(), AppError> {
    logging::init();

    // Parse CLI arguments.
    let cli = Cli::parse();
    let config = pipeline_config(&cli)?;

    // Load and filter the catalog.
    let mut catalog = load_catalog(&cli)?;
    if cli.spawning_only {
        catalog = catalog.spawning_only();
    }
    tracing::info!(
        regions = catalog.regions.len(),
        documents = catalog.documents.len(),
        "catalog loaded"
    );

    let output = Pipeline::new(config).run_catalog(&catalog);

    write_geojson(&cli.output, &output)?;
    for diagnostic in &output.diagnostics {
        diagnostic.log();
    }
    if let Some(path) = &cli.diagnostics {
        write_diagnostics(File::create(path)?, &output.diagnostics)?;
    }

    let warnings = output.warning_count();
    if cli.strict && warnings > 0 {
        return Err(AppError::StrictFailure { count: warnings });
    }

    Ok(())
}

// Map CLI knobs onto the pipeline configuration.
fn pipeline_config(cli: &Cli) -> Result<PipelineConfig, AppError> {
    let parser = match &cli.pattern {
        Some(pattern) => ParserConfig::with_pattern(pattern)?,
        None => ParserConfig::default(),
    };

    Ok(PipelineConfig {
        parser,
        segment: SegmentConfig {
            max_edge_km: positive("max-edge-km", cli.max_edge_km)?,
        },
        sanitize: SanitizeConfig {
            fuzz_step: positive("fuzz-step", cli.fuzz_step)?,
            repair: !cli.no_repair,
            ..SanitizeConfig::default()
        },
    })
}

fn positive(name: &'static str, value: f64) -> Result<f64, AppError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(AppError::InvalidOption { name, value })
    }
}

// Dispatch based on input format.
fn load_catalog(cli: &Cli) -> Result<Catalog, AppError> {
    match cli.input_format {
        InputFormat::Text => {
            let text = std::fs::read_to_string(&cli.input)?;
            let document = cli
                .document
                .clone()
                .unwrap_or_else(|| file_title(&cli.input));
            Ok(Catalog::from_text(&cli.region, &document, &text))
        }
        InputFormat::Table => {
            let records = read_table(File::open(&cli.input)?, cli.strict)?;
            Ok(Catalog::from_table_records(records))
        }
        InputFormat::Catalog => {
            let reader = BufReader::new(File::open(&cli.input)?);
            Ok(serde_json::from_reader(reader)?)
        }
    }
}

fn file_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// Read table records, validating headers first.
// Malformed rows are skipped in permissive mode, fatal in strict mode.
fn read_table<R: io::Read>(input: R, strict: bool) -> Result<Vec<TableRecord>, AppError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(input);

    // Validate required headers.
    let headers = reader.headers().map_err(|_| AppError::InvalidHeader)?;

    let headers: HashSet<_> = headers.iter().map(str::trim).collect();
    for &h in REQUIRED_HEADERS {
        if !headers.contains(h) {
            return Err(AppError::MissingHeaderField(h.to_string()));
        }
    }

    let mut records = Vec::new();
    let mut invalid: u64 = 0;
    let mut line_no = 1;

    for row in reader.deserialize::<TableRecord>() {
        line_no += 1;
        match row {
            Ok(record) => records.push(record),
            Err(e) => {
                if strict {
                    return Err(AppError::InvalidRow {
                        line: line_no,
                        source: e,
                    });
                }
                tracing::debug!(line = line_no, error = %e, "skipping table row");
                invalid += 1;
            }
        }
    }

    if invalid > 0 {
        tracing::warn!("{} ignored line(s)", invalid);
    }

    Ok(records)
}

fn write_geojson(path: &Path, output: &PipelineOutput) -> Result<(), AppError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &output.collection.to_geojson()?)?;
    writer.flush()?;

    tracing::info!(
        features = output.collection.len(),
        path = %path.display(),
        "GeoJSON written"
    );
    Ok(())
}

// Serialize diagnostics as CSV rows.
fn write_diagnostics<W: io::Write>(out: W, diagnostics: &[Diagnostic]) -> Result<(), AppError> {
    let mut writer = Writer::from_writer(out);
    for diagnostic in diagnostics {
        writer.serialize(diagnostic)?;
    }
    writer.flush()?;
    Ok(())
}

/* ---------------- TEST ---------------- */
