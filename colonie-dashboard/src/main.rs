mod reports;
mod util;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use colonie_core::{
    JsonFileSource, MemorySource, Record, ReportEngine, ReportId, SeedConfig, Snapshot,
    StoreError, StoreSource, generate_dataset,
};
use util::split_csv;

#[derive(Debug, Parser)]
#[command(name = "colonie-dashboard", version)]
#[command(about = "Robot ethics dashboard - evaluate the report catalog over a decision record")]
struct Args {
    /// JSON dataset file, re-read for every evaluation
    #[arg(long, env = "COLONIE_DATA")]
    data: Option<PathBuf>,

    /// Seed of the generated sample dataset used when no data file is given
    #[arg(long, default_value_t = 1337)]
    seed: u64,

    /// Write the generated sample dataset as JSON and exit
    #[arg(long)]
    dump_dataset: Option<PathBuf>,

    /// Reports to evaluate (comma-separated ids, or "all")
    #[arg(long, default_value = "all")]
    reports: String,

    /// List all available reports and exit
    #[arg(long)]
    list_reports: bool,

    /// Output format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    format: String,

    /// Optional path to write the output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Where snapshots come from for this run.
#[derive(Debug, Clone)]
enum DataSource {
    File(JsonFileSource),
    Seeded(MemorySource),
}

impl StoreSource for DataSource {
    fn open(&self) -> Result<Snapshot, StoreError> {
        match self {
            Self::File(source) => source.open(),
            Self::Seeded(source) => source.open(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::File(source) => source.describe(),
            Self::Seeded(source) => format!("generated sample, {}", source.describe()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_reports(&args)? {
        return Ok(());
    }
    if maybe_dump_dataset(&args)? {
        return Ok(());
    }

    let report_ids = expand_reports(&args.reports)?;
    announce_banner();

    let start_time = Instant::now();
    let engine = Arc::new(ReportEngine::new(build_source(&args)));
    info!(
        "evaluating {} reports against {}",
        report_ids.len(),
        engine.source().describe()
    );
    if args.verbose {
        eprintln!("📂 Data source: {}", engine.source().describe().bright_white());
    }

    let results = evaluate_reports(engine, &report_ids, args.verbose).await?;
    write_reports(&args, &results, start_time)?;
    Ok(())
}

fn maybe_list_reports(args: &Args) -> Result<bool> {
    if !args.list_reports {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available reports:")?;
    for id in ReportId::ALL {
        writeln!(output_target.writer(), "  {:30} - {}", id.slug(), id.description())?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn maybe_dump_dataset(args: &Args) -> Result<bool> {
    let Some(path) = args.dump_dataset.as_ref() else {
        return Ok(false);
    };
    let dataset = generate_dataset(&SeedConfig::with_seed(args.seed));
    let json = dataset
        .to_json_pretty()
        .context("failed to serialize generated dataset")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    info!(
        "wrote dataset seed {} ({} rows, sha256 {}) to {}",
        args.seed,
        dataset.len(),
        dataset.digest(),
        path.display()
    );
    Ok(true)
}

fn announce_banner() {
    eprintln!("{}", "🤖 Colonie Robot Ethics Dashboard".bright_cyan().bold());
    eprintln!("{}", "==================================".cyan());
}

/// Resolve requested ids; unknown ids are rejected before anything is evaluated.
fn expand_reports(reports_arg: &str) -> Result<Vec<ReportId>> {
    let tokens = split_csv(reports_arg);
    if tokens.is_empty() {
        bail!("no reports requested");
    }
    let mut ids: Vec<ReportId> = Vec::new();
    for token in tokens {
        let requested = if token.eq_ignore_ascii_case("all") {
            ReportId::ALL.to_vec()
        } else {
            vec![token.parse::<ReportId>()?]
        };
        for id in requested {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    Ok(ids)
}

fn build_source(args: &Args) -> DataSource {
    match args.data.as_ref() {
        Some(path) => DataSource::File(JsonFileSource::new(path)),
        None => DataSource::Seeded(MemorySource::new(generate_dataset(&SeedConfig::with_seed(
            args.seed,
        )))),
    }
}

/// Evaluate each report on its own blocking task; results come back in
/// request order.
async fn evaluate_reports(
    engine: Arc<ReportEngine<DataSource>>,
    report_ids: &[ReportId],
    verbose: bool,
) -> Result<Vec<(ReportId, Vec<Record>)>> {
    let handles: Vec<_> = report_ids
        .iter()
        .map(|&id| {
            let engine = Arc::clone(&engine);
            (id, tokio::task::spawn_blocking(move || engine.evaluate(id)))
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (id, handle) in handles {
        let records = handle
            .await
            .with_context(|| format!("report {id} did not complete"))?
            .with_context(|| format!("failed to evaluate {id}"))?;
        if verbose {
            eprintln!("✅ {} ({} rows)", id.slug().green(), records.len());
        }
        results.push((id, records));
    }
    Ok(results)
}

fn write_reports(
    args: &Args,
    results: &[(ReportId, Vec<Record>)],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.format.as_str() {
        "json" => reports::generate_json_report(&mut output_target, results)?,
        "markdown" => reports::generate_markdown_report(&mut output_target, results)?,
        "csv" => reports::generate_csv_report(&mut output_target, results)?,
        _ => {
            let duration = start_time.elapsed();
            reports::generate_console_report(&mut output_target, results, duration)?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
