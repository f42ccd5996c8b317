//! CLI entry point for the sales analysis.

use anyhow::{Context, Result};
use clap::Parser;
use sales_analyzer::{AnalysisConfig, AnalysisError, ConsoleReporter, SalesAnalysis};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Sales & Profit Analysis",
    long_about = "Explores a sales export (.csv or .xlsx), reports totals and rankings, \
                  and renders trend, category and discount charts.\n\n\
                  EXAMPLES:\n  \
                  sales-analyzer orders.csv\n  \
                  sales-analyzer orders.xlsx --charts-dir charts/ --seed 42\n  \
                  sales-analyzer orders.csv --json --no-charts"
)]
struct Args {
    /// Path to the sales data file (.csv or .xlsx)
    ///
    /// If omitted, the path is read from standard input
    input: Option<PathBuf>,

    /// Number of sub-categories in the top / bottom rankings
    #[arg(long, default_value_t = 10)]
    top_n: usize,

    /// Maximum number of orders plotted in the discount scatter
    #[arg(long, default_value_t = 1000)]
    sample_size: usize,

    /// Seed for the scatter sample
    #[arg(long)]
    seed: Option<u64>,

    /// Rows shown in the data preview
    #[arg(long, default_value_t = 5)]
    head_rows: usize,

    /// Write rendered charts as PNG into this directory
    #[arg(long)]
    charts_dir: Option<PathBuf>,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Print the report as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(level: &str, quiet: bool, json_output: bool) {
    // Keep stdout clean for the JSON report
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn prompt_for_path() -> Result<PathBuf> {
    print!("Please enter the path to your sales data file: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Could not read the file path from standard input")?;
    Ok(PathBuf::from(line.trim()))
}

fn run(args: Args) -> Result<()> {
    let input = match args.input {
        Some(path) => path,
        None => prompt_for_path()?,
    };

    let config = AnalysisConfig::builder()
        .input(input)
        .head_rows(args.head_rows)
        .top_n(args.top_n)
        .sample_size(args.sample_size)
        .seed(args.seed)
        .render_charts(!args.no_charts)
        .charts_dir(args.charts_dir)
        .build()
        .map_err(AnalysisError::from)?;

    info!("Analysing {}", config.input.display());
    let analysis = SalesAnalysis::new(config)?;

    if args.json {
        let outcome = analysis.run(None)?;
        let json = outcome
            .report
            .to_json()
            .context("Could not serialize the report as JSON")?;
        println!("{json}");
    } else {
        let console = ConsoleReporter::new(analysis.config().head_rows);
        analysis.run(Some(&console))?;
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        if let Some(hint) = e.downcast_ref::<AnalysisError>().and_then(AnalysisError::hint) {
            eprintln!("{hint}");
        }
        std::process::exit(1);
    }
}
