//! rowframe - query, group and summarize tabular files

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

use rowframe::config::{AggregateSpec, Config, OutputFormat, RangeSpec, SliceSpec};
use rowframe::output::render_to_stdout;
use rowframe::parser::ParserFactory;
use rowframe::{run_pipeline, Condition, SortOrder};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSortOrder {
    #[value(alias = "ascending")]
    Asc,
    #[value(alias = "descending")]
    Desc,
}

impl From<CliSortOrder> for SortOrder {
    fn from(o: CliSortOrder) -> Self {
        match o {
            CliSortOrder::Asc => SortOrder::Ascending,
            CliSortOrder::Desc => SortOrder::Descending,
        }
    }
}

/// Query, group and summarize a JSON or CSV table
#[derive(Parser, Debug)]
#[command(name = "rowframe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON (array of objects) or CSV/TSV file
    file: PathBuf,

    /// Keep rows matching `column op value`; op is one of == != > >= < <= in (repeatable)
    #[arg(short = 'w', long = "where", value_name = "CONDITION")]
    conditions: Vec<Condition>,

    /// Keep rows whose column lies in an inclusive range, `column=start..end`
    #[arg(long, value_name = "RANGE")]
    ts_slice: Option<RangeSpec>,

    /// Column to sort by
    #[arg(short, long)]
    sort: Option<String>,

    /// Sort direction
    #[arg(long, value_enum, default_value = "asc")]
    order: CliSortOrder,

    /// Keep rows in `start[:end]`; negative positions count from the end
    #[arg(long, allow_hyphen_values = true)]
    slice: Option<SliceSpec>,

    /// Keep the first N rows
    #[arg(long, value_name = "N")]
    head: Option<usize>,

    /// Keep the last N rows
    #[arg(long, value_name = "N")]
    tail: Option<usize>,

    /// Column to group rows by
    #[arg(short, long)]
    group_by: Option<String>,

    /// Per-group aggregation `output=column:function`; function is one of
    /// sum, mean, median, min, max, count, first (repeatable)
    #[arg(short, long = "agg", value_name = "AGG", requires = "group_by")]
    aggregations: Vec<AggregateSpec>,

    /// Print summary statistics of a column
    #[arg(long, value_name = "COLUMN")]
    describe: Option<String>,

    /// Print the distinct values of a column
    #[arg(long, value_name = "COLUMN")]
    unique: Option<String>,

    /// Print the column names
    #[arg(long)]
    columns: bool,

    /// Reject files whose rows do not all share the first row's columns
    #[arg(long)]
    strict_schema: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: CliOutputFormat,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,

    /// Log pipeline steps to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG`, defaulting to warnings (debug with `--verbose`)
fn init_tracing(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config {
        input: cli.file.clone(),
        conditions: cli.conditions,
        range: cli.ts_slice,
        sort_by: cli.sort,
        sort_order: cli.order.into(),
        slice: cli.slice,
        head: cli.head,
        tail: cli.tail,
        group_by: cli.group_by,
        aggregations: cli.aggregations,
        describe: cli.describe,
        unique: cli.unique,
        show_columns: cli.columns,
        strict_schema: cli.strict_schema,
        output_format: cli.format.into(),
        compact: cli.compact,
    };

    let table = ParserFactory::new()
        .parse(&config.input, &config)
        .with_context(|| format!("Failed to load {}", config.input.display()))?;
    debug!(rows = table.len(), file = %config.input.display(), "loaded");

    let report = run_pipeline(table, &config)?;
    render_to_stdout(&report, config.output_format, config.compact)?;

    Ok(())
}
