use std::io::{self, Read};
use std::path::PathBuf;

use bigquery_adapter::explain::{self, ExplainPlan};
use bigquery_adapter::plan::QueryPlan;
use clap::{Parser, ValueEnum};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Failed to read plan: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid plan: {0}")]
    Plan(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Human,
    Json,
}

impl From<LogFormatArg> for logutil::LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Human => logutil::LogFormat::HumanReadable,
            LogFormatArg::Json => logutil::LogFormat::Json,
        }
    }
}

#[derive(Parser)]
#[clap(name = "bqexplain")]
struct Arguments {
    /// File containing a JSON serialized query plan. Reads stdin if omitted.
    plan: Option<PathBuf>,

    /// Root field name reported in JSON output.
    #[clap(long, default_value = "query")]
    field_name: String,

    /// Print the explain payload as JSON instead of plain text.
    #[clap(long)]
    json: bool,

    #[clap(long, value_enum, default_value_t = LogFormatArg::Human, env = "BQEXPLAIN_LOG_FORMAT")]
    log_format: LogFormatArg,

    /// Log at debug level.
    #[clap(short, long)]
    verbose: bool,
}

/// Render the explain output of a compiled BigQuery plan.
fn main() {
    let args = Arguments::parse();
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    logutil::configure_global_logger(level, args.log_format.into(), io::stderr);

    match inner(args) {
        Ok(out) => println!("{out}"),
        Err(err) => {
            println!("ERROR: {err}");
            std::process::exit(1);
        }
    }
}

fn inner(args: Arguments) -> Result<String, CliError> {
    let raw = match &args.plan {
        Some(path) => std::fs::read_to_string(path)?,
        None => read_plan(io::stdin())?,
    };
    render(&raw, args.field_name, args.json)
}

fn read_plan(mut reader: impl Read) -> Result<String, CliError> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    Ok(buf)
}

fn render(raw: &str, field_name: String, json: bool) -> Result<String, CliError> {
    let plan: QueryPlan = serde_json::from_str(raw)?;
    tracing::debug!(cardinality = %plan.cardinality(), "loaded plan");

    if json {
        let payload = ExplainPlan::for_plan(field_name, &plan);
        Ok(serde_json::to_string_pretty(&payload)?)
    } else {
        Ok(explain::render_text(&plan))
    }
}
