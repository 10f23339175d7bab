// ABOUTME: CLI binary for running a JSON job list against one HTML page.
// ABOUTME: Prints the per-field outcomes as a JSON object; diagnostics go to stderr via tracing.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use serde_json::{Map, Value};
use sitemove_obtain::{Engine, Job, JobConfig, ObtainOptions, Page, TracingSink};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "obtain")]
#[command(about = "Extract fields from an HTML page with a rule-driven job list")]
struct Args {
    /// HTML file to read
    #[arg(long = "html")]
    html: PathBuf,

    /// JSON file with the job list: [{"field", "kind", "rules": [{"method", "arguments"}]}]
    #[arg(long = "jobs")]
    jobs: PathBuf,

    /// JSON options file (missing keys keep their defaults)
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Source tag attached to diagnostics (default: the HTML file name)
    #[arg(long = "source")]
    source: Option<String>,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Log rule attempts at debug level (overridden by RUST_LOG)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "sitemove_obtain=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(args: &Args) -> anyhow::Result<String> {
    let opts = match &args.config {
        Some(path) => ObtainOptions::from_json_file(path)?,
        None => ObtainOptions::default(),
    };
    let configs = JobConfig::load_list(&args.jobs)?;
    let jobs: Vec<Job> = configs.iter().map(JobConfig::build).collect();

    let bytes = fs::read(&args.html).with_context(|| format!("reading {}", args.html.display()))?;
    let mut page = Page::from_bytes(&bytes, &opts);

    let source = args.source.clone().unwrap_or_else(|| {
        args.html
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let engine = Engine::builder().options(opts).build();
    let mut sink = TracingSink;
    let results = engine.obtain_all(&jobs, &mut page, &mut sink, &source)?;

    let mut out = Map::new();
    for (field, outcome) in results {
        out.insert(field, serde_json::to_value(outcome)?);
    }
    Ok(serde_json::to_string_pretty(&Value::Object(out))?)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let output = match run(&args) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::from(1);
        }
    };

    if let Some(path) = &args.output {
        if let Err(e) = fs::write(path, &output) {
            eprintln!("error writing to {:?}: {}", path, e);
            return ExitCode::from(1);
        }
    } else {
        println!("{}", output);
    }
    ExitCode::SUCCESS
}
