//! meshnet CLI tool
//!
//! Forms a cluster from a JSON list of discovered neighbors.
//!
//! Usage:
//!   meshnet form     [--max-size N] [FILE]
//!   meshnet optimize [--max-size N] [FILE]
//!   meshnet rank     [FILE]
//!
//! FILE defaults to stdin. Results are printed to stdout as JSON; logs go
//! to stderr.

use std::io::Read;
use std::path::PathBuf;

use meshnet_cluster::{rank_candidates, ClusterFormer, Device, FormationConfig};
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("Failed to read {source_name}: {error}")]
    Io {
        source_name: String,
        error: std::io::Error,
    },

    #[error("Invalid device list: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Cluster(#[from] meshnet_cluster::Error),
}

/// Parsed command line.
#[derive(Debug, PartialEq)]
enum Command {
    Form { max_size: Option<usize>, input: Option<PathBuf> },
    Optimize { max_size: Option<usize>, input: Option<PathBuf> },
    Rank { input: Option<PathBuf> },
    Help,
}

#[derive(Serialize)]
struct OptimizeOutput<'a> {
    formed: &'a meshnet_cluster::Cluster,
    optimized: &'a meshnet_cluster::Cluster,
    report: &'a meshnet_cluster::OptimizationReport,
}

fn print_usage() {
    eprintln!("meshnet - Form mesh clusters and elect leaders");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  meshnet form     [--max-size N] [FILE]  Form a cluster");
    eprintln!("  meshnet optimize [--max-size N] [FILE]  Form, then prune low-battery members");
    eprintln!("  meshnet rank     [FILE]                 Rank leadership candidates");
    eprintln!("  meshnet help                            Show this message");
    eprintln!();
    eprintln!("FILE is a JSON array of devices; stdin when omitted.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MESHNET_MAX_CLUSTER_SIZE  Default cluster size cap (default: 8)");
    eprintln!("  MESHNET_MIN_BATTERY       Battery percentage pruned by optimize (default: 20)");
    eprintln!("  RUST_LOG                  Log filter (default: meshnet=info,meshnet_cluster=info)");
}

fn parse_args(args: &[String]) -> Result<Command, CliError> {
    let Some(name) = args.first() else {
        return Err(CliError::Usage("missing command".into()));
    };

    let mut max_size = None;
    let mut input = None;
    let mut rest = args[1..].iter();

    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--max-size" | "-n" => {
                let value = rest
                    .next()
                    .ok_or_else(|| CliError::Usage(format!("{} requires a value", arg)))?;
                let size: usize = value
                    .parse()
                    .map_err(|_| CliError::Usage(format!("invalid size: {}", value)))?;
                max_size = Some(size);
            }
            flag if flag.starts_with('-') && flag != "-" => {
                return Err(CliError::Usage(format!("unknown option: {}", flag)));
            }
            path => {
                if input.is_some() {
                    return Err(CliError::Usage("only one input file may be given".into()));
                }
                if path != "-" {
                    input = Some(PathBuf::from(path));
                }
            }
        }
    }

    match name.as_str() {
        "form" => Ok(Command::Form { max_size, input }),
        "optimize" => Ok(Command::Optimize { max_size, input }),
        "rank" => {
            if max_size.is_some() {
                return Err(CliError::Usage("rank does not take --max-size".into()));
            }
            Ok(Command::Rank { input })
        }
        "-h" | "--help" | "help" => Ok(Command::Help),
        other => Err(CliError::Usage(format!("unknown command: {}", other))),
    }
}

fn read_input(input: Option<&PathBuf>) -> Result<String, CliError> {
    match input {
        Some(path) => std::fs::read_to_string(path).map_err(|error| CliError::Io {
            source_name: path.display().to_string(),
            error,
        }),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .map_err(|error| CliError::Io {
                    source_name: "stdin".into(),
                    error,
                })?;
            Ok(raw)
        }
    }
}

/// Execute a command against raw JSON input, returning the JSON output.
fn execute(command: &Command, config: FormationConfig, raw: &str) -> Result<String, CliError> {
    let devices: Vec<Device> = serde_json::from_str(raw)?;
    tracing::info!(devices = devices.len(), "loaded device list");

    let output = match command {
        Command::Form { max_size, .. } => {
            let former = ClusterFormer::new(config);
            let size = max_size.unwrap_or(former.config().max_cluster_size);
            let cluster = former.form_cluster(&devices, size)?;
            serde_json::to_string_pretty(&cluster)?
        }
        Command::Optimize { max_size, .. } => {
            let former = ClusterFormer::new(config);
            let size = max_size.unwrap_or(former.config().max_cluster_size);
            let formed = former.form_cluster(&devices, size)?;
            let (optimized, report) = former.optimize_cluster_with_report(&formed);
            serde_json::to_string_pretty(&OptimizeOutput {
                formed: &formed,
                optimized: &optimized,
                report: &report,
            })?
        }
        Command::Rank { .. } => serde_json::to_string_pretty(&rank_candidates(&devices))?,
        Command::Help => String::new(),
    };

    Ok(output)
}

fn run(command: Command) -> Result<(), CliError> {
    let input = match &command {
        Command::Form { input, .. } | Command::Optimize { input, .. } | Command::Rank { input } => {
            input.as_ref()
        }
        Command::Help => {
            print_usage();
            return Ok(());
        }
    };

    let config = FormationConfig::from_env()?;
    let raw = read_input(input)?;
    let output = execute(&command, config, &raw)?;
    println!("{}", output);
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meshnet=info,meshnet_cluster=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
