//! `bound`: run a built-in sequence under a boundary and report the result.
//!
//! The boundary comes from a TOML config (`bound.toml`) or from flags; the
//! report is printed as JSON on stdout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;

use bound::io::config::{BoundConfig, BoundarySpec, load_config, write_config};
use bound::sequences::{self, SequenceKind};
use bound::{BoundError, CallArgs, StopReason, exit_codes, logging};

const DEFAULT_CONFIG: &str = "bound.toml";

#[derive(Parser)]
#[command(
    name = "bound",
    version,
    about = "Run an unbounded sequence until a composed boundary says stop"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a sequence under a boundary and print a JSON report.
    Run(RunArgs),
    /// Write a default `bound.toml`.
    Init {
        /// Where to write the config.
        #[arg(default_value = DEFAULT_CONFIG)]
        path: PathBuf,
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(clap::Args, Debug, Default)]
struct RunArgs {
    /// Read the boundary and sequence from this TOML file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Stop after N values.
    #[arg(long, value_name = "N")]
    times: Option<u64>,
    /// Stop once SECS seconds have passed.
    #[arg(long, value_name = "SECS")]
    timed: Option<f64>,
    /// Stop once the running sum reaches T.
    #[arg(long, value_name = "T")]
    accumulated: Option<u64>,
    /// Combine several boundary flags with OR instead of AND.
    #[arg(long)]
    any: bool,
    #[arg(long, value_enum)]
    sequence: Option<SequenceKind>,
    /// Sleep before producing each value.
    #[arg(long, value_name = "MS")]
    wait_ms: Option<u64>,
    /// Include every produced value in the report.
    #[arg(long)]
    all: bool,
}

impl RunArgs {
    /// Boundary given on the command line, if any.
    fn boundary_spec(&self) -> Option<BoundarySpec> {
        let mut specs = Vec::new();
        if let Some(n) = self.times {
            specs.push(BoundarySpec::Times {
                n: Some(i64::try_from(n).unwrap_or(i64::MAX)),
            });
        }
        if let Some(seconds) = self.timed {
            specs.push(BoundarySpec::Timed {
                seconds: Some(seconds),
            });
        }
        if let Some(threshold) = self.accumulated {
            specs.push(BoundarySpec::Accumulated {
                threshold: Some(threshold),
            });
        }
        match specs.len() {
            0 => None,
            1 => specs.pop(),
            _ if self.any => Some(BoundarySpec::Any { children: specs }),
            _ => Some(BoundarySpec::All { children: specs }),
        }
    }

    /// Config file (or defaults) with command-line overrides applied.
    fn resolve(&self) -> Result<BoundConfig> {
        let mut cfg = match &self.config {
            Some(path) if !path.exists() => bail!("config file {} not found", path.display()),
            Some(path) => load_config(path)?,
            None => BoundConfig::default(),
        };
        if let Some(spec) = self.boundary_spec() {
            spec.validate()?;
            cfg.boundary = spec;
        }
        if let Some(kind) = self.sequence {
            cfg.sequence.kind = kind;
        }
        if let Some(wait_ms) = self.wait_ms {
            cfg.sequence.wait_ms = wait_ms;
        }
        Ok(cfg)
    }
}

#[derive(Debug, Serialize)]
struct Report {
    boundary: String,
    stop: StopReason,
    produced: usize,
    last: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<Vec<u64>>,
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    let code = match execute(cli) {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{err:#}");
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run(args) => cmd_run(&args),
        Command::Init { path, force } => cmd_init(&path, force),
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<BoundError>() {
        Some(err) if err.is_protocol() => exit_codes::PROTOCOL,
        _ => exit_codes::INVALID,
    }
}

fn cmd_run(args: &RunArgs) -> Result<()> {
    let cfg = args.resolve()?;
    let report = run_report(&cfg, args.all)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serialize report")?
    );
    Ok(())
}

fn run_report(cfg: &BoundConfig, keep_values: bool) -> Result<Report> {
    let boundary = cfg.boundary.to_boundary();
    let bounded = boundary.bind(sequences::process(cfg.sequence.kind));
    let outcome = bounded
        .outcome(&call_args(cfg.sequence.wait_ms))
        .with_context(|| format!("run bounded by {}", boundary.name()))?;
    Ok(Report {
        boundary: boundary.name().to_string(),
        stop: outcome.stop,
        produced: outcome.values.len(),
        last: outcome.last().copied(),
        values: keep_values.then_some(outcome.values),
    })
}

fn call_args(wait_ms: u64) -> CallArgs {
    if wait_ms == 0 {
        return CallArgs::new();
    }
    CallArgs::new().with_named("wait", wait_ms as f64 / 1000.0)
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &BoundConfig::default())?;
    println!("{}", path.display());
    Ok(())
}
