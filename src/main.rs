use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use serde::Serialize;
use tracing::{debug, Level};

use commaudit::config::{AuditConfig, DefaultVertexId, DefaultWeight};
use commaudit::graph_io::InputFormat;
use commaudit::pipeline::run_audit;
use commaudit::Result;

/// Count the communities of a partition whose induced subgraph is disconnected.
#[derive(Parser, Debug, Serialize)]
#[command(author, version, about)]
struct Args {
    /// Input graph file.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Input graph format.
    #[arg(short = 'f', long, value_enum)]
    input_format: Option<InputFormat>,

    /// Community membership file.
    #[arg(short, long)]
    membership: Option<PathBuf>,

    /// Membership lines are "vertexId communityId".
    #[arg(short = 'k', long)]
    membership_keyed: bool,

    /// Index origin of the membership file.
    #[arg(short = 'r', long)]
    membership_start: Option<usize>,

    /// Read edge weights.
    #[arg(short, long)]
    weighted: bool,

    /// Input graph is already undirected.
    #[arg(short, long)]
    symmetric: bool,

    /// Worker threads, 0 uses all cores.
    #[arg(short, long)]
    num_threads: Option<usize>,

    /// YAML file with default settings; explicit flags override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the report as YAML to this file.
    #[arg(short = 'o', long)]
    report: Option<PathBuf>,

    /// Hide progress bars.
    #[arg(short, long)]
    quiet: bool,

    /// Log more (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Builds the run configuration: the YAML file if given, then the flags on top.
    fn into_config(self) -> Result<AuditConfig> {
        let mut config = match &self.config {
            Some(path) => AuditConfig::from_yaml_file(path)?,
            None => AuditConfig::default(),
        };
        if let Some(input) = self.input {
            config.input = Some(input);
        }
        if let Some(input_format) = self.input_format {
            config.input_format = input_format;
        }
        if let Some(membership) = self.membership {
            config.membership = Some(membership);
        }
        if let Some(start) = self.membership_start {
            config.membership_start = start;
        }
        if let Some(num_threads) = self.num_threads {
            config.num_threads = num_threads;
        }
        if let Some(report) = self.report {
            config.report = Some(report);
        }
        config.membership_keyed |= self.membership_keyed;
        config.weighted |= self.weighted;
        config.symmetric |= self.symmetric;
        if self.quiet {
            config.show_progress = false;
        }
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    // Help, version and usage errors all exit with status 1.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            err.print().ok();
            return ExitCode::from(1);
        }
    };
    init_logging(args.verbose);
    debug!(?args, "command line");

    let config = match args.into_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(1);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run_audit::<DefaultVertexId, DefaultWeight, _>(&config, &mut out) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}
