//! docket - plaintiff entity resolution for court-record tables
//!
//! One subcommand per batch job: outcome counts, matrix build, full run,
//! eps sweep and build-time estimate.

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use docket_core::{DocketConfig, ScorerKind};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docket")]
#[command(about = "Group plaintiff name variants in court records and tabulate outcomes")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Similarity scorer: jaro, jaro_winkler, normalized_levenshtein, sorensen_dice
    #[arg(long, global = true)]
    scorer: Option<ScorerKind>,

    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Remove duplicate rows and count cleaned case outcomes
    Outcomes {
        /// Input CSV
        input: PathBuf,

        /// Output CSV (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Score every pair of distinct plaintiffs and save the matrix
    Matrix {
        /// Input CSV
        input: PathBuf,

        /// Matrix file (default: <output dir>/<timestamp>-similarity.bin)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Cluster plaintiffs and cross-tabulate them against outcomes
    Run(RunArgs),

    /// Cluster over a range of eps values and report the counts
    Sweep(SweepArgs),

    /// Estimate how long building the matrix would take
    Estimate {
        /// Input CSV
        input: PathBuf,

        /// Number of matrix rows to time
        #[arg(long, default_value_t = 500)]
        sample: usize,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Input CSV
    pub input: PathBuf,

    /// Load a matrix saved by `docket matrix`
    #[arg(long, value_name = "FILE", conflicts_with = "build_matrix")]
    pub matrix: Option<PathBuf>,

    /// Build the matrix as part of this run
    #[arg(long)]
    pub build_matrix: bool,

    /// Also save a matrix built by this run
    #[arg(long, value_name = "FILE", requires = "build_matrix")]
    pub save_matrix: Option<PathBuf>,

    /// Neighbourhood radius in distance (1 - similarity)
    #[arg(long)]
    pub eps: Option<f64>,

    /// Neighbourhood weight needed for a core point
    #[arg(long)]
    pub min_samples: Option<usize>,

    /// Count every distinct name once instead of by occurrences
    #[arg(long)]
    pub unweighted: bool,

    /// Contingency table CSV (default: <output dir>/<timestamp>-comparedPO.csv)
    #[arg(long, value_name = "FILE")]
    pub crosstab: Option<PathBuf>,

    /// Input rows with cleaned values and cluster labels
    #[arg(long, value_name = "FILE")]
    pub annotated: Option<PathBuf>,

    /// One row per cluster with its representative name
    #[arg(long, value_name = "FILE")]
    pub clusters: Option<PathBuf>,

    /// Run summary as JSON
    #[arg(long, value_name = "FILE")]
    pub summary: Option<PathBuf>,
}

#[derive(Args)]
pub struct SweepArgs {
    /// Input CSV
    pub input: PathBuf,

    /// Matrix saved by `docket matrix`
    #[arg(long, value_name = "FILE")]
    pub matrix: PathBuf,

    #[arg(long, default_value_t = 0.01)]
    pub min_eps: f64,

    #[arg(long, default_value_t = 0.24)]
    pub max_eps: f64,

    #[arg(long, default_value_t = 0.01)]
    pub step: f64,

    /// Neighbourhood weight needed for a core point
    #[arg(long)]
    pub min_samples: Option<usize>,

    /// Count every distinct name once instead of by occurrences
    #[arg(long)]
    pub unweighted: bool,

    /// Output CSV (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => DocketConfig::load(path)?,
        None => DocketConfig::default(),
    };
    if let Some(scorer) = cli.scorer {
        config.similarity.scorer = scorer;
    }

    match cli.command {
        Command::Outcomes { input, output } => commands::outcomes(&config, &input, output.as_deref()),
        Command::Matrix { input, output } => commands::matrix(&config, &input, output.as_deref()),
        Command::Run(args) => commands::run(config, &args),
        Command::Sweep(args) => commands::sweep(&config, &args),
        Command::Estimate { input, sample } => commands::estimate(&config, &input, sample),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
