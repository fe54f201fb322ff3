use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{generate, Generator, Shell};
use eyre::Report;
use log::LevelFilter;
use std::io;
use std::path::PathBuf;

/// Autocuration pipeline for influenza nucleotide sequences.
///
/// Classifies a query sequence, aligns it against its curated profile, and
/// emits a structured set of curation flags for manual review.
#[derive(Parser, Debug)]
#[command(name = "flu-curate", author, version)]
pub struct Args {
  #[command(subcommand)]
  pub command: Option<Commands>,

  /// Path to the query FASTA file (the first record is used).
  #[arg(long, value_hint = ValueHint::FilePath)]
  pub query: Option<PathBuf>,

  /// Restrict the printed report to a subset of flags.
  #[arg(long, value_enum)]
  pub flag: Option<FlagSelector>,

  /// Path to the Table 6 ledger file.
  #[arg(long, value_hint = ValueHint::FilePath)]
  pub table6: Option<PathBuf>,

  /// Directory holding per-strain profile FASTA, boundary, and lookup files.
  #[arg(long, value_hint = ValueHint::DirPath)]
  pub reference_dir: Option<PathBuf>,

  /// Tab-separated `accession  profile_id  strain_id  identity` table standing
  /// in for the homology classifier (C2), which is out of scope for this crate.
  #[arg(long, value_hint = ValueHint::FilePath)]
  pub classifications: Option<PathBuf>,

  /// Directory alignments and the updated ledger are written to.
  #[arg(long, value_hint = ValueHint::DirPath, default_value = ".")]
  pub output_dir: PathBuf,

  /// Emit the report as JSON instead of a line-oriented summary.
  #[arg(long)]
  pub output_json: bool,

  /// Number of queries processed in parallel. Defaults to all available CPU threads.
  #[arg(long, short, default_value_t = num_cpus::get())]
  pub jobs: usize,

  /// Set verbosity level explicitly; overrides the count of `-v` flags.
  #[arg(long, global = true, conflicts_with = "silent")]
  pub verbosity: Option<LevelFilter>,

  /// Increase verbosity (-v, -vv, -vvv); ignored when `--verbosity` is set.
  #[arg(short, long, action = clap::ArgAction::Count, global = true, conflicts_with = "silent")]
  pub verbose: u8,

  /// Disable all console output. Same as `--verbosity=off`.
  #[arg(long, global = true, conflicts_with = "verbosity")]
  pub silent: bool,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagSelector {
  Mut,
  Ambig,
  Ins,
  Del,
  Sub,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Generate shell completions.
  Completions {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    shell: Shell,
  },
}

/// Resolves the effective log level from `--silent`, `--verbosity`, and `-v` repeats.
pub fn resolve_log_level(args: &Args) -> LevelFilter {
  if args.silent {
    return LevelFilter::Off;
  }
  if let Some(level) = args.verbosity {
    return level;
  }
  match args.verbose {
    0 => LevelFilter::Warn,
    1 => LevelFilter::Info,
    2 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  }
}

pub fn print_completions<G: Generator>(generator: G) {
  let mut command = Args::command();
  let bin_name = command.get_name().to_owned();
  generate(generator, &mut command, bin_name, &mut io::stdout());
}

pub fn parse_args() -> Result<Args, Report> {
  Ok(Args::parse())
}
