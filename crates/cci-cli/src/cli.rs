//! CLI argument definitions for the CCI tagger.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "cci-tag",
    version,
    about = "CCI dataset tagger - derive DRS identifiers and vocabulary tags",
    long_about = "Tag ESA CCI dataset files against the CCI controlled vocabulary.\n\n\
                  Produces the MOLES tags CSV and the ESGF DRS JSON mapping, and\n\
                  maintains the persistent realization registry."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Tag one or more datasets and write the run outputs.
    Datasets(DatasetArgs),

    /// Tag a single file and print its tags as JSON.
    File(FileArgs),
}

#[derive(Parser)]
pub struct DatasetArgs {
    /// Dataset directories (or single files) to tag.
    #[arg(value_name = "DATASET")]
    pub datasets: Vec<PathBuf>,

    /// Read additional dataset paths from a file, one per line.
    #[arg(long = "datasets-file", value_name = "PATH")]
    pub datasets_file: Option<PathBuf>,

    /// Also tag every dataset declared in the JSON config store.
    #[arg(long = "json-datasets")]
    pub json_datasets: bool,

    /// Maximum number of files to process per dataset (0 = unlimited).
    #[arg(long = "max-file-count", value_name = "N", default_value_t = 0)]
    pub max_file_count: i64,

    /// Directory of per-dataset JSON config files.
    #[arg(long = "json-store", value_name = "DIR")]
    pub json_store: Option<PathBuf>,

    /// Vocabulary JSON dump to resolve facet values against.
    #[arg(long = "vocab", value_name = "PATH")]
    pub vocab: PathBuf,

    /// Realization registry file (default: <OUTPUT_DIR>/realizations.json).
    #[arg(long = "registry", value_name = "PATH")]
    pub registry: Option<PathBuf>,

    /// Skip SHA-256 checksums in the DRS JSON output.
    #[arg(long = "no-checksum")]
    pub no_checksum: bool,

    /// Compute everything but write no output files.
    #[arg(long = "suppress-output")]
    pub suppress_output: bool,

    /// Directory for the run outputs.
    #[arg(long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Parser)]
pub struct FileArgs {
    /// The data file to tag.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Vocabulary JSON dump to resolve facet values against.
    #[arg(long = "vocab", value_name = "PATH")]
    pub vocab: PathBuf,

    /// Directory of per-dataset JSON config files.
    #[arg(long = "json-store", value_name = "DIR")]
    pub json_store: Option<PathBuf>,

    /// Realization registry file, consulted but never written.
    #[arg(long = "registry", value_name = "PATH")]
    pub registry: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
