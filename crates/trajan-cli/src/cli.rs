use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "TRAJAN CLI - RMSD and RMSF analysis of molecular dynamics trajectories, from the command line or through a web form.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the upload form and run analyses submitted through it.
    Serve(ServeArgs),
    /// Analyze a local reference structure and trajectory.
    Analyze(AnalyzeArgs),
}

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to bind, overriding `server.host`.
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to listen on, overriding `server.port`.
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Maximum request body size in megabytes, overriding `server.max-upload-mb`.
    #[arg(long, value_name = "MB")]
    pub max_upload_mb: Option<usize>,

    /// Directory for per-request upload folders, overriding `server.temp-dir`.
    #[arg(long, value_name = "PATH")]
    pub temp_dir: Option<PathBuf>,

    /// Frames per chunk, overriding `analysis.chunk-size`.
    #[arg(long, value_name = "INT")]
    pub chunk_size: Option<usize>,
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    /// Reference structure (PDB).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub reference: PathBuf,

    /// Trajectory (DCD).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub trajectory: PathBuf,

    /// Output prefix; writes `<PREFIX>_rmsd.csv` and `<PREFIX>_rmsf.csv`.
    /// Without it a summary is printed instead.
    #[arg(short, long, value_name = "PREFIX")]
    pub output: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Frames per chunk, overriding `analysis.chunk-size`.
    #[arg(long, value_name = "INT")]
    pub chunk_size: Option<usize>,

    /// Analyze only the first N frames.
    #[arg(short = 'n', long, value_name = "INT")]
    pub frames: Option<usize>,
}
