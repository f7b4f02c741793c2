use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueHint};

mod run_impl;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "langstats",
    version,
    about = "Tally languages across GitHub repositories and render a pie chart",
    long_about = None
)]
pub struct Args {
    /// JSON file overriding the built-in owners, exclusions and language tables
    #[arg(long = "config", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Directory receiving the clones
    #[arg(long = "work-dir", value_name = "PATH", default_value = "repos", value_hint = ValueHint::DirPath)]
    pub work_dir: PathBuf,

    /// Where to write the language counts
    #[arg(long = "json-out", value_name = "PATH", default_value = "languageStats.json", value_hint = ValueHint::FilePath)]
    pub json_out: PathBuf,

    /// Where to write the rendered chart
    #[arg(long = "png-out", value_name = "PATH", default_value = "languageStats.png", value_hint = ValueHint::FilePath)]
    pub png_out: PathBuf,

    /// Name of the repository to skip as "self" (defaults to the current directory name)
    #[arg(long = "current-repo", value_name = "NAME")]
    pub current_repo: Option<String>,

    /// Do not contact the charting service
    #[arg(long = "no-chart", action = ArgAction::SetTrue)]
    pub no_chart: bool,

    /// Write the chart service's response even when it is not a success
    #[arg(long = "write-any-response", action = ArgAction::SetTrue, conflicts_with = "no_chart")]
    pub write_any_response: bool,

    /// Show a progress bar while cloning
    #[arg(long = "progress", action = ArgAction::SetTrue)]
    pub progress: bool,

    /// Verbose logging (repeat for more)
    #[arg(long = "verbose", short = 'v', action = ArgAction::Count)]
    pub verbose: u8,
}

/// Runs the CLI application.
///
/// # Errors
/// Returns an error if any pipeline stage fails.
pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    run_impl::run_with_args(&args)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = format!("warn,langstats={level}");
    // Fails only when a logger is already installed; the first one stays.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .format_target(false)
        .try_init()
        .ok();
}
