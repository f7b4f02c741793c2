use std::env;

use anyhow::{Context, Result};

use crate::chart::{ChartPolicy, QuickChart, save_chart};
use crate::config::Config;
use crate::fetcher::GitCli;
use crate::formatters;
use crate::languages::LanguageTable;
use crate::lister::GhCli;
use crate::pipeline::{CollectOptions, collect};

use super::Args;

pub fn run_with_args(args: &Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    if let Some(ref path) = args.config {
        log::debug!("Loaded config from {}", path.display());
    }

    let current_repo = match args.current_repo {
        Some(ref name) => name.clone(),
        None => current_dir_name()?,
    };
    log::info!("Current repo: {current_repo}");

    let opts = CollectOptions {
        work_dir: args.work_dir.clone(),
        current_repo,
        progress: args.progress,
    };
    let report = collect(&config, &GhCli::default(), &GitCli::default(), &opts)?;
    log::info!(
        "Counted {} files in {} repositories ({} skipped)",
        report.total_files(),
        report.cloned().count(),
        report.skipped_count()
    );
    for repo in report.cloned() {
        log::debug!(
            "  {} @ {}",
            repo.name,
            repo.head.as_deref().unwrap_or("unknown")
        );
    }

    formatters::json::write_report(&args.json_out, &report.languages)?;
    log::info!("Wrote {}", args.json_out.display());

    let table = LanguageTable::from_config(&config);
    println!("{}", formatters::table::format(&report.languages, &table));

    if args.no_chart {
        return Ok(());
    }
    let chart = formatters::chart::payload(&report.languages, &table, &config.chart)?;
    log::trace!("chart payload: {}", formatters::chart::format(&chart)?);
    let policy = if args.write_any_response {
        ChartPolicy::WriteAny
    } else {
        ChartPolicy::RequireSuccess
    };
    let renderer = QuickChart::new(config.chart_endpoint.as_str())?;
    let written = save_chart(&renderer, &chart, policy, &args.png_out)?;
    log::info!("Wrote {} ({written} bytes)", args.png_out.display());
    Ok(())
}

/// Final component of the working directory, used to recognise the
/// repository this tool is run from.
fn current_dir_name() -> Result<String> {
    let cwd = env::current_dir().context("resolve current directory")?;
    Ok(cwd
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default())
}
