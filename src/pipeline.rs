use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::aggregate::aggregate;
use crate::config::Config;
use crate::fetcher::{Cloner, Fetcher};
use crate::languages::LanguageTable;
use crate::lister::{RepoSource, list_all};
use crate::traversal::count_extensions;
use crate::types::{ExtensionTally, FetchOutcome, RunReport};

pub struct CollectOptions {
    /// Where clones are placed, one subdirectory per repository.
    pub work_dir: PathBuf,
    /// Name of the repository the tool runs from; never cloned.
    pub current_repo: String,
    pub progress: bool,
}

/// Lists, clones and counts every configured owner's repositories, one at
/// a time, and folds the result into display languages.
///
/// # Errors
/// Fails if the work directory cannot be created or a clone cannot be walked.
/// Listing and clone failures are skips, not errors.
pub fn collect(
    config: &Config,
    source: &dyn RepoSource,
    cloner: &dyn Cloner,
    opts: &CollectOptions,
) -> Result<RunReport> {
    let table = LanguageTable::from_config(config);

    fs::create_dir_all(&opts.work_dir)
        .with_context(|| format!("create work dir: {}", opts.work_dir.display()))?;

    let repos = list_all(source, &config.owners, config.repo_limit);
    log::info!(
        "Found {} repositories across {} owners",
        repos.len(),
        config.owners.len()
    );

    let fetcher = Fetcher::new(
        cloner,
        &opts.work_dir,
        opts.current_repo.as_str(),
        &config.excluded_repos,
    );

    let pb = if opts.progress {
        let pb = ProgressBar::new(repos.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{spinner} {pos}/{len} repos {wide_bar} {msg}") {
            pb.set_style(style.tick_chars("⠁⠃⠇⠋⠙⠸⢰⣠⣄⡆"));
        }
        Some(pb)
    } else {
        None
    };

    let mut outcomes = Vec::with_capacity(repos.len());
    let mut extensions = ExtensionTally::new();
    for repo in &repos {
        if let Some(ref pb) = pb {
            pb.set_message(repo.name.clone());
        }
        let outcome = fetcher.fetch(repo);
        if let FetchOutcome::Cloned(ref cloned) = outcome {
            let counted = count_extensions(&cloned.path, &table, &mut extensions)
                .with_context(|| format!("count files of {}", cloned.name))?;
            log::debug!("{}: {counted} counted files", cloned.name);
        }
        outcomes.push(outcome);
        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    }
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let languages = aggregate(&extensions, &table);
    Ok(RunReport {
        outcomes,
        extensions,
        languages,
    })
}
