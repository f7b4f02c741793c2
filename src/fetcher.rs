use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

use crate::types::{ClonedRepo, FetchOutcome, RepoRef, SkipReason};
use crate::vcs;

const SSH_PREFIX: &str = "git@github.com:";
const HTTPS_PREFIX: &str = "https://github.com/";

#[derive(Debug, Error)]
pub enum CloneFailure {
    #[error("could not run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("git clone exited with {status}: {stderr}")]
    Exit { status: ExitStatus, stderr: String },
}

/// Materializes a repository at `dest`.
pub trait Cloner {
    /// # Errors
    /// Returns a [`CloneFailure`] if the clone command could not run or failed.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), CloneFailure>;
}

/// Shallow, recursive clone through the installed `git`.
pub struct GitCli {
    program: OsString,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: OsString::from("git"),
        }
    }
}

impl GitCli {
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Cloner for GitCli {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), CloneFailure> {
        let output = Command::new(&self.program)
            .args(["clone", "--depth", "1", "--recursive", url])
            .arg(dest)
            .stdin(Stdio::null())
            .output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(CloneFailure::Exit {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// `git@github.com:owner/repo.git` becomes `https://github.com/owner/repo.git`;
/// anything else is returned unchanged.
pub fn https_clone_url(url: &str) -> String {
    match url.strip_prefix(SSH_PREFIX) {
        Some(rest) => format!("{HTTPS_PREFIX}{rest}"),
        None => url.to_string(),
    }
}

pub struct Fetcher<'a> {
    cloner: &'a dyn Cloner,
    work_dir: PathBuf,
    current_repo: String,
    excluded: HashSet<String>,
}

impl<'a> Fetcher<'a> {
    pub fn new(
        cloner: &'a dyn Cloner,
        work_dir: impl Into<PathBuf>,
        current_repo: impl Into<String>,
        excluded: &[String],
    ) -> Self {
        Self {
            cloner,
            work_dir: work_dir.into(),
            current_repo: current_repo.into(),
            excluded: excluded.iter().cloned().collect(),
        }
    }

    pub fn target_dir(&self, name: &str) -> PathBuf {
        self.work_dir.join(name)
    }

    /// Clones one repository unless it is the current or an excluded one.
    ///
    /// The target directory existing afterwards is what counts as success,
    /// so a clone left over from an earlier run is reused.
    pub fn fetch(&self, repo: &RepoRef) -> FetchOutcome {
        let skip = |reason: SkipReason| {
            log::info!("Skipping {} ({reason})", repo.name);
            FetchOutcome::Skipped {
                name: repo.name.clone(),
                reason,
            }
        };

        if repo.name == self.current_repo {
            return skip(SkipReason::CurrentRepo);
        }
        if self.excluded.contains(&repo.name) {
            return skip(SkipReason::Excluded);
        }

        let url = https_clone_url(&repo.clone_url);
        let dest = self.target_dir(&repo.name);
        log::debug!("git clone --depth 1 --recursive {url} {}", dest.display());
        let result = self.cloner.clone_repo(&url, &dest);

        if !dest.exists() {
            let detail = match result {
                Err(err) => err.to_string(),
                Ok(()) => format!("{} was not created", dest.display()),
            };
            log::debug!("{}: {detail}", repo.name);
            return skip(SkipReason::CloneFailed(detail));
        }
        if let Err(err) = result {
            log::debug!("{}: {err}; using existing {}", repo.name, dest.display());
        }

        let head = vcs::head_of(&dest);
        log::info!(
            "Cloned {} @ {}",
            repo.name,
            head.as_deref().unwrap_or("unknown")
        );
        FetchOutcome::Cloned(ClonedRepo {
            name: repo.name.clone(),
            path: dest,
            head,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;

    #[derive(Default)]
    struct RecordingCloner {
        calls: RefCell<Vec<(String, PathBuf)>>,
        fail: HashSet<String>,
    }

    impl Cloner for RecordingCloner {
        fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), CloneFailure> {
            self.calls
                .borrow_mut()
                .push((url.to_string(), dest.to_path_buf()));
            if self.fail.iter().any(|f| url.ends_with(f.as_str())) {
                return Err(CloneFailure::Spawn(std::io::Error::other("network down")));
            }
            fs::create_dir_all(dest).map_err(CloneFailure::Spawn)
        }
    }

    #[test]
    fn ssh_urls_are_rewritten_to_https() {
        assert_eq!(
            https_clone_url("git@github.com:naibaf-1/HexPatch.git"),
            "https://github.com/naibaf-1/HexPatch.git"
        );
        assert_eq!(
            https_clone_url("https://example.org/x.git"),
            "https://example.org/x.git"
        );
    }

    #[test]
    fn current_and_excluded_repos_are_never_cloned() {
        let dir = tempfile::tempdir().unwrap();
        let cloner = RecordingCloner::default();
        let fetcher = Fetcher::new(&cloner, dir.path(), "self", &["skipme".to_string()]);

        let me = fetcher.fetch(&RepoRef::new("self", "git@github.com:o/self.git"));
        let ex = fetcher.fetch(&RepoRef::new("skipme", "git@github.com:o/skipme.git"));
        assert_eq!(
            me,
            FetchOutcome::Skipped {
                name: "self".to_string(),
                reason: SkipReason::CurrentRepo
            }
        );
        assert_eq!(
            ex,
            FetchOutcome::Skipped {
                name: "skipme".to_string(),
                reason: SkipReason::Excluded
            }
        );
        assert!(cloner.calls.borrow().is_empty());
        assert!(!dir.path().join("self").exists());
        assert!(!dir.path().join("skipme").exists());
    }

    #[test]
    fn clone_goes_into_named_directory_over_https() {
        let dir = tempfile::tempdir().unwrap();
        let cloner = RecordingCloner::default();
        let fetcher = Fetcher::new(&cloner, dir.path(), "self", &[]);

        let outcome = fetcher.fetch(&RepoRef::new("B", "git@github.com:o/B.git"));
        let FetchOutcome::Cloned(repo) = outcome else {
            panic!("expected a clone, got {outcome:?}");
        };
        assert_eq!(repo.path, dir.path().join("B"));
        assert_eq!(repo.head, None);
        assert_eq!(
            cloner.calls.borrow()[0],
            ("https://github.com/o/B.git".to_string(), dir.path().join("B"))
        );
    }

    #[test]
    fn missing_directory_after_clone_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let cloner = RecordingCloner {
            fail: ["gone.git".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let fetcher = Fetcher::new(&cloner, dir.path(), "self", &[]);

        let outcome = fetcher.fetch(&RepoRef::new("gone", "git@github.com:o/gone.git"));
        match outcome {
            FetchOutcome::Skipped {
                reason: SkipReason::CloneFailed(detail),
                ..
            } => assert!(detail.contains("network down")),
            other => panic!("expected clone failure, got {other:?}"),
        }
    }

    #[test]
    fn existing_directory_is_reused_when_clone_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("gone")).unwrap();
        let cloner = RecordingCloner {
            fail: ["gone.git".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let fetcher = Fetcher::new(&cloner, dir.path(), "self", &[]);
        let outcome = fetcher.fetch(&RepoRef::new("gone", "git@github.com:o/gone.git"));
        assert!(matches!(outcome, FetchOutcome::Cloned(_)));
    }

    #[test]
    fn git_cli_failure_leaves_no_directory() {
        let dir = tempfile::tempdir().unwrap();
        let git = GitCli::with_program("definitely-not-a-real-git-binary");
        let fetcher = Fetcher::new(&git, dir.path(), "self", &[]);
        let outcome = fetcher.fetch(&RepoRef::new("x", "git@github.com:o/x.git"));
        assert!(matches!(
            outcome,
            FetchOutcome::Skipped {
                reason: SkipReason::CloneFailed(_),
                ..
            }
        ));
    }
}
