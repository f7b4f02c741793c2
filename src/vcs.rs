use std::path::Path;

use anyhow::{Context, Result, anyhow};
use git2::Repository;

/// Read-only view of a freshly cloned repository.
pub struct VcsContext {
    pub repo: Repository,
}

impl VcsContext {
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::open(path)
            .with_context(|| format!("open git repo: {}", path.display()))?;
        Ok(Self { repo })
    }

    pub fn head_short(&self) -> Result<String> {
        let head = self.repo.head().context("resolve HEAD")?;
        let oid = head
            .target()
            .ok_or_else(|| anyhow!("HEAD has no direct target"))?;
        Ok(format!("{oid:.7}"))
    }
}

/// Abbreviated HEAD of the repository at `path`, if there is one.
pub fn head_of(path: &Path) -> Option<String> {
    match VcsContext::open(path).and_then(|ctx| ctx.head_short()) {
        Ok(head) => Some(head),
        Err(err) => {
            log::debug!("no HEAD for {}: {err:#}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    fn has_git() -> bool {
        Command::new("git").arg("--version").output().is_ok()
    }

    #[test]
    fn plain_directory_has_no_head() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(head_of(dir.path()), None);
    }

    #[test]
    fn committed_repository_reports_short_head() {
        if !has_git() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("Main.java"), "class Main {}\n").unwrap();
        for args in [
            vec!["-c", "init.defaultBranch=main", "init"],
            vec!["add", "."],
            vec![
                "-c",
                "user.name=Test",
                "-c",
                "user.email=test@example.com",
                "commit",
                "-m",
                "initial",
            ],
        ] {
            assert!(
                Command::new("git")
                    .args(&args)
                    .current_dir(root)
                    .status()
                    .unwrap()
                    .success()
            );
        }
        let head = head_of(root).unwrap();
        assert_eq!(head.len(), 7);
        assert!(head.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
