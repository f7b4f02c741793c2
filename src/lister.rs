use std::ffi::OsString;
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

use crate::types::RepoRef;

#[derive(Debug, Error)]
pub enum ListError {
    #[error("could not run repository listing for {owner}: {source}")]
    Spawn {
        owner: String,
        #[source]
        source: std::io::Error,
    },
    #[error("repository listing for {owner} exited with {status}: {stderr}")]
    Failed {
        owner: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("repository listing for {owner} is not valid JSON: {source}")]
    Parse {
        owner: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Produces the repositories of one owner.
pub trait RepoSource {
    /// # Errors
    /// Returns a [`ListError`] when the owner's repositories cannot be obtained.
    fn list(&self, owner: &str, limit: u32) -> Result<Vec<RepoRef>, ListError>;
}

/// Lists repositories through the GitHub CLI, which brings its own credentials.
pub struct GhCli {
    program: OsString,
}

impl Default for GhCli {
    fn default() -> Self {
        Self {
            program: OsString::from("gh"),
        }
    }
}

impl GhCli {
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl RepoSource for GhCli {
    fn list(&self, owner: &str, limit: u32) -> Result<Vec<RepoRef>, ListError> {
        let limit = limit.to_string();
        log::debug!("gh repo list {owner} --json name,sshUrl --limit {limit}");
        let output = Command::new(&self.program)
            .args(["repo", "list", owner, "--json", "name,sshUrl", "--limit", limit.as_str()])
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ListError::Spawn {
                owner: owner.to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(ListError::Failed {
                owner: owner.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        parse_repo_list(owner, &output.stdout)
    }
}

/// Decodes the JSON array printed by `gh repo list --json name,sshUrl`.
///
/// # Errors
/// Returns [`ListError::Parse`] if `raw` is not an array of `{name, sshUrl}` objects.
pub fn parse_repo_list(owner: &str, raw: &[u8]) -> Result<Vec<RepoRef>, ListError> {
    serde_json::from_slice(raw).map_err(|source| ListError::Parse {
        owner: owner.to_string(),
        source,
    })
}

/// Lists every owner in order. An owner whose listing fails is logged and
/// contributes nothing; the remaining owners are still listed.
pub fn list_all(source: &dyn RepoSource, owners: &[String], limit: u32) -> Vec<RepoRef> {
    let mut repos = Vec::new();
    for owner in owners {
        match source.list(owner, limit) {
            Ok(found) => {
                log::info!("{owner}: {} repositories", found.len());
                repos.extend(found);
            }
            Err(err) => log::warn!("Skipping owner {owner}: {err}"),
        }
    }
    repos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_gh_output_in_order() {
        let raw = br#"[
            {"name":"alpha","sshUrl":"git@github.com:me/alpha.git"},
            {"name":"beta","sshUrl":"git@github.com:me/beta.git"}
        ]"#;
        let repos = parse_repo_list("me", raw).unwrap();
        assert_eq!(
            repos,
            vec![
                RepoRef::new("alpha", "git@github.com:me/alpha.git"),
                RepoRef::new("beta", "git@github.com:me/beta.git"),
            ]
        );
    }

    #[test]
    fn escaped_quotes_and_braces_survive() {
        let raw = br#"[{"name":"we\"ird{name}","sshUrl":"git@github.com:me/x\"y.git"}]"#;
        let repos = parse_repo_list("me", raw).unwrap();
        assert_eq!(repos[0].name, "we\"ird{name}");
        assert_eq!(repos[0].clone_url, "git@github.com:me/x\"y.git");
    }

    #[test]
    fn empty_listing_is_not_an_error() {
        assert!(parse_repo_list("me", b"[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_listing_is_a_parse_error() {
        let err = parse_repo_list("me", b"HTTP 401: Bad credentials").unwrap_err();
        assert!(matches!(err, ListError::Parse { ref owner, .. } if owner == "me"));
        let err = parse_repo_list("me", br#"[{"name":"a"}]"#).unwrap_err();
        assert!(matches!(err, ListError::Parse { .. }));
    }

    struct FlakySource;

    impl RepoSource for FlakySource {
        fn list(&self, owner: &str, limit: u32) -> Result<Vec<RepoRef>, ListError> {
            assert_eq!(limit, 200);
            match owner {
                "broken" => parse_repo_list(owner, b"not json"),
                _ => Ok(vec![RepoRef::new(
                    format!("{owner}-repo"),
                    format!("git@github.com:{owner}/{owner}-repo.git"),
                )]),
            }
        }
    }

    #[test]
    fn failing_owner_is_skipped() {
        let owners = vec!["first".to_string(), "broken".to_string(), "last".to_string()];
        let repos = list_all(&FlakySource, &owners, 200);
        let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first-repo", "last-repo"]);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let gh = GhCli::with_program("definitely-not-a-real-gh-binary");
        let err = gh.list("me", 1).unwrap_err();
        assert!(matches!(err, ListError::Spawn { .. }));
    }
}
