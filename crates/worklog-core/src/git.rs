//! Git operations used by the sync engine.
//!
//! [`VersionControl`] is the seam the sync engine talks to; [`GitCli`] shells
//! out to the `git` binary with `-C <dir>`.

use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Version-control operations needed to publish the export directory.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Whether `dir` is inside a working copy.
    async fn is_repository(&self, dir: &Path) -> Result<bool>;

    async fn init(&self, dir: &Path) -> Result<()>;

    async fn add_remote(&self, dir: &Path, name: &str, url: &str) -> Result<()>;

    /// Porcelain status lines; empty when the working copy is clean.
    async fn status(&self, dir: &Path) -> Result<Vec<String>>;

    /// Stage every change, including deletions and untracked files.
    async fn add_all(&self, dir: &Path) -> Result<()>;

    async fn commit(&self, dir: &Path, message: &str) -> Result<()>;

    /// `pull --rebase` from the tracked upstream.
    async fn pull_rebase(&self, dir: &Path) -> Result<()>;

    async fn push(&self, dir: &Path) -> Result<()>;

    /// Push the current branch to `remote`, establishing upstream tracking.
    async fn push_set_upstream(&self, dir: &Path, remote: &str) -> Result<()>;

    async fn clone_repo(&self, url: &str, dir: &Path) -> Result<()>;
}

/// [`VersionControl`] backed by the `git` command line.
#[derive(Debug, Clone, Default)]
pub struct GitCli;

impl GitCli {
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, dir: &Path, args: &[&str]) -> Result<Output> {
        let output = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => Error::GitNotFound,
                _ => Error::Io(e),
            })?;
        Ok(output)
    }

    /// Run a git command and fail with its stderr on a non-zero exit.
    async fn run_checked(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let output = self.run(dir, args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::command_failed(format!("git {}", args.join(" ")), stderr));
        }
        debug!(dir = ?dir, "git {}", args.join(" "));
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn is_repository(&self, dir: &Path) -> Result<bool> {
        let output = self.run(dir, &["rev-parse", "--git-dir"]).await?;
        Ok(output.status.success())
    }

    async fn init(&self, dir: &Path) -> Result<()> {
        self.run_checked(dir, &["init"]).await.map(drop)
    }

    async fn add_remote(&self, dir: &Path, name: &str, url: &str) -> Result<()> {
        self.run_checked(dir, &["remote", "add", name, url])
            .await
            .map(drop)
    }

    async fn status(&self, dir: &Path) -> Result<Vec<String>> {
        let stdout = self.run_checked(dir, &["status", "--porcelain"]).await?;
        Ok(parse_porcelain(&stdout))
    }

    async fn add_all(&self, dir: &Path) -> Result<()> {
        self.run_checked(dir, &["add", "-A"]).await.map(drop)
    }

    async fn commit(&self, dir: &Path, message: &str) -> Result<()> {
        self.run_checked(dir, &["commit", "-m", message])
            .await
            .map(drop)
    }

    async fn pull_rebase(&self, dir: &Path) -> Result<()> {
        self.run_checked(dir, &["pull", "--rebase"]).await.map(drop)
    }

    async fn push(&self, dir: &Path) -> Result<()> {
        self.run_checked(dir, &["push"]).await.map(drop)
    }

    async fn push_set_upstream(&self, dir: &Path, remote: &str) -> Result<()> {
        self.run_checked(dir, &["push", "--set-upstream", remote, "HEAD"])
            .await
            .map(drop)
    }

    async fn clone_repo(&self, url: &str, dir: &Path) -> Result<()> {
        let parent = dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let target = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Error::Other(format!("Invalid clone target: {}", dir.display())))?;
        self.run_checked(parent, &["clone", url, &target])
            .await
            .map(drop)
    }
}

/// Non-empty lines of `git status --porcelain` output.
pub fn parse_porcelain(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_porcelain() {
        let out = " M 2024-01-15.md\n?? 2024-01-16.md\n\n";
        assert_eq!(
            parse_porcelain(out),
            vec![" M 2024-01-15.md".to_string(), "?? 2024-01-16.md".to_string()]
        );
        assert!(parse_porcelain("").is_empty());
    }

    #[tokio::test]
    async fn test_plain_directory_is_not_a_repository() {
        let temp = tempdir().expect("Failed to create temp dir");
        let git = GitCli::new();
        // Either git is missing or the directory is not a repository.
        match git.is_repository(temp.path()).await {
            Ok(is_repo) => assert!(!is_repo),
            Err(e) => assert!(matches!(e, Error::GitNotFound)),
        }
    }
}
