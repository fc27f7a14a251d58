use anyhow::{bail, Context as _};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::{
    path::{Path, PathBuf},
    process::Command,
};

use crate::{config::RunConfig, github::RemoteRepo, trace};

pub const PRIMARY_BRANCH: &str = "main";
pub const REMOTE_NAME: &str = "origin";

const COMMIT_EMAIL: &str = "toolsmith@users.noreply.github.com";
const COMMIT_MESSAGE: &str = "Initial scaffold";

/// A local repository, driven through the `git` executable.
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Runs `git init` in `root`. Re-running it on an already-initialized
    /// directory is a no-op as far as git is concerned.
    ///
    /// # Errors
    ///
    /// This function will return an error if git cannot be spawned or the
    /// init fails.
    pub fn init(root: &Path) -> anyhow::Result<GitRepo> {
        let repo = GitRepo {
            root: root.to_path_buf(),
        };

        repo.run("init", &["init"])?;

        Ok(repo)
    }

    fn run(&self, verb: &str, args: &[&str]) -> anyhow::Result<String> {
        trace!("running git {verb}");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .with_context(|| format!("Failed to spawn git {verb}"))?;

        if !output.status.success() {
            bail!(
                "git {verb} failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Stages everything in the working tree.
    pub fn stage_all(&self) -> anyhow::Result<()> {
        self.run("add", &["add", "-A"]).map(drop)
    }

    /// Relative paths currently staged for commit.
    pub fn staged_files(&self) -> anyhow::Result<Vec<String>> {
        let listing = self.run("diff", &["diff", "--cached", "--name-only"])?;

        Ok(listing.lines().map(str::to_owned).collect())
    }

    /// Commits the staged files as `author` with the fixed placeholder
    /// email. Committing nothing is an error.
    pub fn commit(&self, author: &str) -> anyhow::Result<()> {
        let name = format!("user.name={author}");
        let email = format!("user.email={COMMIT_EMAIL}");

        self.run(
            "commit",
            &["-c", &name, "-c", &email, "commit", "-m", COMMIT_MESSAGE],
        )
        .map(drop)
    }

    fn branch_exists(&self, branch: &str) -> bool {
        Command::new("git")
            .args(["show-ref", "--verify", "--quiet"])
            .arg(format!("refs/heads/{branch}"))
            .current_dir(&self.root)
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Leaves `branch` existing and checked out, whatever name git picked
    /// as its default.
    pub fn ensure_branch(&self, branch: &str) -> anyhow::Result<()> {
        if self.branch_exists(branch) {
            self.run("checkout", &["checkout", branch]).map(drop)
        } else {
            self.run("branch", &["branch", "-M", branch]).map(drop)
        }
    }

    pub fn add_remote(&self, name: &str, url: &str) -> anyhow::Result<()> {
        self.run("remote", &["remote", "add", name, url]).map(drop)
    }

    /// Pushes `branch` to `remote`, authenticating with the token as the
    /// basic-auth username and an empty password. The credential rides in
    /// a one-shot header so it never lands in `.git/config`.
    pub fn push(&self, remote: &str, branch: &str, token: &str) -> anyhow::Result<()> {
        let header = format!(
            "http.extraheader=Authorization: Basic {}",
            basic_credentials(token)
        );

        self.run("push", &["-c", &header, "push", remote, branch])
            .map(drop)
    }
}

/// `<token>:` (token as username, empty password) in basic-auth form.
fn basic_credentials(token: &str) -> String {
    STANDARD.encode(format!("{token}:"))
}

/// The publish sequence against a repository produced by [`GitRepo::init`]:
/// stage, commit, settle the primary branch, wire the remote, push.
///
/// A failure after the remote repository was created leaves that repository
/// behind empty; nothing here deletes it.
///
/// # Errors
///
/// This function will return an error if nothing was staged or any git
/// step fails.
pub fn publish(repo: &GitRepo, config: &RunConfig, remote: &RemoteRepo) -> anyhow::Result<()> {
    repo.stage_all()?;

    let staged = repo.staged_files()?;
    if staged.is_empty() {
        bail!("Nothing to commit: the scaffold produced no files");
    }
    trace!("staged {} files", staged.len());

    repo.commit(&config.author)?;
    repo.ensure_branch(PRIMARY_BRANCH)?;
    repo.add_remote(REMOTE_NAME, &remote.clone_url)?;
    repo.push(REMOTE_NAME, PRIMARY_BRANCH, &config.token)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn token_becomes_the_basic_auth_username() {
        // base64("token:") with the password left empty
        assert_eq!(basic_credentials("token"), "dG9rZW46");
    }

    #[test]
    fn local_round_trip_lands_on_the_primary_branch() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("README.md"), "# scratch").unwrap();

        let repo = GitRepo::init(root).unwrap();

        repo.stage_all().unwrap();
        assert_eq!(repo.staged_files().unwrap(), ["README.md"]);

        repo.commit("Jane").unwrap();
        repo.ensure_branch(PRIMARY_BRANCH).unwrap();

        assert!(repo.branch_exists(PRIMARY_BRANCH));
        repo.add_remote(REMOTE_NAME, "https://github.com/jane/scratch.git")
            .unwrap();
    }

    #[test]
    fn staged_files_is_empty_for_an_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let repo = GitRepo::init(dir.path()).unwrap();

        repo.stage_all().unwrap();
        assert!(repo.staged_files().unwrap().is_empty());
    }
}
