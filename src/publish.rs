//! # Snapshot Publisher
//!
//! Hands the working snapshot over to the backup repository.
//!
//! ## Design
//!
//! The publisher talks to git through the [`GitOperations`] trait.
//! [`DefaultGitOperations`] wraps the system `git` command (see
//! [`crate::git`]); tests substitute a recording fake.
//!
//! A publish runs these steps:
//!
//! 1.  **Prepare the clone**: clone the backup repository when the target
//!     directory is not a checkout yet, otherwise pull.
//! 2.  **Copy**: every regular file at the top of the working directory is
//!     copied into the clone, overwriting files of the same name.
//!     Subdirectories are not copied.
//! 3.  **Commit**: when `git status` reports nothing, stop. Otherwise stage
//!     everything, commit with [`COMMIT_MESSAGE`] and push.
//!
//! The remote therefore gains at most one commit per run, and only when the
//! content actually changed.

use std::fs;
use std::path::Path;

use log::info;

use crate::error::{io_err, Error, Result};

/// Message of every snapshot commit.
pub const COMMIT_MESSAGE: &str = "commit updates.";

/// Trait for git operations - allows mocking in tests
pub trait GitOperations {
    fn is_checkout(&self, dir: &Path) -> bool;
    fn clone_repo(&self, url: &str, dir: &Path) -> Result<()>;
    fn pull(&self, dir: &Path) -> Result<()>;
    /// Paths whose working-tree state differs from `HEAD`.
    fn changed_paths(&self, dir: &Path) -> Result<Vec<String>>;
    fn stage_all(&self, dir: &Path) -> Result<()>;
    fn commit(&self, dir: &Path, message: &str) -> Result<()>;
    fn push(&self, dir: &Path) -> Result<()>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command.
#[derive(Debug, Clone, Default)]
pub struct DefaultGitOperations {
    author: Option<(String, String)>,
}

impl DefaultGitOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit as `name <email>` instead of the ambient git identity.
    pub fn with_author(mut self, name: &str, email: &str) -> Self {
        self.author = Some((name.to_string(), email.to_string()));
        self
    }
}

impl GitOperations for DefaultGitOperations {
    fn is_checkout(&self, dir: &Path) -> bool {
        crate::git::is_checkout(dir)
    }

    fn clone_repo(&self, url: &str, dir: &Path) -> Result<()> {
        crate::git::clone(url, dir)
    }

    fn pull(&self, dir: &Path) -> Result<()> {
        crate::git::pull(dir)
    }

    fn changed_paths(&self, dir: &Path) -> Result<Vec<String>> {
        crate::git::changed_paths(dir)
    }

    fn stage_all(&self, dir: &Path) -> Result<()> {
        crate::git::stage_all(dir)
    }

    fn commit(&self, dir: &Path, message: &str) -> Result<()> {
        let author = self
            .author
            .as_ref()
            .map(|(name, email)| (name.as_str(), email.as_str()));
        crate::git::commit(dir, message, author)
    }

    fn push(&self, dir: &Path) -> Result<()> {
        crate::git::push(dir)
    }
}

/// What a publish did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The clone already matched the working snapshot.
    Unchanged,
    /// A commit with these changed paths was pushed.
    Committed { changed: Vec<String> },
}

/// Publishes working snapshots to one backup repository.
pub struct SnapshotPublisher {
    git_ops: Box<dyn GitOperations>,
    repo_url: String,
}

impl SnapshotPublisher {
    pub fn new(repo_url: &str) -> Self {
        Self::with_operations(Box::new(DefaultGitOperations::new()), repo_url)
    }

    /// Creates a publisher with a custom `GitOperations` implementation.
    pub fn with_operations(git_ops: Box<dyn GitOperations>, repo_url: &str) -> Self {
        Self {
            git_ops,
            repo_url: repo_url.to_string(),
        }
    }

    /// Clone or pull so that `clone_dir` holds the latest backup.
    pub fn prepare(&self, clone_dir: &Path) -> Result<()> {
        if self.git_ops.is_checkout(clone_dir) {
            info!("git pull: {}", self.repo_url);
            self.git_ops.pull(clone_dir)
        } else {
            info!("git clone: {}", self.repo_url);
            self.git_ops.clone_repo(&self.repo_url, clone_dir)
        }
    }

    /// Publish the files of `work_dir` through the clone at `clone_dir`.
    pub fn publish(&self, work_dir: &Path, clone_dir: &Path) -> Result<PublishOutcome> {
        // a clone would wipe the snapshot before it is copied
        if same_dir(work_dir, clone_dir) {
            return Err(Error::CloneOverWorkDir {
                path: clone_dir.to_path_buf(),
            });
        }
        self.prepare(clone_dir)?;
        copy_files(work_dir, clone_dir)?;
        self.commit_push(clone_dir)
    }

    fn commit_push(&self, clone_dir: &Path) -> Result<PublishOutcome> {
        let changed = self.git_ops.changed_paths(clone_dir)?;
        if changed.is_empty() {
            info!("nothing to commit");
            return Ok(PublishOutcome::Unchanged);
        }

        info!("git add --all");
        self.git_ops.stage_all(clone_dir)?;
        info!("changed files:\n{}", changed.join("\n"));

        info!("git commit -m \"{COMMIT_MESSAGE}\"");
        self.git_ops.commit(clone_dir, COMMIT_MESSAGE)?;

        info!("git push origin");
        self.git_ops.push(clone_dir)?;
        Ok(PublishOutcome::Committed { changed })
    }
}

/// Copy every regular file directly inside `from_dir` into `to_dir`.
///
/// Returns the number of files copied.
pub fn copy_files(from_dir: &Path, to_dir: &Path) -> Result<usize> {
    if same_dir(from_dir, to_dir) {
        return Err(Error::CloneOverWorkDir {
            path: to_dir.to_path_buf(),
        });
    }
    info!("copy data from {} to {}", from_dir.display(), to_dir.display());
    let mut copied = 0;
    for entry in fs::read_dir(from_dir).map_err(|e| io_err(from_dir, e))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let target = to_dir.join(entry.file_name());
        fs::copy(&path, &target).map_err(|e| io_err(&target, e))?;
        copied += 1;
    }
    Ok(copied)
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
