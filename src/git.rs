//! Thin wrappers around the system `git` command.
//!
//! Using the system binary means SSH keys, credential helpers and personal
//! access tokens configured for the user work without extra setup.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use crate::error::{Error, Result};

/// Run `git <args>` inside `dir` and return its stdout.
fn run(dir: &Path, args: &[&str]) -> Result<String> {
    let output: Output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            dir: dir.to_path_buf(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command: args.join(" "),
            dir: dir.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Whether `dir` is the top level of a git working tree.
pub fn is_checkout(dir: &Path) -> bool {
    dir.join(".git").exists()
        && run(dir, &["rev-parse", "--is-inside-work-tree"])
            .map(|out| out.trim() == "true")
            .unwrap_or(false)
}

/// Clone `url` into `target_dir`, replacing anything already there.
pub fn clone(url: &str, target_dir: &Path) -> Result<()> {
    // git refuses to clone into an existing non-empty directory
    if target_dir.exists() {
        fs::remove_dir_all(target_dir)?;
    }
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let output = Command::new("git")
        .arg("clone")
        .arg(url)
        .arg(target_dir)
        .output()
        .map_err(|e| Error::GitClone {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        let message = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            format!(
                "Authentication failed. Make sure the backup repository is writable.\n\
                Error: {}",
                stderr.trim()
            )
        } else {
            stderr.trim().to_string()
        };

        return Err(Error::GitClone {
            url: url.to_string(),
            message,
        });
    }

    Ok(())
}

/// Fast-forward the checkout to its upstream branch.
pub fn pull(dir: &Path) -> Result<()> {
    run(dir, &["pull", "--ff-only"]).map(|_| ())
}

/// Paths that differ from `HEAD`, untracked files included.
pub fn changed_paths(dir: &Path) -> Result<Vec<String>> {
    let out = run(dir, &["status", "--porcelain", "--untracked-files=all"])?;
    Ok(parse_porcelain(&out))
}

/// Stage every change in the working tree.
pub fn stage_all(dir: &Path) -> Result<()> {
    run(dir, &["add", "--all"]).map(|_| ())
}

/// Commit staged changes, optionally as a fixed author.
pub fn commit(dir: &Path, message: &str, author: Option<(&str, &str)>) -> Result<()> {
    let mut args: Vec<String> = Vec::new();
    if let Some((name, email)) = author {
        args.extend([
            "-c".to_string(),
            format!("user.name={name}"),
            "-c".to_string(),
            format!("user.email={email}"),
        ]);
    }
    args.extend(["commit".to_string(), "-m".to_string(), message.to_string()]);

    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    run(dir, &args).map(|_| ())
}

/// Push the current branch to `origin`.
pub fn push(dir: &Path) -> Result<()> {
    run(dir, &["push", "origin", "HEAD"]).map(|_| ())
}

/// Extract the paths from `git status --porcelain` (v1) output.
pub fn parse_porcelain(out: &str) -> Vec<String> {
    out.lines()
        .filter(|line| line.len() > 3)
        .map(|line| {
            let path = &line[3..];
            // Renames are reported as "old -> new"
            let path = path.rsplit(" -> ").next().unwrap_or(path);
            path.trim_matches('"').to_string()
        })
        .collect()
}
