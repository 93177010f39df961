//! Retrieval of the PEP data repository.
//!
//! The source is either a local directory, read in place, or anything `git`
//! can clone (URL, `file://` path, ssh remote). Clones are shallow and land in
//! a `data/` directory under the caller's staging directory, which the CLI
//! keeps in a temp dir for the length of the run.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Directory under the staging dir that receives the clone.
const CLONE_DIR: &str = "data";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to run git: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error fetching data from {url}: {stderr}")]
    Clone { url: String, stderr: String },
}

/// Where the staging tree comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Local(PathBuf),
    Remote(String),
}

impl Source {
    /// Existing directories are local; everything else is handed to git.
    pub fn parse(source: &str) -> Self {
        let path = Path::new(source);
        if path.is_dir() {
            Source::Local(path.to_path_buf())
        } else {
            Source::Remote(source.to_string())
        }
    }
}

/// Make the source tree available locally and return its root.
pub fn fetch(source: &str, staging: &Path) -> Result<PathBuf, FetchError> {
    match Source::parse(source) {
        Source::Local(path) => Ok(path),
        Source::Remote(url) => {
            let target = staging.join(CLONE_DIR);
            clone(&url, &target)?;
            Ok(target)
        }
    }
}

fn clone(url: &str, target: &Path) -> Result<(), FetchError> {
    let output = Command::new("git")
        .args(["clone", "--depth", "1", "--quiet", url])
        .arg(target)
        .output()?;
    if !output.status.success() {
        return Err(FetchError::Clone {
            url: url.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn existing_directory_is_local() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().to_string_lossy().to_string();
        assert_eq!(Source::parse(&source), Source::Local(tmp.path().to_path_buf()));
    }

    #[test]
    fn url_is_remote() {
        assert_eq!(
            Source::parse("https://github.com/pepkit/data.pephub.git"),
            Source::Remote("https://github.com/pepkit/data.pephub.git".to_string())
        );
    }

    #[test]
    fn local_source_used_in_place() {
        let data = TempDir::new().unwrap();
        let staging = TempDir::new().unwrap();

        let root = fetch(&data.path().to_string_lossy(), staging.path()).unwrap();

        assert_eq!(root, data.path());
        assert!(!staging.path().join(CLONE_DIR).exists());
    }

    #[test]
    fn unreachable_source_is_clone_error() {
        let staging = TempDir::new().unwrap();
        let missing = staging.path().join("no-such-repo");

        let result = fetch(&missing.to_string_lossy(), staging.path());
        match result {
            Err(FetchError::Clone { url, stderr }) => {
                assert_eq!(url, missing.to_string_lossy());
                assert!(!stderr.is_empty());
            }
            other => panic!("expected a clone error, got {other:?}"),
        }
    }

    /// Run git in `dir` with a throwaway identity.
    fn git(dir: &Path, args: &[&str]) {
        let output = Command::new("git")
            .args(["-c", "user.name=pephubgen", "-c", "user.email=pephubgen@localhost"])
            .args(["-c", "commit.gpgsign=false"])
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    #[test]
    fn remote_source_is_cloned_into_staging() {
        let repo = TempDir::new().unwrap();
        std::fs::create_dir_all(repo.path().join("ns1/projA")).unwrap();
        std::fs::write(
            repo.path().join("ns1/projA/project_config.yaml"),
            "pep_version: 2.0.0\n",
        )
        .unwrap();
        git(repo.path(), &["init", "--quiet"]);
        git(repo.path(), &["add", "."]);
        git(repo.path(), &["commit", "--quiet", "-m", "seed"]);
        let staging = TempDir::new().unwrap();

        let url = format!("file://{}", repo.path().display());
        let root = fetch(&url, staging.path()).unwrap();

        assert_eq!(root, staging.path().join(CLONE_DIR));
        assert!(root.join("ns1/projA/project_config.yaml").is_file());
        assert!(root.join(".git").is_dir());
    }
}
