//! Shared test utilities for the pephubgen test suite.
//!
//! Provides fixture setup, small filesystem builders, tree extractors, a
//! recording [`Reporter`], and a [`MockLoader`] that stands in for the
//! file-based project loader.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let tree = classify(tmp.path(), &SilentReporter).unwrap();
//! assert_eq!(project_ids(&tree, "ns1"), vec!["projA", "projB"]);
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::Level;

use crate::pep::{FailureKind, LoadError, Project, ProjectLoader, Sample};
use crate::report::Reporter;
use crate::scan::PepTree;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/peps/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/peps");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `content` at `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Every file under `root`, keyed by relative path, with its bytes.
pub fn snapshot_files(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, files);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_path_buf();
                files.insert(rel, std::fs::read(&path).unwrap());
            }
        }
    }
    let mut files = BTreeMap::new();
    walk(root, root, &mut files);
    files
}

// =========================================================================
// Tree extractors
// =========================================================================

/// All namespace names in tree order.
pub fn namespace_names(tree: &PepTree) -> Vec<&str> {
    tree.namespaces().map(|(name, _)| name).collect()
}

/// Project ids of a namespace in tree order. Panics if the namespace is missing.
pub fn project_ids<'a>(tree: &'a PepTree, namespace: &str) -> Vec<&'a str> {
    tree.namespace(namespace)
        .map(|ns| ns.keys().map(String::as_str).collect())
        .unwrap_or_else(|| {
            let names = namespace_names(tree);
            panic!("namespace '{namespace}' not found. Available: {names:?}")
        })
}

/// Sample display names in project order.
pub fn sample_names(project: &Project) -> Vec<&str> {
    project
        .samples
        .iter()
        .map(|s| s.display_name().unwrap_or("<unnamed>"))
        .collect()
}

// =========================================================================
// Project builders
// =========================================================================

/// A project whose samples carry only `sample_name`.
pub fn project_with_samples(names: &[&str]) -> Project {
    project_from_samples(
        names
            .iter()
            .map(|n| serde_json::json!({ "sample_name": n }))
            .collect(),
    )
}

/// A project from raw JSON sample records. Panics on non-object records.
pub fn project_from_samples(records: Vec<serde_json::Value>) -> Project {
    let samples = records
        .into_iter()
        .map(|record| match record {
            serde_json::Value::Object(map) => Sample::new(map),
            other => panic!("sample record must be an object, got {other}"),
        })
        .collect();
    Project {
        name: "test".to_string(),
        description: None,
        pep_version: Some("2.0.0".to_string()),
        sample_table: None,
        config: serde_json::json!({ "pep_version": "2.0.0" }),
        samples,
    }
}

// =========================================================================
// Reporter and loader doubles
// =========================================================================

/// Reporter that keeps every message for later assertions.
#[derive(Default)]
pub struct RecordingReporter {
    messages: RefCell<Vec<(Level, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages.borrow().clone()
    }

    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, level: Level, message: &str) {
        self.messages.borrow_mut().push((level, message.to_string()));
    }
}

/// Loader that serves canned projects and failures by config path and records
/// every call.
#[derive(Default)]
pub struct MockLoader {
    projects: HashMap<PathBuf, Project>,
    failures: HashMap<PathBuf, FailureKind>,
    calls: RefCell<Vec<Option<PathBuf>>>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(mut self, path: &str, project: Project) -> Self {
        self.projects.insert(PathBuf::from(path), project);
        self
    }

    pub fn with_failure(mut self, path: &str, kind: FailureKind) -> Self {
        self.failures.insert(PathBuf::from(path), kind);
        self
    }

    pub fn calls(&self) -> Vec<Option<PathBuf>> {
        self.calls.borrow().clone()
    }
}

impl ProjectLoader for MockLoader {
    fn load(&self, config: Option<&Path>) -> Result<Project, LoadError> {
        self.calls.borrow_mut().push(config.map(Path::to_path_buf));
        let path = config.ok_or(LoadError::NoConfigFile)?;
        match self.failures.get(path) {
            Some(FailureKind::Recognized) => Err(LoadError::ConfigNotFound(path.to_path_buf())),
            Some(FailureKind::Unexpected) => Err(LoadError::Io(std::io::Error::other(
                "mock loader failure",
            ))),
            None => self
                .projects
                .get(path)
                .cloned()
                .ok_or_else(|| LoadError::ConfigNotFound(path.to_path_buf())),
        }
    }
}
