//! Staging tree classification.
//!
//! Stage 1 of the pephubgen pipeline. Walks a local checkout of a PEP data
//! repository and builds an in-memory index of namespaces, their projects, and
//! each project's authoritative configuration file.
//!
//! ## Directory Structure
//!
//! ```text
//! data/                            # Staging root
//! ├── .git/                        # Hidden: ignored
//! ├── README.md                    # File: ignored
//! ├── nfcore/                      # Namespace
//! │   ├── demo_rna_pep/            # Project
//! │   │   ├── project_config.yaml  # Authoritative config (no manifest)
//! │   │   └── sample_table.csv
//! │   └── custom/                  # Project
//! │       ├── .pephub.yaml         # Manifest: `config_file: pep.yaml`
//! │       └── pep.yaml
//! └── geo/
//!     └── GSE1234/                 # Project with no config: indexed as None
//! ```
//!
//! Only two levels are read. Anything deeper belongs to the project and is
//! interpreted by the project loader.
//!
//! ## Rules
//!
//! - A namespace is a directory directly under the root whose name does not
//!   start with `.`.
//! - A project is a directory directly under a namespace, same rule.
//! - Every project is indexed, resolvable or not. A project whose manifest is
//!   broken is reported and indexed without a config, so it still shows up in
//!   its namespace summary and fails at load time.

use crate::locate::{self, ManifestError};
use crate::naming;
use crate::report::Reporter;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("PEP data path not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Projects of one namespace: project id → authoritative config path.
pub type Namespace = BTreeMap<String, Option<PathBuf>>;

/// Index of the staging tree: namespace → project id → config path.
///
/// Ordered by name so every consumer (summaries, CLI output) sees the same
/// order on every run.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PepTree {
    namespaces: BTreeMap<String, Namespace>,
}

impl PepTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a project entry, creating its namespace as needed.
    pub fn insert(&mut self, namespace: &str, project: &str, config: Option<PathBuf>) {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(project.to_string(), config);
    }

    /// Add an empty namespace.
    pub fn insert_namespace(&mut self, namespace: &str) {
        self.namespaces.entry(namespace.to_string()).or_default();
    }

    pub fn namespaces(&self) -> impl Iterator<Item = (&str, &Namespace)> {
        self.namespaces.iter().map(|(name, ns)| (name.as_str(), ns))
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.get(name)
    }

    pub fn config_path(&self, namespace: &str, project: &str) -> Option<&Path> {
        self.namespaces
            .get(namespace)
            .and_then(|ns| ns.get(project))
            .and_then(|p| p.as_deref())
    }

    pub fn num_namespaces(&self) -> usize {
        self.namespaces.len()
    }

    pub fn num_projects(&self) -> usize {
        self.namespaces.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

/// Classify the staging tree at `root` into namespaces and projects.
pub fn classify(root: &Path, reporter: &dyn Reporter) -> Result<PepTree, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }

    let mut tree = PepTree::new();

    for (namespace, namespace_dir) in collect_dirs(root, reporter)? {
        tree.insert_namespace(&namespace);

        for (project, project_dir) in collect_dirs(&namespace_dir, reporter)? {
            let config = match locate::resolve_config_file(&project_dir) {
                Ok(declared) => declared.map(|file| project_dir.join(file)),
                Err(e) => {
                    report_manifest_error(reporter, &namespace, &project, &e);
                    None
                }
            };
            tree.insert(&namespace, &project, config);
        }
    }

    Ok(tree)
}

/// Non-hidden subdirectories of `path`, sorted by name.
fn collect_dirs(path: &Path, reporter: &dyn Reporter) -> Result<Vec<(String, PathBuf)>, ScanError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        if !entry_path.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            reporter.warn(&format!(
                "Skipping non UTF-8 directory name: {}",
                entry_path.display()
            ));
            continue;
        };
        if naming::is_hidden(&name) {
            continue;
        }
        dirs.push((name, entry_path));
    }
    dirs.sort();
    Ok(dirs)
}

fn report_manifest_error(
    reporter: &dyn Reporter,
    namespace: &str,
    project: &str,
    error: &ManifestError,
) {
    reporter.warn(&format!(
        "Unreadable manifest for pep \"{project}\" (in {namespace}): {error}"
    ));
}
