//! Project loader trait and its error type.
//!
//! The generator only ever calls [`ProjectLoader::load`]. A loader returns
//! either a [`Project`] or a [`LoadError`]; the generator inspects the error's
//! [`FailureKind`] to pick a log message and then skips the project either way.

use super::project::Project;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("No project configuration file")]
    NoConfigFile,
    #[error("Project configuration not found: {0}")]
    ConfigNotFound(PathBuf),
    #[error("YAML parse error in {0}: {1}")]
    Yaml(PathBuf, #[source] serde_yaml::Error),
    #[error("Project configuration is not a mapping: {0}")]
    NotAMapping(PathBuf),
    #[error("Invalid `{key}` in {path}: {reason}")]
    InvalidField {
        path: PathBuf,
        key: &'static str,
        reason: String,
    },
    #[error("Sample table not found: {0}")]
    SampleTableNotFound(PathBuf),
    #[error("CSV error in {0}: {1}")]
    Csv(PathBuf, #[source] csv::Error),
    #[error("Sample table has no `sample_name` or `sample_id` column: {0}")]
    NoSampleNameColumn(PathBuf),
    #[error("Project metadata is not representable as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the generator should describe a load failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The project's files are missing or malformed.
    Recognized,
    /// Anything else (permissions, broken disk, loader bugs).
    Unexpected,
}

impl LoadError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LoadError::Io(_) => FailureKind::Unexpected,
            LoadError::Csv(_, e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                FailureKind::Unexpected
            }
            _ => FailureKind::Recognized,
        }
    }
}

/// Turns a configuration file reference into a [`Project`].
///
/// `config` is `None` when the tree classifier found no authoritative config
/// for the project. Loaders must fail on `None` rather than produce an empty
/// project.
pub trait ProjectLoader {
    fn load(&self, config: Option<&Path>) -> Result<Project, LoadError>;
}
