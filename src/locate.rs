//! Configuration file resolution for a single project directory.
//!
//! A project directory names its authoritative configuration file in one of
//! two ways, checked in this order:
//!
//! ```text
//! nfcore/demo/
//! ├── .pephub.yaml          # manifest: `config_file: custom.yaml`
//! ├── custom.yaml           # ← authoritative when declared
//! └── project_config.yaml   # ← used only when there is no manifest
//! ```
//!
//! | `.pephub.yaml` | `config_file` key | `project_config.yaml` | Result |
//! |---|---|---|---|
//! | present | declared | any | the declared value |
//! | present | absent | any | none |
//! | absent | - | present | `project_config.yaml` |
//! | absent | - | absent | none |
//!
//! A manifest without `config_file` is an explicit override: resolution stops
//! there and does not fall through to `project_config.yaml`.

use serde_yaml::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Optional per-project manifest.
pub const MANIFEST_FILE: &str = ".pephub.yaml";
/// Conventional configuration file name used when no manifest exists.
pub const DEFAULT_CONFIG_FILE: &str = "project_config.yaml";

const CONFIG_FILE_KEY: &str = "config_file";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error reading {0}: {1}")]
    Io(PathBuf, #[source] io::Error),
    #[error("YAML parse error in {0}: {1}")]
    Yaml(PathBuf, #[source] serde_yaml::Error),
    #[error("Manifest is not a mapping: {0}")]
    NotAMapping(PathBuf),
    #[error("`config_file` must be a string in {0}")]
    InvalidConfigFile(PathBuf),
}

/// Resolve the authoritative configuration file of a project directory.
///
/// Returns the declared value verbatim (relative to `project_dir` unless
/// absolute), or `None` when the directory has no authoritative config.
/// A manifest that exists but cannot be read as a mapping is an error;
/// the caller decides whether to skip the project.
pub fn resolve_config_file(project_dir: &Path) -> Result<Option<String>, ManifestError> {
    let manifest_path = project_dir.join(MANIFEST_FILE);
    match fs::read_to_string(&manifest_path) {
        Ok(content) => declared_config_file(&manifest_path, &content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if project_dir.join(DEFAULT_CONFIG_FILE).exists() {
                Ok(Some(DEFAULT_CONFIG_FILE.to_string()))
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(ManifestError::Io(manifest_path, e)),
    }
}

/// Read the `config_file` key out of manifest content.
fn declared_config_file(
    manifest_path: &Path,
    content: &str,
) -> Result<Option<String>, ManifestError> {
    if content.trim().is_empty() {
        return Err(ManifestError::NotAMapping(manifest_path.to_path_buf()));
    }
    let value: Value = serde_yaml::from_str(content)
        .map_err(|e| ManifestError::Yaml(manifest_path.to_path_buf(), e))?;
    let Value::Mapping(mapping) = value else {
        return Err(ManifestError::NotAMapping(manifest_path.to_path_buf()));
    };
    match mapping.get(CONFIG_FILE_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(declared)) => Ok(Some(declared.clone())),
        Some(_) => Err(ManifestError::InvalidConfigFile(
            manifest_path.to_path_buf(),
        )),
    }
}
