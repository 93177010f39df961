//! File-based project loader.
//!
//! Reads a PEP project config (YAML) and its sample table (CSV):
//!
//! ```yaml
//! pep_version: 2.0.0
//! name: frog_project            # optional; defaults to the config's directory name
//! description: Frog RNA-seq
//! sample_table: sample_table.csv  # relative to this file
//! sample_modifiers:
//!   remove: [internal_note]     # dropped from every sample
//!   append:
//!     organism: Xenopus laevis  # added to every sample that lacks it
//! ```
//!
//! Older (1.x) configs that keep the table under `metadata.sample_table` or
//! `metadata.sample_annotation` are accepted too. A config without any sample
//! table loads as a project with no samples.
//!
//! The sample table must have a header row naming a `sample_name` or a
//! `sample_id` column. Cells are trimmed; empty cells are kept as empty strings.

use super::loader::{LoadError, ProjectLoader};
use super::project::{Project, Sample};
use serde_json::{Map, Value as JsonValue};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::io;
use std::path::Path;

const SAMPLE_NAME_COLUMNS: &[&str] = &["sample_name", "sample_id"];

/// Loads projects from YAML configs and CSV sample tables on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct PepLoader;

impl PepLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ProjectLoader for PepLoader {
    fn load(&self, config: Option<&Path>) -> Result<Project, LoadError> {
        let config_path = config.ok_or(LoadError::NoConfigFile)?;
        let yaml = read_config(config_path)?;
        let Value::Mapping(mapping) = &yaml else {
            return Err(LoadError::NotAMapping(config_path.to_path_buf()));
        };

        let base_dir = config_path.parent().unwrap_or(Path::new("."));
        let name = match string_field(mapping, "name", config_path)? {
            Some(name) => name,
            None => base_dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        };
        let description = string_field(mapping, "description", config_path)?;
        let pep_version = string_field(mapping, "pep_version", config_path)?;
        let sample_table = sample_table_field(mapping, config_path)?;

        let mut samples = match &sample_table {
            Some(table) => read_sample_table(&base_dir.join(table))?,
            None => Vec::new(),
        };
        if let Some(modifiers) = mapping.get("sample_modifiers") {
            apply_modifiers(&mut samples, modifiers, config_path)?;
        }

        Ok(Project {
            name,
            description,
            pep_version,
            sample_table,
            config: serde_json::to_value(&yaml)?,
            samples,
        })
    }
}

fn read_config(path: &Path) -> Result<Value, LoadError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(LoadError::ConfigNotFound(path.to_path_buf()));
        }
        // a declared config_file may name a directory
        Err(e) if path.is_dir() => {
            return Err(LoadError::InvalidField {
                path: path.to_path_buf(),
                key: "config_file",
                reason: format!("points at a directory ({e})"),
            });
        }
        Err(e) => return Err(LoadError::Io(e)),
    };
    if content.trim().is_empty() {
        return Err(LoadError::NotAMapping(path.to_path_buf()));
    }
    serde_yaml::from_str(&content).map_err(|e| LoadError::Yaml(path.to_path_buf(), e))
}

/// Scalar field as a string. Numbers are accepted (`pep_version: 2.0`).
fn string_field(
    mapping: &Mapping,
    key: &'static str,
    path: &Path,
) -> Result<Option<String>, LoadError> {
    match mapping.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(LoadError::InvalidField {
            path: path.to_path_buf(),
            key,
            reason: "expected a string".to_string(),
        }),
    }
}

/// `sample_table`, or the 1.x `metadata.sample_table` / `metadata.sample_annotation`.
fn sample_table_field(mapping: &Mapping, path: &Path) -> Result<Option<String>, LoadError> {
    if let Some(table) = string_field(mapping, "sample_table", path)? {
        return Ok(Some(table));
    }
    if let Some(Value::Mapping(metadata)) = mapping.get("metadata") {
        for key in ["sample_table", "sample_annotation"] {
            if let Some(table) = string_field(metadata, key, path)? {
                return Ok(Some(table));
            }
        }
    }
    Ok(None)
}

fn read_sample_table(path: &Path) -> Result<Vec<Sample>, LoadError> {
    if !path.is_file() {
        return Err(LoadError::SampleTableNotFound(path.to_path_buf()));
    }
    let csv_err = |e: csv::Error| LoadError::Csv(path.to_path_buf(), e);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();
    if !headers.iter().any(|h| SAMPLE_NAME_COLUMNS.contains(&h)) {
        return Err(LoadError::NoSampleNameColumn(path.to_path_buf()));
    }

    let mut samples = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let attributes: Map<String, JsonValue> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), JsonValue::String(v.to_string())))
            .collect();
        samples.push(Sample::new(attributes));
    }
    Ok(samples)
}

/// Apply `sample_modifiers.remove` then `sample_modifiers.append`.
fn apply_modifiers(samples: &mut [Sample], modifiers: &Value, path: &Path) -> Result<(), LoadError> {
    let invalid = |key: &'static str, reason: &str| LoadError::InvalidField {
        path: path.to_path_buf(),
        key,
        reason: reason.to_string(),
    };

    let modifiers = match modifiers {
        Value::Null => return Ok(()),
        Value::Mapping(m) => m,
        _ => return Err(invalid("sample_modifiers", "expected a mapping")),
    };

    match modifiers.get("remove") {
        None | Some(Value::Null) => {}
        Some(Value::Sequence(attrs)) => {
            for attr in attrs {
                let attr = attr
                    .as_str()
                    .ok_or_else(|| invalid("remove", "expected a list of attribute names"))?;
                for sample in samples.iter_mut() {
                    sample.attributes.remove(attr);
                }
            }
        }
        Some(_) => return Err(invalid("remove", "expected a list of attribute names")),
    }

    match modifiers.get("append") {
        None | Some(Value::Null) => {}
        Some(Value::Mapping(constants)) => {
            for (key, value) in constants {
                let key = key
                    .as_str()
                    .ok_or_else(|| invalid("append", "attribute names must be strings"))?;
                let value = serde_json::to_value(value)?;
                for sample in samples.iter_mut() {
                    if sample.attr(key).is_none() {
                        sample.attributes.insert(key.to_string(), value.clone());
                    }
                }
            }
        }
        Some(_) => return Err(invalid("append", "expected a mapping")),
    }

    Ok(())
}
