//! Loaded project representation.

use serde::Serialize;
use serde_json::{Map, Value};

/// A loaded project: metadata plus its samples in sample-table order.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub name: String,
    pub description: Option<String>,
    pub pep_version: Option<String>,
    /// Sample table path as written in the config, if any.
    pub sample_table: Option<String>,
    /// The full project config, converted from YAML.
    pub config: Value,
    pub samples: Vec<Sample>,
}

/// Serialized project metadata, written as the project's info file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pep_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_table: Option<String>,
    pub num_samples: usize,
    /// Attribute names across all samples, in first-seen order.
    pub sample_attributes: Vec<String>,
    pub config: Value,
}

impl Project {
    pub fn info(&self) -> ProjectInfo {
        let mut attributes: Vec<String> = Vec::new();
        for sample in &self.samples {
            for key in sample.attributes.keys() {
                if !attributes.contains(key) {
                    attributes.push(key.clone());
                }
            }
        }
        ProjectInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            pep_version: self.pep_version.clone(),
            sample_table: self.sample_table.clone(),
            num_samples: self.samples.len(),
            sample_attributes: attributes,
            config: self.config.clone(),
        }
    }
}

/// One row of a project's sample table, as a flat attribute record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Sample {
    pub attributes: Map<String, Value>,
}

impl Sample {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    /// String attribute by name; empty strings count as absent.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn sample_name(&self) -> Option<&str> {
        self.attr("sample_name")
    }

    pub fn sample_id(&self) -> Option<&str> {
        self.attr("sample_id")
    }

    /// `sample_name` if present, else `sample_id`.
    pub fn display_name(&self) -> Option<&str> {
        self.sample_name().or_else(|| self.sample_id())
    }
}
