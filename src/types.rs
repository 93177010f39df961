//! Summary artifacts written into the output tree.
//!
//! These are the JSON shapes a client of the static mirror reads. Field names
//! are part of the served contract.

use serde::{Deserialize, Serialize};

/// `<out>/<namespace>/<info>`: every project indexed under the namespace.
///
/// Reflects the classified tree, not load outcomes: a project that fails to
/// load is still listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceInfo {
    pub projects: Vec<String>,
    pub num_projects: usize,
}

impl NamespaceInfo {
    pub fn new(projects: Vec<String>) -> Self {
        let num_projects = projects.len();
        Self {
            projects,
            num_projects,
        }
    }
}

/// `<out>/<namespace>/<project>/samples/<info>`: sample display names in
/// sample-table order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplesInfo {
    pub samples: Vec<String>,
    pub num_samples: usize,
}

impl SamplesInfo {
    pub fn new(samples: Vec<String>) -> Self {
        let num_samples = samples.len();
        Self {
            samples,
            num_samples,
        }
    }
}
