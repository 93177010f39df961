//! Static JSON tree generation.
//!
//! Stage 2 of the pephubgen pipeline. Takes the classified [`PepTree`], loads
//! every project, and writes a static tree of JSON files that any plain file
//! server can expose.
//!
//! ## Output Structure
//!
//! ```text
//! out/
//! └── nfcore/
//!     ├── info                     # {"projects": [...], "num_projects": N}
//!     └── demo_rna_pep/
//!         ├── info                 # project metadata (config, counts)
//!         └── samples/
//!             ├── info             # {"samples": [...], "num_samples": N}
//!             ├── frog_1.json      # one flat record per sample
//!             └── frog_2.json
//! ```
//!
//! The `info` name and the `.json` extension come from [`GenerateOptions`].
//!
//! ## Failure Handling
//!
//! The namespace summary lists every indexed project, whether or not it loads.
//! A project that fails to load is reported and skipped; its directory is
//! still created, and every other project is generated as usual. Only
//! filesystem failures abort the run.
//!
//! Existing files under the output root are overwritten, never deleted.

use crate::config::GeneratorConfig;
use crate::naming;
use crate::pep::{FailureKind, LoadError, PepLoader, Project, ProjectLoader};
use crate::report::Reporter;
use crate::scan::PepTree;
use crate::types::{NamespaceInfo, SamplesInfo};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Directory holding a project's per-sample files.
pub const SAMPLES_DIR: &str = "samples";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Naming and verbosity for a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    pub info_file_name: String,
    pub sample_extension: String,
    /// Report every created directory and written summary.
    pub verbose: bool,
}

impl GenerateOptions {
    pub fn from_config(config: &GeneratorConfig, verbose: bool) -> Self {
        Self {
            info_file_name: config.info_file_name.clone(),
            sample_extension: config.sample_extension.clone(),
            verbose,
        }
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default(), false)
    }
}

/// What happened to each namespace and project during a run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GenerateSummary {
    pub namespaces: Vec<NamespaceReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceReport {
    pub name: String,
    pub projects: Vec<ProjectReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectReport {
    pub id: String,
    pub outcome: ProjectOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectOutcome {
    Written {
        samples: usize,
        skipped_samples: usize,
    },
    Skipped {
        kind: FailureKind,
        reason: String,
    },
}

impl GenerateSummary {
    fn projects(&self) -> impl Iterator<Item = &ProjectReport> {
        self.namespaces.iter().flat_map(|ns| ns.projects.iter())
    }

    pub fn projects_written(&self) -> usize {
        self.projects()
            .filter(|p| matches!(p.outcome, ProjectOutcome::Written { .. }))
            .count()
    }

    pub fn projects_skipped(&self) -> usize {
        self.projects()
            .filter(|p| matches!(p.outcome, ProjectOutcome::Skipped { .. }))
            .count()
    }

    pub fn samples_written(&self) -> usize {
        self.projects()
            .map(|p| match p.outcome {
                ProjectOutcome::Written { samples, .. } => samples,
                ProjectOutcome::Skipped { .. } => 0,
            })
            .sum()
    }
}

/// Generate the static tree for `tree` under `output_dir` using [`PepLoader`].
pub fn generate(
    tree: &PepTree,
    output_dir: &Path,
    options: &GenerateOptions,
    reporter: &dyn Reporter,
) -> Result<GenerateSummary, GenerateError> {
    generate_with_loader(&PepLoader, tree, output_dir, options, reporter)
}

/// Generate the static tree using a specific loader (allows testing with mock).
pub fn generate_with_loader(
    loader: &impl ProjectLoader,
    tree: &PepTree,
    output_dir: &Path,
    options: &GenerateOptions,
    reporter: &dyn Reporter,
) -> Result<GenerateSummary, GenerateError> {
    let writer = TreeWriter { options, reporter };
    writer.ensure_dir(output_dir)?;

    let mut summary = GenerateSummary::default();

    for (namespace, projects) in tree.namespaces() {
        let namespace_dir = output_dir.join(namespace);
        writer.ensure_dir(&namespace_dir)?;
        if options.verbose {
            reporter.info(&format!("Writing namespace info for {namespace}"));
        }
        let info = NamespaceInfo::new(projects.keys().cloned().collect());
        writer.write_json(&namespace_dir.join(&options.info_file_name), &info)?;

        let mut namespace_report = NamespaceReport {
            name: namespace.to_string(),
            projects: Vec::new(),
        };

        for (project_id, config) in projects {
            // The namespace summary already occupies this name
            if *project_id == options.info_file_name {
                let reason = format!(
                    "project name collides with the namespace summary file \"{}\"",
                    options.info_file_name
                );
                reporter.warn(&format!(
                    "Skipping pep \"{project_id}\" (in {namespace}): {reason}"
                ));
                namespace_report.projects.push(ProjectReport {
                    id: project_id.clone(),
                    outcome: ProjectOutcome::Skipped {
                        kind: FailureKind::Recognized,
                        reason,
                    },
                });
                continue;
            }

            let project_dir = namespace_dir.join(project_id);
            writer.ensure_dir(&project_dir)?;

            let outcome = match loader.load(config.as_deref()) {
                Ok(project) => writer.write_project(&project, &project_dir, namespace, project_id)?,
                Err(e) => {
                    report_load_failure(reporter, namespace, project_id, &e);
                    ProjectOutcome::Skipped {
                        kind: e.kind(),
                        reason: e.to_string(),
                    }
                }
            };

            namespace_report.projects.push(ProjectReport {
                id: project_id.clone(),
                outcome,
            });
        }

        summary.namespaces.push(namespace_report);
    }

    Ok(summary)
}

fn report_load_failure(reporter: &dyn Reporter, namespace: &str, project_id: &str, error: &LoadError) {
    match error.kind() {
        FailureKind::Recognized => reporter.warn(&format!(
            "Skipping pep \"{project_id}\" (in {namespace}): {error}"
        )),
        FailureKind::Unexpected => reporter.warn(&format!(
            "Unexpected error loading pep \"{project_id}\" (in {namespace}), skipping: {error}"
        )),
    }
}

struct TreeWriter<'a> {
    options: &'a GenerateOptions,
    reporter: &'a dyn Reporter,
}

impl TreeWriter<'_> {
    /// Create `path` and any missing parents; no-op if it exists.
    fn ensure_dir(&self, path: &Path) -> Result<(), GenerateError> {
        if !path.is_dir() {
            if self.options.verbose {
                self.reporter
                    .info(&format!("Generating directory at: {}", path.display()));
            }
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), GenerateError> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Write the project info, the samples summary, and one file per sample.
    fn write_project(
        &self,
        project: &Project,
        project_dir: &Path,
        namespace: &str,
        project_id: &str,
    ) -> Result<ProjectOutcome, GenerateError> {
        if self.options.verbose {
            self.reporter
                .info(&format!("Writing project info for {project_id} ({namespace})"));
        }
        self.write_json(&project_dir.join(&self.options.info_file_name), &project.info())?;

        let samples_dir = project_dir.join(SAMPLES_DIR);
        self.ensure_dir(&samples_dir)?;

        let mut names = Vec::new();
        let mut named_samples = Vec::new();
        let mut seen = HashSet::new();
        let mut skipped_samples = 0;

        for (index, sample) in project.samples.iter().enumerate() {
            let Some(name) = sample.display_name().and_then(naming::safe_file_stem) else {
                self.reporter.warn(&format!(
                    "Skipping sample {} of pep \"{project_id}\" (in {namespace}): \
                     no usable sample_name or sample_id",
                    index + 1
                ));
                skipped_samples += 1;
                continue;
            };
            let file_name = naming::file_name(name, &self.options.sample_extension);
            if file_name == self.options.info_file_name {
                self.reporter.warn(&format!(
                    "Skipping sample \"{name}\" of pep \"{project_id}\" (in {namespace}): \
                     file name collides with the samples summary"
                ));
                skipped_samples += 1;
                continue;
            }
            if !seen.insert(name) {
                self.reporter.warn(&format!(
                    "Duplicate sample \"{name}\" in pep \"{project_id}\" (in {namespace}), \
                     later record wins"
                ));
            }
            names.push(name.to_string());
            named_samples.push((name, sample));
        }

        self.write_json(
            &samples_dir.join(&self.options.info_file_name),
            &SamplesInfo::new(names),
        )?;

        for (name, sample) in &named_samples {
            let file_name = naming::file_name(name, &self.options.sample_extension);
            self.write_json(&samples_dir.join(file_name), sample)?;
        }

        Ok(ProjectOutcome::Written {
            samples: named_samples.len(),
            skipped_samples,
        })
    }
}
