//! CLI output formatting for the scan and build commands.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects. Diagnostics (skipped peps, created
//! directories) go through the logger instead and never appear here.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! demo (2 projects)
//!     custom → demo/custom/pep.yaml
//!     no_config → (no config)
//! ns1 (2 projects)
//!     projA → ns1/projA/project_config.yaml
//!     projB → ns1/projB/project_config.yaml
//!
//! Found 2 namespaces, 4 projects
//! ```
//!
//! ## Build
//!
//! ```text
//! ns1
//!     projA (3 samples)
//!     projB skipped: Sample table not found: ...
//!
//! Generated 1 namespace, 1 project, 3 samples (1 project skipped)
//! ```

use crate::generate::{GenerateSummary, ProjectOutcome};
use crate::scan::PepTree;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 project`, `2 projects`.
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

// ============================================================================
// Scan output
// ============================================================================

/// Format the classified tree: one header per namespace, one line per project
/// naming its config file relative to the data root.
pub fn format_scan_output(tree: &PepTree, data_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    for (name, projects) in tree.namespaces() {
        lines.push(format!("{name} ({})", plural(projects.len(), "project")));
        for (id, config) in projects {
            let target = match config {
                Some(path) => path
                    .strip_prefix(data_root)
                    .unwrap_or(path)
                    .display()
                    .to_string(),
                None => "(no config)".to_string(),
            };
            lines.push(format!("{}{id} \u{2192} {target}", indent(1)));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Found {}, {}",
        plural(tree.num_namespaces(), "namespace"),
        plural(tree.num_projects(), "project")
    ));
    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(tree: &PepTree, data_root: &Path) {
    for line in format_scan_output(tree, data_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format the generation summary: per-project outcome, then a totals line.
pub fn format_generate_output(summary: &GenerateSummary) -> Vec<String> {
    let mut lines = Vec::new();

    for namespace in &summary.namespaces {
        lines.push(namespace.name.clone());
        for project in &namespace.projects {
            let detail = match &project.outcome {
                ProjectOutcome::Written {
                    samples,
                    skipped_samples: 0,
                } => format!("({})", plural(*samples, "sample")),
                ProjectOutcome::Written {
                    samples,
                    skipped_samples,
                } => format!(
                    "({}, {skipped_samples} skipped)",
                    plural(*samples, "sample")
                ),
                ProjectOutcome::Skipped { reason, .. } => format!("skipped: {reason}"),
            };
            lines.push(format!("{}{} {detail}", indent(1), project.id));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    let skipped = summary.projects_skipped();
    let mut total = format!(
        "Generated {}, {}, {}",
        plural(summary.namespaces.len(), "namespace"),
        plural(summary.projects_written(), "project"),
        plural(summary.samples_written(), "sample")
    );
    if skipped > 0 {
        total.push_str(&format!(" ({} skipped)", plural(skipped, "project")));
    }
    lines.push(total);
    lines
}

/// Print build output to stdout.
pub fn print_generate_output(summary: &GenerateSummary) {
    for line in format_generate_output(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
