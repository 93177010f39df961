//! # pephubgen
//!
//! Generates a static, read-only JSON mirror of a PEP data repository. The
//! repository is a two-level tree: namespace directories holding project
//! directories, each project described by a PEP configuration file and a
//! sample table. The output is a directory tree of JSON files any plain file
//! server can expose as an HTTP API.
//!
//! # Pipeline
//!
//! ```text
//! 1. Fetch     source     →  data root      (local dir in place, or git clone)
//! 2. Scan      data root  →  PepTree        (namespace → project → config path)
//! 3. Generate  PepTree    →  out/           (namespace, project and sample JSON)
//! ```
//!
//! The stages are independent: [`scan::classify`] only touches the filesystem
//! to list directories and read `.pephub.yaml` manifests, and
//! [`generate::generate_with_loader`] takes the project loader as a parameter
//! so tests drive it with canned projects.
//!
//! # Output Layout
//!
//! ```text
//! out/
//! └── <namespace>/
//!     ├── info                       {"projects": [...], "num_projects": N}
//!     └── <project>/
//!         ├── info                   project metadata object
//!         └── samples/
//!             ├── info               {"samples": [...], "num_samples": N}
//!             └── <sample>.json      one sample record
//! ```
//!
//! Namespaces and projects whose names start with `.` are never indexed. A
//! project that fails to load keeps an empty directory and stays listed in
//! its namespace info so clients see it exists.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`fetch`] | Makes the data repository available locally (in place or shallow clone) |
//! | [`scan`] | Classifies the data root into a [`scan::PepTree`] |
//! | [`locate`] | Resolves a project's config file, honoring `.pephub.yaml` |
//! | [`pep`] | Project model and the [`pep::ProjectLoader`] seam with its YAML + CSV implementation |
//! | [`generate`] | Writes the JSON tree and reports per-project outcomes |
//! | [`serve`] | Plain static file server for previewing the output |
//! | [`config`] | `pephubgen.toml` loading layered over stock defaults |
//! | [`types`] | JSON shapes of the summary files |
//! | [`naming`] | Hidden-entry rule and safe output file names |
//! | [`report`] | Injected diagnostics sink wired to `tracing` in the binary |
//! | [`output`] | CLI output formatting |

pub mod config;
pub mod fetch;
pub mod generate;
pub mod locate;
pub mod naming;
pub mod output;
pub mod pep;
pub mod report;
pub mod scan;
pub mod serve;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
