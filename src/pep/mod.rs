//! Project loading: configuration file → structured project.
//!
//! The module is split into:
//! - **Project**: [`Project`] and [`Sample`], the loaded representation, plus
//!   [`ProjectInfo`], its serialized metadata
//! - **Loader**: [`ProjectLoader`] trait + [`LoadError`], the boundary the
//!   generator talks to
//! - **File loader**: [`PepLoader`], which reads a YAML project config and its
//!   CSV sample table from disk

pub mod file_loader;
pub mod loader;
pub mod project;

pub use file_loader::PepLoader;
pub use loader::{FailureKind, LoadError, ProjectLoader};
pub use project::{Project, ProjectInfo, Sample};
