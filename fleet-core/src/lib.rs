//! Fleet core library: project registry, path utilities, configuration, errors.
//!
//! Public API surface:
//! - [`types`]: newtypes and domain structs
//! - [`error`]: [`RegistryError`]
//! - [`paths`]: nested-path dedup and ignore-pattern exclusion
//! - [`registry`]: project list / ignore list parsing, classification, save
//! - [`config`]: layered [`WorkspaceConfig`]
//! - [`workspace`]: locating the workspace root

pub mod config;
pub mod error;
pub mod paths;
pub mod registry;
pub mod types;
pub mod workspace;

pub use config::WorkspaceConfig;
pub use error::RegistryError;
pub use paths::IgnorePatterns;
pub use registry::Registry;
pub use types::{Classification, Project, ProjectPath};
