//! Source discovery: find files to scan and who owns them.
//!
//! This module handles the first stage of the pipeline - discovering what
//! files to scan. It provides:
//!
//! - **File filtering**: Include/exclude files with glob patterns
//! - **Project discovery**: Map files to the project manifests above them
//! - **Repository info**: Git root, commit and GitHub slug for source links
//!
//! ## Example
//!
//! ```rust,ignore
//! use todoscanlib::source::{FilterConfig, ProjectMap};
//!
//! let projects = ProjectMap::discover(".", &["*.csproj"])?;
//! let filter = FilterConfig::new()
//!     .exclude("**/generated/**")?;
//! ```

pub mod filter;
pub mod project;
pub mod repo;

pub use filter::{discover_files, FilterConfig};
pub use project::{
    anchor_for, ProjectInfo, ProjectLookup, ProjectMap, DEFAULT_MANIFEST_PATTERN,
};
pub use repo::{github_slug, RepoInfo};
