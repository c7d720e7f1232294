//! # todoscanlib
//!
//! Finds TODO-style marker comments (`TODO`, `NOTE`, `BUG`, `KILL`,
//! `URGENT`, `NETnn`) in source trees, across the comment syntaxes of C#,
//! XML, PowerShell, shell/YAML, Markdown task lists, SQL and Python.
//!
//! ## Overview
//!
//! The library is a pipeline:
//!
//! - **source**: discover files, the projects that own them, and the git
//!   repository they live in
//! - **data**: run the per-file-type comment grammars and collect
//!   annotations with exact start and end positions
//! - **query**: group annotations by project, count them per kind, and
//!   keep a timestamped history of the counts
//! - **output**: render the `TO-DO.md` report and the chart specifications
//!
//! [`generate_report`] runs all of it for a [`ReportConfig`].
//!
//! ## Example
//!
//! ```rust
//! use todoscanlib::{scan_directory, scan_text, MarkerKind, ScanOptions};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! // A single in-memory file
//! let found = scan_text("Program.cs", "var x = 1; // TODO: name this\n").unwrap();
//! assert_eq!(found[0].kind, MarkerKind::Todo);
//! assert_eq!(found[0].text, "name this");
//!
//! // A whole directory
//! let dir = tempdir().unwrap();
//! fs::write(dir.path().join("deploy.sh"), "# BUG: breaks on macOS\n").unwrap();
//! let session = scan_directory(dir.path(), &ScanOptions::new()).unwrap();
//! assert_eq!(session.count_kind(&MarkerKind::Bug), 1);
//! ```

pub mod data;
pub mod error;
pub mod options;
pub mod output;
pub mod query;
pub mod report;
pub mod source;

pub use data::{
    scan_directory, scan_file, scan_text, Annotation, FileScan, Grammar, MarkerKind, Position,
    ScanOptions, ScanSession,
};
pub use error::TodoscanError;
pub use options::ReportConfig;
pub use output::{render_report, todo_plots, MarkdownOptions, PlotConfig};
pub use query::{Aggregation, History, HistoryStore, JsonHistoryFile, ProjectCount};
pub use report::{generate_report, load_plots, ReportOutcome};
pub use source::{FilterConfig, ProjectInfo, ProjectMap, RepoInfo};

/// Result type for todoscanlib operations
pub type Result<T> = std::result::Result<T, TodoscanError>;
