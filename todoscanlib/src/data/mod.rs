//! Data collection: scan files for markers.
//!
//! This module handles the second stage of the pipeline - running the
//! comment grammars over source files and collecting annotations. It provides:
//!
//! - **Positions**: byte offset to line/column conversion (`PositionIndex`)
//! - **Grammars**: the per-file-type comment recognisers (`Grammar`)
//! - **Scanning**: the marker scanner (`scan_file`, `scan_text`)
//! - **Sessions**: batch scanning and result merging (`scan_directory`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use todoscanlib::data::{scan_directory, ScanOptions};
//!
//! let session = scan_directory(".", &ScanOptions::new())?;
//! println!("Markers found: {}", session.total);
//! ```

pub mod annotation;
pub mod grammar;
pub mod position;
pub mod scanner;
pub mod session;

pub use annotation::{escape_cell, Annotation, FileScan, MarkerKind, KEYWORD_ALTERNATION};
pub use grammar::{CommentForm, CommentStyle, Family, Grammar};
pub use position::{Position, PositionIndex};
pub use scanner::{scan_file, scan_text, MarkerScanner};
pub use session::{scan_directory, ScanOptions, ScanSession};
