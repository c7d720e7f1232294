//! Query processing: aggregate scan results and track them over time.
//!
//! This module handles the third stage of the pipeline - turning a scan
//! session into per-project counts and recording those counts in a history.
//! It provides:
//!
//! - **Aggregation**: per-project, per-kind counts with sorted files
//! - **History**: timestamped snapshots and the series derived from them
//!
//! ## Example
//!
//! ```rust,ignore
//! use todoscanlib::query::{Aggregation, HistoryStore, JsonHistoryFile};
//!
//! let aggregation = Aggregation::build(&session, &projects);
//! let mut store = JsonHistoryFile::new("output/metadata/todo_history.json");
//! store.append_snapshot(&now_timestamp(), aggregation.snapshot())?;
//! ```

pub mod aggregate;
pub mod history;

pub use aggregate::{Aggregation, ProjectCount, ProjectReport, TOTAL_LABEL, UNASSIGNED};
pub use history::{
    now_timestamp, parse_timestamp, History, HistoryStore, JsonHistoryFile, MemoryHistory, Series,
};
