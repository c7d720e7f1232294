//! Output: present aggregated data.
//!
//! This is the last stage of the pipeline. It provides:
//!
//! - **markdown**: the `TO-DO.md` report (summary table and per-project tables)
//! - **links**: reference-style links with stable ids for source cells
//! - **plot**: chart specifications built from the history
//!
//! Everything here is pure formatting; filtering, grouping and sorting
//! happen in the query stage.
//!
//! ## Example
//!
//! ```rust,ignore
//! use todoscanlib::output::{render_report, MarkdownOptions};
//!
//! let markdown = render_report(&aggregation, &MarkdownOptions::new());
//! assert!(markdown.starts_with("# TO-DOs"));
//! ```

pub mod links;
pub mod markdown;
pub mod plot;

pub use links::{link_id, LinkRegistry};
pub use markdown::{render_report, summary_table, MarkdownOptions};
pub use plot::{
    todo_plots, AxisType, LinePattern, PlotConfig, PlotSeries, PlotType, CHART_PER_KIND,
    CHART_PER_PROJECT, CHART_TOTAL, PLOTS_FILE_NAME,
};
