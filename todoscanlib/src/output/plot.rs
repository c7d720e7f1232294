//! Chart specifications built from the history.
//!
//! Nothing is rasterised here: each [`PlotConfig`] describes one chart and is
//! written as JSON for an external plotter.

use serde::Serialize;

use crate::query::history::{History, Series};
use crate::Result;

/// Chart of every project's total over time.
pub const CHART_PER_PROJECT: &str = "todo_history";
/// Chart of every kind's total over time.
pub const CHART_PER_KIND: &str = "todo_history_categories";
/// Chart of the grand total over time.
pub const CHART_TOTAL: &str = "todo_history_total";

/// File the plot specifications are written to, inside the chart directory.
pub const PLOTS_FILE_NAME: &str = "todo_plots.json";

const WIDTH: u32 = 1024;
const HEIGHT: u32 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlotType {
    Scatter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AxisType {
    Numeric,
    /// RFC 3339 strings
    DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinePattern {
    /// Test projects; series without a pattern draw solid
    Dotted,
}

/// One line of a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlotSeries {
    pub title: String,
    pub x: Vec<String>,
    pub y: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_pattern: Option<LinePattern>,
}

impl PlotSeries {
    fn from_series(series: Series) -> Self {
        let (x, y) = series.points.into_iter().unzip();
        Self {
            title: series.title,
            x,
            y,
            line_pattern: None,
        }
    }
}

/// A chart: axes, size and data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlotConfig {
    pub title: String,
    /// Image name without extension
    pub output_file_name: String,
    pub plot_type: PlotType,
    pub width: u32,
    pub height: u32,
    pub x_axis: AxisType,
    pub y_axis: AxisType,
    pub data: Vec<PlotSeries>,
}

impl PlotConfig {
    /// A 1024x800 scatter chart over time.
    pub fn time_series(
        title: impl Into<String>,
        output_file_name: impl Into<String>,
        data: Vec<PlotSeries>,
    ) -> Self {
        Self {
            title: title.into(),
            output_file_name: output_file_name.into(),
            plot_type: PlotType::Scatter,
            width: WIDTH,
            height: HEIGHT,
            x_axis: AxisType::DateTime,
            y_axis: AxisType::Numeric,
            data,
        }
    }
}

/// The per-project, per-kind and total charts for a history.
pub fn todo_plots(history: &History) -> Result<Vec<PlotConfig>> {
    let per_project = history
        .project_series()?
        .into_iter()
        .map(|series| {
            let dotted = series.title.contains("Tests");
            let mut data = PlotSeries::from_series(series);
            if dotted {
                data.line_pattern = Some(LinePattern::Dotted);
            }
            data
        })
        .collect();

    let per_kind = history
        .kind_series()?
        .into_iter()
        .map(|mut series| {
            series.title = format!("{} Total", series.title);
            PlotSeries::from_series(series)
        })
        .collect();

    let total = PlotSeries::from_series(history.total_series("Total")?);

    Ok(vec![
        PlotConfig::time_series("TO-DO per Project", CHART_PER_PROJECT, per_project),
        PlotConfig::time_series("TO-DO per Category", CHART_PER_KIND, per_kind),
        PlotConfig::time_series("TO-DO - Total", CHART_TOTAL, vec![total]),
    ])
}
