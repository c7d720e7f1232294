//! Configuration for a full report run.
//!
//! [`ReportConfig`] names the directories and files a run reads and writes;
//! the output layout is:
//!
//! ```text
//! <output>/TO-DO.md
//! <output>/metadata/todo_history.json
//! <output>/charts/todo_plots.json
//! ```

use std::path::{Path, PathBuf};

use crate::data::session::ScanOptions;
use crate::output::plot::PLOTS_FILE_NAME;
use crate::source::filter::FilterConfig;

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_HISTORY_FILE: &str = "todo_history.json";
pub const DEFAULT_REPORT_FILE: &str = "TO-DO.md";

const METADATA_DIR: &str = "metadata";
const CHART_DIR: &str = "charts";

/// Everything a report run needs to know.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Directory scanned for markers and project manifests
    pub source_dir: PathBuf,
    /// Directory the report, history and charts are written under
    pub output_dir: PathBuf,
    /// History file name inside the metadata directory
    pub history_file_name: String,
    /// Report file name inside the output directory
    pub report_file_name: String,
    /// Manifest file-name globs (empty means `*.csproj`)
    pub manifest_patterns: Vec<String>,
    /// `owner/name` override for source links
    pub repository: Option<String>,
    /// Commit override for source links
    pub commit: Option<String>,
    /// Branch override for source links
    pub branch: Option<String>,
    /// Link to the branch instead of the commit
    pub link_to_branch: bool,
    /// File filter configuration
    pub filter: FilterConfig,
    /// Scan files in parallel
    pub parallel: bool,
    /// Append a snapshot to the history
    pub record_history: bool,
    /// Snapshot timestamp (current time when `None`)
    pub timestamp: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            history_file_name: DEFAULT_HISTORY_FILE.to_string(),
            report_file_name: DEFAULT_REPORT_FILE.to_string(),
            manifest_patterns: Vec::new(),
            repository: None,
            commit: None,
            branch: None,
            link_to_branch: true,
            filter: FilterConfig::new(),
            parallel: true,
            record_history: true,
            timestamp: None,
        }
    }
}

impl ReportConfig {
    /// Scan `source_dir`, writing to `<source_dir>/output`.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        let source_dir = source_dir.into();
        Self {
            output_dir: source_dir.join(DEFAULT_OUTPUT_DIR),
            source_dir,
            ..Self::default()
        }
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn history_file_name(mut self, name: impl Into<String>) -> Self {
        self.history_file_name = name.into();
        self
    }

    pub fn report_file_name(mut self, name: impl Into<String>) -> Self {
        self.report_file_name = name.into();
        self
    }

    pub fn manifest_patterns(mut self, patterns: Vec<String>) -> Self {
        self.manifest_patterns = patterns;
        self
    }

    pub fn repository(mut self, slug: Option<String>) -> Self {
        self.repository = slug;
        self
    }

    pub fn commit(mut self, commit: Option<String>) -> Self {
        self.commit = commit;
        self
    }

    pub fn branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    pub fn link_to_branch(mut self, link_to_branch: bool) -> Self {
        self.link_to_branch = link_to_branch;
        self
    }

    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn record_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    pub fn timestamp(mut self, timestamp: Option<String>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// `<output>/metadata`
    pub fn metadata_dir(&self) -> PathBuf {
        self.output_dir.join(METADATA_DIR)
    }

    /// `<output>/charts`
    pub fn chart_dir(&self) -> PathBuf {
        self.output_dir.join(CHART_DIR)
    }

    pub fn history_path(&self) -> PathBuf {
        self.metadata_dir().join(&self.history_file_name)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file_name)
    }

    pub fn plots_path(&self) -> PathBuf {
        self.chart_dir().join(PLOTS_FILE_NAME)
    }

    /// Every file a run writes: report, history and plot specifications.
    pub fn artifact_paths(&self) -> [PathBuf; 3] {
        [self.report_path(), self.history_path(), self.plots_path()]
    }

    /// Chart directory as referenced from the report, `/`-separated.
    pub fn chart_link_dir(&self) -> String {
        relative_link(&self.output_dir, &self.chart_dir())
    }

    /// Whether any repository override is set.
    pub fn has_repo_overrides(&self) -> bool {
        self.repository.is_some() || self.commit.is_some() || self.branch.is_some()
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::new()
            .filter(self.filter.clone())
            .parallel(self.parallel)
    }
}

fn relative_link(from: &Path, to: &Path) -> String {
    let relative = to.strip_prefix(from).unwrap_or(to);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}
