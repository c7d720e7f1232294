//! End-to-end report run: scan, aggregate, record, write.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::Serialize;

use crate::data::session::{scan_directory, ScanSession};
use crate::error::TodoscanError;
use crate::options::ReportConfig;
use crate::output::markdown::{render_report, MarkdownOptions};
use crate::output::plot::{todo_plots, PlotConfig};
use crate::query::aggregate::Aggregation;
use crate::query::history::{now_timestamp, History, HistoryStore, JsonHistoryFile};
use crate::source::project::ProjectMap;
use crate::source::repo::RepoInfo;
use crate::Result;

/// What a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcome {
    pub aggregation: Aggregation,
    /// Files scanned, including files without markers
    pub files_scanned: usize,
    pub repo: Option<RepoInfo>,
    /// Timestamp of the recorded snapshot, if one was recorded
    pub timestamp: Option<String>,
    /// Snapshots in the history after this run
    pub history_len: usize,
    pub report_path: PathBuf,
    pub history_path: PathBuf,
    pub plots_path: PathBuf,
}

/// Run the whole pipeline for `config`.
///
/// 1. Scan `source_dir` (files written by earlier runs are never scanned)
/// 2. Map files to projects and aggregate
/// 3. Write the Markdown report
/// 4. Append the snapshot to the history (unless disabled)
/// 5. Write the plot specifications
pub fn generate_report(config: &ReportConfig) -> Result<ReportOutcome> {
    let source_dir = canonical(&config.source_dir)?;
    let session = scan_source(config, &source_dir)?;
    let projects = ProjectMap::discover(&source_dir, &config.manifest_patterns)?;
    let aggregation = Aggregation::build(&session, &projects);

    let repo = resolve_repo(config, &source_dir);
    let options = MarkdownOptions::new()
        .repo(repo.clone())
        .chart_dir(config.chart_link_dir())
        .link_to_branch(config.link_to_branch);
    let report_path = config.report_path();
    write_file(&report_path, &render_report(&aggregation, &options))?;
    tracing::info!(path = %report_path.display(), "wrote report");

    let history_path = config.history_path();
    let mut store = JsonHistoryFile::new(&history_path);
    let (history, timestamp) = if config.record_history {
        let timestamp = config.timestamp.clone().unwrap_or_else(now_timestamp);
        let history = store.append_snapshot(&timestamp, aggregation.snapshot())?;
        tracing::info!(path = %history_path.display(), %timestamp, "recorded snapshot");
        (history, Some(timestamp))
    } else {
        (store.load()?, None)
    };

    let plots_path = config.plots_path();
    write_plots(&plots_path, &todo_plots(&history)?)?;

    Ok(ReportOutcome {
        aggregation,
        files_scanned: session.file_count(),
        repo,
        timestamp,
        history_len: history.len(),
        report_path,
        history_path,
        plots_path,
    })
}

/// Plot specifications for the history at `config`'s history path.
pub fn load_plots(config: &ReportConfig) -> Result<Vec<PlotConfig>> {
    let history: History = JsonHistoryFile::new(config.history_path()).load()?;
    todo_plots(&history)
}

fn scan_source(config: &ReportConfig, source_dir: &Path) -> Result<ScanSession> {
    let mut options = config.scan_options();
    if let Ok(output_dir) = fs::canonicalize(&config.output_dir) {
        if output_dir.starts_with(source_dir) {
            // only the generated files; the output dir may be the source tree itself
            let written = config.clone().output_dir(output_dir);
            for artifact in written.artifact_paths() {
                let pattern = Pattern::escape(&artifact.to_string_lossy());
                options.file_filter = options.file_filter.exclude(&pattern)?;
            }
        }
    }
    scan_directory(source_dir, &options)
}

/// Repository info from git, with the configured overrides applied.
///
/// Without a repository, the overrides alone are used (rooted at the
/// source directory); with neither, there is nothing to link to.
fn resolve_repo(config: &ReportConfig, source_dir: &Path) -> Option<RepoInfo> {
    let repo = match RepoInfo::discover(source_dir) {
        Ok(repo) => repo,
        Err(e) if config.has_repo_overrides() => {
            tracing::debug!(error = %e, "using repository overrides only");
            RepoInfo::new(source_dir)
        }
        Err(e) => {
            tracing::warn!(error = %e, "no repository info, source links disabled");
            return None;
        }
    };

    let mut repo = repo;
    if let Some(slug) = &config.repository {
        repo = repo.with_slug(slug.clone());
    }
    if let Some(commit) = &config.commit {
        repo = repo.with_commit(commit.clone());
    }
    if let Some(branch) = &config.branch {
        repo = repo.with_branch(branch.clone());
    }
    Some(repo)
}

fn canonical(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(TodoscanError::PathNotFound(path.to_path_buf()));
    }
    Ok(fs::canonicalize(path)?)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TodoscanError::FileWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(path, contents).map_err(|e| TodoscanError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_plots(path: &Path, plots: &[PlotConfig]) -> Result<()> {
    let json = serde_json::to_string_pretty(plots).map_err(|e| TodoscanError::History {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    write_file(path, &json)?;
    tracing::debug!(path = %path.display(), charts = plots.len(), "wrote plot specifications");
    Ok(())
}
