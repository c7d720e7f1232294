//! Per-project and per-kind aggregation of a scan session.
//!
//! The pipeline is:
//! 1. Raw data (`ScanSession`)
//! 2. Aggregation (grouped by owning project, counted per kind, sorted)
//! 3. Report / history snapshot

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::annotation::{FileScan, MarkerKind};
use crate::data::session::ScanSession;
use crate::source::project::{anchor_for, ProjectLookup};

/// Bucket for files outside every known project.
pub const UNASSIGNED: &str = "unassigned";

/// Name of the grand-total row.
pub const TOTAL_LABEL: &str = "Total";

/// Marker counts for one project.
///
/// Field aliases accept history files written with the older
/// `ProjectName` / `TotalCount` / `LevelCount` names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCount {
    #[serde(alias = "ProjectName")]
    pub name: String,
    #[serde(alias = "TotalCount")]
    pub total: u64,
    /// Count per marker keyword; every kind of the session is present
    #[serde(alias = "LevelCount", default)]
    pub kinds: BTreeMap<String, u64>,
}

impl ProjectCount {
    /// Zero counts for every given kind.
    pub fn new<'a>(name: impl Into<String>, kinds: impl IntoIterator<Item = &'a MarkerKind>) -> Self {
        Self {
            name: name.into(),
            total: 0,
            kinds: kinds.into_iter().map(|k| (k.to_string(), 0)).collect(),
        }
    }

    /// Add every annotation of a file.
    pub fn add_file(&mut self, scan: &FileScan) {
        for annotation in &scan.annotations {
            self.total += 1;
            *self.kinds.entry(annotation.kind.to_string()).or_insert(0) += 1;
        }
    }

    /// Count for one kind (zero when absent).
    pub fn count(&self, kind: &MarkerKind) -> u64 {
        self.kinds.get(&kind.to_string()).copied().unwrap_or(0)
    }

    fn absorb(&mut self, other: &ProjectCount) {
        self.total += other.total;
        for (kind, count) in &other.kinds {
            *self.kinds.entry(kind.clone()).or_insert(0) += count;
        }
    }
}

/// One project's counts and its files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectReport {
    pub count: ProjectCount,
    /// Markdown anchor for the project's section
    pub anchor: String,
    /// Files sorted by base name, annotations by sort key
    pub files: Vec<FileScan>,
}

impl ProjectReport {
    pub fn name(&self) -> &str {
        &self.count.name
    }
}

/// Aggregated view of a scan session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    /// Kinds observed, in vocabulary order
    pub kinds: Vec<MarkerKind>,
    /// Known projects by name, then the unassigned bucket
    pub projects: Vec<ProjectReport>,
    /// Sum over every project
    pub total: ProjectCount,
}

impl Aggregation {
    /// Group a session's files by owning project and count them.
    ///
    /// Every known project gets a report, even without markers; files no
    /// project owns land in the [`UNASSIGNED`] bucket, which always comes
    /// last. The result depends only on the inputs, never on scan order.
    pub fn build(session: &ScanSession, lookup: &dyn ProjectLookup) -> Self {
        let kinds: Vec<MarkerKind> = session.kinds.iter().cloned().collect();

        let mut names: Vec<&str> = lookup.projects().iter().map(|p| p.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();

        let mut buckets: BTreeMap<&str, Vec<&FileScan>> = BTreeMap::new();
        for scan in session.files.values() {
            let owner = lookup
                .owner_of(&scan.path)
                .map_or(UNASSIGNED, |p| p.name.as_str());
            buckets.entry(owner).or_default().push(scan);
        }

        let projects: Vec<ProjectReport> = names
            .iter()
            .copied()
            .filter(|&name| name != UNASSIGNED)
            .chain(std::iter::once(UNASSIGNED))
            .map(|name| {
                let files = buckets.remove(name).unwrap_or_default();
                build_report(name, &kinds, files)
            })
            .collect();

        let mut total = ProjectCount::new(TOTAL_LABEL, &kinds);
        for report in &projects {
            total.absorb(&report.count);
        }

        Self {
            kinds,
            projects,
            total,
        }
    }

    /// Per-project counts for the history recorder (the total row excluded).
    pub fn snapshot(&self) -> Vec<ProjectCount> {
        self.projects.iter().map(|p| p.count.clone()).collect()
    }

    /// Report for one project.
    pub fn project(&self, name: &str) -> Option<&ProjectReport> {
        self.projects.iter().find(|p| p.name() == name)
    }
}

fn build_report(name: &str, kinds: &[MarkerKind], mut files: Vec<&FileScan>) -> ProjectReport {
    files.sort_by(|a, b| {
        a.file_name()
            .cmp(&b.file_name())
            .then_with(|| a.path.cmp(&b.path))
    });

    let mut count = ProjectCount::new(name, kinds);
    let files = files
        .into_iter()
        .map(|scan| {
            count.add_file(scan);
            let mut sorted = scan.clone();
            sorted.annotations.sort_by_key(|a| a.sort_key());
            sorted
        })
        .collect();

    ProjectReport {
        count,
        anchor: anchor_for(name),
        files,
    }
}
