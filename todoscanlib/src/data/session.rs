//! High-level scanning API.
//!
//! A [`ScanSession`] collects the per-file results of one scan invocation:
//! every file's annotations, the set of marker kinds seen and the running
//! total. Sessions are plain values, built by merging [`FileScan`]s, so files
//! can be scanned in parallel and merged afterwards without shared state.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::data::annotation::{Annotation, FileScan, MarkerKind};
use crate::data::scanner;
use crate::source::filter::{discover_files, FilterConfig};
use crate::Result;

/// Options for scanning a directory.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// File filter configuration
    pub file_filter: FilterConfig,
    /// Scan files on the rayon thread pool
    pub parallel: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            file_filter: FilterConfig::new(),
            parallel: true,
        }
    }
}

impl ScanOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set file filter.
    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.file_filter = filter;
        self
    }

    /// Enable or disable parallel scanning.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Results of one scan invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSession {
    /// Per-file results keyed by path
    pub files: BTreeMap<PathBuf, FileScan>,
    /// Every marker kind observed
    pub kinds: BTreeSet<MarkerKind>,
    /// Number of annotations across all files
    pub total: usize,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one file's results. Re-recording a path replaces its earlier
    /// results; kinds already observed stay observed.
    pub fn record(&mut self, scan: FileScan) {
        self.total += scan.len();
        self.kinds
            .extend(scan.annotations.iter().map(|a| a.kind.clone()));
        if let Some(previous) = self.files.insert(scan.path.clone(), scan) {
            self.total -= previous.len();
        }
    }

    /// Scan one file from disk into the session.
    pub fn scan_file(&mut self, path: impl AsRef<Path>) -> Result<&FileScan> {
        let path = path.as_ref();
        let scan = scanner::scan_file(path)?;
        self.record(scan);
        Ok(&self.files[path])
    }

    /// Scan in-memory text into the session, as if read from `path`.
    pub fn scan_text(&mut self, path: impl AsRef<Path>, text: &str) -> Result<&FileScan> {
        let path = path.as_ref();
        let annotations = scanner::scan_text(path, text)?;
        self.record(FileScan::new(path, annotations));
        Ok(&self.files[path])
    }

    /// Number of files recorded (including files without markers).
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// All annotations in path order, then source order.
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.files.values().flat_map(|f| f.annotations.iter())
    }

    /// Number of annotations of one kind.
    pub fn count_kind(&self, kind: &MarkerKind) -> usize {
        self.files.values().map(|f| f.count_kind(kind)).sum()
    }
}

/// Scan every supported file under `root`.
///
/// Files are discovered with the options' filter and scanned either in
/// parallel or one after another; results are merged in path order either
/// way. The batch stops at the first file that fails and returns its error.
///
/// # Example
///
/// ```rust
/// use todoscanlib::{scan_directory, ScanOptions};
/// use std::fs;
/// use tempfile::tempdir;
///
/// let dir = tempdir().unwrap();
/// fs::write(dir.path().join("Program.cs"), "// TODO: wire up\n").unwrap();
/// fs::write(dir.path().join("run.sh"), "# NOTE: needs bash\n").unwrap();
///
/// let session = scan_directory(dir.path(), &ScanOptions::new()).unwrap();
/// assert_eq!(session.file_count(), 2);
/// assert_eq!(session.total, 2);
/// ```
pub fn scan_directory(root: impl AsRef<Path>, options: &ScanOptions) -> Result<ScanSession> {
    let root = root.as_ref();
    let files = discover_files(root, &options.file_filter)?;
    tracing::info!(root = %root.display(), files = files.len(), "scanning");

    let scans: Vec<FileScan> = if options.parallel {
        files
            .par_iter()
            .map(|path| scanner::scan_file(path))
            .collect::<Result<_>>()?
    } else {
        files
            .iter()
            .map(|path| scanner::scan_file(path))
            .collect::<Result<_>>()?
    };

    let mut session = ScanSession::new();
    for scan in scans {
        session.record(scan);
    }

    tracing::info!(
        files = session.file_count(),
        markers = session.total,
        "scan finished"
    );
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TodoscanError;
    use std::fs;
    use tempfile::tempdir;

    fn write_fixture(dir: &Path) {
        fs::create_dir_all(dir.join("src")).unwrap();
        fs::write(
            dir.join("src/Program.cs"),
            "// TODO: one\n// BUG: two\n/* NOTE: three */\n",
        )
        .unwrap();
        fs::write(dir.join("src/Empty.cs"), "class Empty {}\n").unwrap();
        fs::write(dir.join("deploy.sh"), "# TODO: four # URGENT\n").unwrap();
        fs::write(dir.join("ignored.txt"), "TODO: not scanned\n").unwrap();
    }

    #[test]
    fn test_record_tracks_kinds_and_total() {
        let mut session = ScanSession::new();
        session.scan_text("a.cs", "// TODO: x\n// NOTE: y\n").unwrap();
        session.scan_text("b.sh", "# TODO: z\n").unwrap();

        assert_eq!(session.total, 3);
        assert_eq!(session.file_count(), 2);
        assert_eq!(
            session.kinds.iter().cloned().collect::<Vec<_>>(),
            vec![MarkerKind::Todo, MarkerKind::Note]
        );
        assert_eq!(session.count_kind(&MarkerKind::Todo), 2);
    }

    #[test]
    fn test_record_replaces_same_path() {
        let mut session = ScanSession::new();
        session.scan_text("a.cs", "// TODO: x\n// TODO: y\n").unwrap();
        session.scan_text("a.cs", "// TODO: x\n").unwrap();

        assert_eq!(session.total, 1);
        assert_eq!(session.file_count(), 1);
    }

    #[test]
    fn test_total_matches_annotations() {
        let temp = tempdir().unwrap();
        write_fixture(temp.path());

        let session = scan_directory(temp.path(), &ScanOptions::new()).unwrap();

        assert_eq!(session.total, session.annotations().count());
        assert_eq!(session.total, 5);
        assert_eq!(session.file_count(), 3);
        assert!(session.kinds.contains(&MarkerKind::Urgent));
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let temp = tempdir().unwrap();
        write_fixture(temp.path());

        let parallel = scan_directory(temp.path(), &ScanOptions::new()).unwrap();
        let sequential =
            scan_directory(temp.path(), &ScanOptions::new().parallel(false)).unwrap();

        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_scan_directory_with_filter() {
        let temp = tempdir().unwrap();
        write_fixture(temp.path());

        let filter = FilterConfig::new().exclude("**/src/**").unwrap();
        let session = scan_directory(temp.path(), &ScanOptions::new().filter(filter)).unwrap();

        assert_eq!(session.file_count(), 1);
        assert_eq!(session.total, 2);
    }

    #[test]
    fn test_scan_directory_missing_root() {
        let result = scan_directory("/nonexistent/root", &ScanOptions::new());
        assert!(matches!(result, Err(TodoscanError::PathNotFound(_))));
    }

    #[test]
    fn test_session_unsupported_text() {
        let mut session = ScanSession::new();
        let err = session.scan_text("notes.foo", "// TODO: x").unwrap_err();
        assert!(matches!(err, TodoscanError::UnsupportedFileType { .. }));
        assert_eq!(session.total, 0);
    }
}
