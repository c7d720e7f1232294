//! File filtering and discovery with glob pattern support.
//!
//! Candidate files are those with a registered grammar (see
//! [`Grammar::supports`]), narrowed by optional include/exclude globs.

use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::data::grammar::Grammar;
use crate::error::TodoscanError;
use crate::Result;

/// Directory names never descended into, besides hidden ones.
const SKIPPED_DIRS: &[&str] = &["target", "bin", "obj"];

/// Configuration for file filtering.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Glob patterns to include (if empty, include every supported file)
    pub include: Vec<Pattern>,
    /// Glob patterns to exclude
    pub exclude: Vec<Pattern>,
}

impl FilterConfig {
    /// Create a new empty filter config (includes every supported file).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an include pattern.
    pub fn include(mut self, pattern: &str) -> Result<Self> {
        self.include.push(compile_glob(pattern)?);
        Ok(self)
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        self.exclude.push(compile_glob(pattern)?);
        Ok(self)
    }

    /// Add multiple include patterns.
    pub fn include_many<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            self = self.include(pattern.as_ref())?;
        }
        Ok(self)
    }

    /// Add multiple exclude patterns.
    pub fn exclude_many<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            self = self.exclude(pattern.as_ref())?;
        }
        Ok(self)
    }

    /// Check if a path matches the filter criteria.
    ///
    /// A path matches if:
    /// 1. Some grammar handles its extension or file name
    /// 2. It matches at least one include pattern (or include is empty)
    /// 3. It doesn't match any exclude pattern
    pub fn matches(&self, path: &Path) -> bool {
        if !Grammar::supports(path) {
            return false;
        }

        let path_str = path.to_string_lossy();

        if self.exclude.iter().any(|p| p.matches(&path_str)) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|p| p.matches(&path_str))
    }
}

pub(crate) fn compile_glob(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| TodoscanError::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Check if a directory should be skipped during traversal.
pub(crate) fn should_skip_dir(name: &str) -> bool {
    name.starts_with('.') || SKIPPED_DIRS.contains(&name)
}

/// Walk `root` (skipping hidden and build directories) and return every
/// file for which `keep` holds, sorted.
pub(crate) fn walk_files(root: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(TodoscanError::PathNotFound(root.to_path_buf()));
    }

    if root.is_file() {
        return Ok(if keep(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let walker = WalkDir::new(root).follow_links(true).into_iter();

    let mut files: Vec<PathBuf> = walker
        .filter_entry(|e| {
            // Always include the root directory
            if e.depth() == 0 {
                return true;
            }
            if e.file_type().is_dir() {
                let name = e.file_name().to_str().unwrap_or("");
                return !should_skip_dir(name);
            }
            true
        })
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && keep(path))
        .collect();

    // Sort for deterministic output
    files.sort();

    Ok(files)
}

/// Discover scannable files in a directory.
///
/// Walks the directory tree and returns all supported files that match the
/// filter. A file path given as `root` is returned alone if it matches.
pub fn discover_files(root: impl AsRef<Path>, filter: &FilterConfig) -> Result<Vec<PathBuf>> {
    walk_files(root.as_ref(), |path| filter.matches(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn create_test_files(dir: &Path) {
        fs::create_dir_all(dir.join("src/Utils")).unwrap();
        fs::create_dir_all(dir.join("tests")).unwrap();
        fs::create_dir_all(dir.join("bin/Debug")).unwrap();
        fs::create_dir_all(dir.join("obj")).unwrap();
        fs::create_dir_all(dir.join(".git")).unwrap();
        fs::create_dir_all(dir.join("docker")).unwrap();

        fs::write(dir.join("src/Program.cs"), "// TODO: main").unwrap();
        fs::write(dir.join("src/Utils/Helper.cs"), "class Helper {}").unwrap();
        fs::write(dir.join("src/App.csproj"), "<Project />").unwrap();
        fs::write(dir.join("tests/smoke.sh"), "# NOTE: run me").unwrap();
        fs::write(dir.join("docker/Dockerfile"), "FROM scratch").unwrap();
        fs::write(dir.join("README.md"), "- [ ] write docs").unwrap();
        fs::write(dir.join("main.rs"), "// TODO: not scanned").unwrap();
        fs::write(dir.join("bin/Debug/Generated.cs"), "// generated").unwrap();
        fs::write(dir.join("obj/Temp.cs"), "// generated").unwrap();
        fs::write(dir.join(".git/config.yml"), "# hidden").unwrap();
    }

    #[test]
    fn test_filter_matches_supported_files() {
        let filter = FilterConfig::new();

        assert!(filter.matches(Path::new("src/Program.cs")));
        assert!(filter.matches(Path::new("README.md")));
        assert!(filter.matches(Path::new("deploy/Dockerfile")));
        assert!(filter.matches(Path::new(".editorconfig")));
        assert!(!filter.matches(Path::new("main.rs")));
        assert!(!filter.matches(Path::new("Cargo.toml")));
    }

    #[test]
    fn test_filter_with_include_pattern() {
        let filter = FilterConfig::new().include("**/Utils/*.cs").unwrap();

        assert!(filter.matches(Path::new("src/Utils/Helper.cs")));
        assert!(!filter.matches(Path::new("src/Program.cs")));
    }

    #[test]
    fn test_filter_with_exclude_pattern() {
        let filter = FilterConfig::new().exclude("**/tests/**").unwrap();

        assert!(filter.matches(Path::new("src/Program.cs")));
        assert!(!filter.matches(Path::new("tests/smoke.sh")));
        assert!(!filter.matches(Path::new("src/tests/run.sh")));
    }

    #[test]
    fn test_filter_with_multiple_patterns() {
        let filter = FilterConfig::new()
            .include_many(&["**/src/**", "**/tests/**"])
            .unwrap()
            .exclude_many(&["**/Utils/**"])
            .unwrap();

        assert!(filter.matches(Path::new("project/src/Program.cs")));
        assert!(filter.matches(Path::new("project/tests/smoke.sh")));
        assert!(!filter.matches(Path::new("project/src/Utils/Helper.cs")));
        assert!(!filter.matches(Path::new("project/docs/README.md")));
    }

    #[test]
    fn test_discover_files() {
        let temp = tempdir().unwrap();
        create_test_files(temp.path());

        let files = discover_files(temp.path(), &FilterConfig::new()).unwrap();

        assert!(files.iter().any(|p| p.ends_with("src/Program.cs")));
        assert!(files.iter().any(|p| p.ends_with("src/Utils/Helper.cs")));
        assert!(files.iter().any(|p| p.ends_with("src/App.csproj")));
        assert!(files.iter().any(|p| p.ends_with("tests/smoke.sh")));
        assert!(files.iter().any(|p| p.ends_with("docker/Dockerfile")));
        assert!(files.iter().any(|p| p.ends_with("README.md")));
        assert_eq!(files.len(), 6);

        // build output, hidden dirs and unsupported files are skipped
        assert!(!files.iter().any(|p| p.ends_with("main.rs")));
        assert!(!files.iter().any(|p| p.ends_with("Generated.cs")));
        assert!(!files.iter().any(|p| p.ends_with("Temp.cs")));
        assert!(!files.iter().any(|p| p.ends_with("config.yml")));
    }

    #[test]
    fn test_discover_files_is_sorted() {
        let temp = tempdir().unwrap();
        create_test_files(temp.path());

        let files = discover_files(temp.path(), &FilterConfig::new()).unwrap();
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }

    #[test]
    fn test_discover_single_file() {
        let temp = tempdir().unwrap();
        let file_path = temp.path().join("query.sql");
        fs::write(&file_path, "-- TODO: index").unwrap();

        let files = discover_files(&file_path, &FilterConfig::new()).unwrap();

        assert_eq!(files, vec![file_path]);
    }

    #[test]
    fn test_discover_files_nonexistent() {
        let result = discover_files("/nonexistent/path", &FilterConfig::new());

        assert!(matches!(result, Err(TodoscanError::PathNotFound(_))));
    }

    #[test]
    fn test_invalid_glob_pattern() {
        let result = FilterConfig::new().include("[invalid");

        if let Err(TodoscanError::InvalidGlob { pattern, .. }) = result {
            assert_eq!(pattern, "[invalid");
        } else {
            panic!("Expected InvalidGlob error");
        }
    }
}
