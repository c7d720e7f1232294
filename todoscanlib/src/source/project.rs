//! Project discovery and file ownership.
//!
//! A project is identified by a manifest file (by default any `*.csproj`);
//! it owns every file below the manifest's directory. Nested projects take
//! precedence over the projects that contain them.

use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::source::filter::{compile_glob, walk_files};
use crate::Result;

/// Manifest pattern used when none is configured.
pub const DEFAULT_MANIFEST_PATTERN: &str = "*.csproj";

/// Information about a project in a source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    /// Project name (the manifest file stem)
    pub name: String,
    /// Path of the manifest file, if the project was discovered from one
    pub manifest_path: Option<PathBuf>,
    /// Directory containing every file the project owns
    pub root: PathBuf,
}

impl ProjectInfo {
    /// Create a project rooted at `root`.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            manifest_path: None,
            root: root.into(),
        }
    }

    /// Create project info from a manifest path.
    fn from_manifest(manifest: &Path) -> Self {
        let name = manifest
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let root = manifest.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            name,
            manifest_path: Some(manifest.to_path_buf()),
            root,
        }
    }

    /// Whether `path` lies below this project's directory.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root) && path != self.root
    }

    /// Anchor id of the project's section in a Markdown document.
    pub fn anchor(&self) -> String {
        anchor_for(&self.name)
    }
}

/// GitHub-style heading anchor: lowercase, spaces to dashes, then only
/// `[a-z0-9-]` kept.
pub fn anchor_for(name: &str) -> String {
    name.to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Resolves which project owns a file.
pub trait ProjectLookup {
    /// All known projects.
    fn projects(&self) -> &[ProjectInfo];

    /// The project owning `path`, if any.
    fn owner_of(&self, path: &Path) -> Option<&ProjectInfo>;
}

/// The projects of a source tree.
#[derive(Debug, Clone, Default)]
pub struct ProjectMap {
    /// All projects, sorted by name then root
    pub projects: Vec<ProjectInfo>,
}

impl ProjectMap {
    /// Discover projects by walking `root` for manifests matching any of the
    /// given file-name patterns (defaults to [`DEFAULT_MANIFEST_PATTERN`]).
    pub fn discover<S: AsRef<str>>(root: impl AsRef<Path>, manifest_patterns: &[S]) -> Result<Self> {
        let root = root.as_ref();
        let patterns: Vec<Pattern> = if manifest_patterns.is_empty() {
            vec![compile_glob(DEFAULT_MANIFEST_PATTERN)?]
        } else {
            manifest_patterns
                .iter()
                .map(|p| compile_glob(p.as_ref()))
                .collect::<Result<_>>()?
        };

        let manifests = walk_files(root, |path| {
            path.file_name()
                .map(|name| {
                    let name = name.to_string_lossy();
                    patterns.iter().any(|p| p.matches(&name))
                })
                .unwrap_or(false)
        })?;

        let map = Self::from_projects(manifests.iter().map(|m| ProjectInfo::from_manifest(m)));
        tracing::debug!(root = %root.display(), projects = map.projects.len(), "discovered projects");
        Ok(map)
    }

    /// Build a map from caller-supplied projects.
    pub fn from_projects(projects: impl IntoIterator<Item = ProjectInfo>) -> Self {
        let mut projects: Vec<ProjectInfo> = projects.into_iter().collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.root.cmp(&b.root)));
        for pair in projects.windows(2) {
            if pair[0].name == pair[1].name {
                tracing::warn!(name = %pair[0].name, "duplicate project name");
            }
        }
        Self { projects }
    }

    /// Get a project by name.
    pub fn get(&self, name: &str) -> Option<&ProjectInfo> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// Get all project names.
    pub fn names(&self) -> Vec<&str> {
        self.projects.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

impl ProjectLookup for ProjectMap {
    fn projects(&self) -> &[ProjectInfo] {
        &self.projects
    }

    /// The deepest project directory containing `path`.
    fn owner_of(&self, path: &Path) -> Option<&ProjectInfo> {
        self.projects
            .iter()
            .filter(|p| p.contains(path))
            .max_by_key(|p| p.root.components().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TodoscanError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_owner_of_prefers_deepest() {
        let map = ProjectMap::from_projects(vec![
            ProjectInfo::new("App", "/repo/src"),
            ProjectInfo::new("App.Tests", "/repo/src/tests"),
        ]);

        let owner = map.owner_of(Path::new("/repo/src/tests/UnitTest.cs"));
        assert_eq!(owner.map(|p| p.name.as_str()), Some("App.Tests"));

        let owner = map.owner_of(Path::new("/repo/src/Program.cs"));
        assert_eq!(owner.map(|p| p.name.as_str()), Some("App"));

        assert!(map.owner_of(Path::new("/repo/README.md")).is_none());
    }

    #[test]
    fn test_contains_is_component_wise() {
        let project = ProjectInfo::new("Core", "/repo/Core");
        assert!(project.contains(Path::new("/repo/Core/Thing.cs")));
        assert!(!project.contains(Path::new("/repo/CoreExtras/Thing.cs")));
        assert!(!project.contains(Path::new("/repo/Core")));
    }

    #[test]
    fn test_from_projects_sorts_by_name() {
        let map = ProjectMap::from_projects(vec![
            ProjectInfo::new("Zeta", "/z"),
            ProjectInfo::new("Alpha", "/a"),
        ]);
        assert_eq!(map.names(), vec!["Alpha", "Zeta"]);
        assert!(map.get("Zeta").is_some());
        assert!(map.get("Beta").is_none());
    }

    #[test]
    fn test_anchor() {
        assert_eq!(anchor_for("My Project.Core"), "my-projectcore");
        assert_eq!(anchor_for("unassigned"), "unassigned");
        assert_eq!(ProjectInfo::new("App_2", "/x").anchor(), "app2");
    }

    #[test]
    fn test_discover_manifests() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src/App")).unwrap();
        fs::create_dir_all(root.join("test/App.Tests")).unwrap();
        fs::create_dir_all(root.join("src/App/bin")).unwrap();
        fs::write(root.join("src/App/App.csproj"), "<Project />").unwrap();
        fs::write(root.join("test/App.Tests/App.Tests.csproj"), "<Project />").unwrap();
        fs::write(root.join("src/App/bin/Copy.csproj"), "<Project />").unwrap();

        let map = ProjectMap::discover(root, &[] as &[&str]).unwrap();

        assert_eq!(map.names(), vec!["App", "App.Tests"]);
        let app = map.get("App").unwrap();
        assert_eq!(app.root, root.join("src/App"));
        assert_eq!(app.manifest_path, Some(root.join("src/App/App.csproj")));
    }

    #[test]
    fn test_discover_custom_patterns() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("tools")).unwrap();
        fs::write(root.join("tools/tools.pyproj"), "").unwrap();
        fs::write(root.join("Other.csproj"), "").unwrap();

        let map = ProjectMap::discover(root, &["*.pyproj"]).unwrap();

        assert_eq!(map.names(), vec!["tools"]);
    }

    #[test]
    fn test_discover_invalid_pattern() {
        let temp = tempdir().unwrap();
        let result = ProjectMap::discover(temp.path(), &["[oops"]);
        assert!(matches!(result, Err(TodoscanError::InvalidGlob { .. })));
    }
}
