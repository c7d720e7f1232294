//! Git repository information for source links.
//!
//! Links point at GitHub: `https://github.com/<owner>/<repo>/blob/<commit>/`
//! for a pinned commit, or `.../tree/<branch>/` to follow a branch.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::data::position::Position;
use crate::error::TodoscanError;
use crate::Result;

/// Repository root, GitHub slug and checked-out revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoInfo {
    /// Working tree root
    pub root: PathBuf,
    /// `owner/name` on GitHub
    pub slug: Option<String>,
    /// Commit SHA
    pub commit: Option<String>,
    /// Branch name
    pub branch: Option<String>,
}

impl RepoInfo {
    /// Repository info for a root with nothing else known yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Discover the repository containing `path`.
    ///
    /// Reads HEAD for the commit and branch (a detached HEAD has no branch)
    /// and `remote.origin.url` for the slug.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repo = gix::discover(path).map_err(|e| {
            TodoscanError::GitError(format!("Failed to discover git repository: {}", e))
        })?;

        let work_dir = repo
            .work_dir()
            .ok_or_else(|| TodoscanError::GitError("Repository has no work directory".to_string()))?;
        let root = std::fs::canonicalize(work_dir).unwrap_or_else(|_| work_dir.to_path_buf());

        let commit = repo.head_id().ok().map(|id| id.to_string());
        let branch = repo
            .head_name()
            .ok()
            .flatten()
            .map(|name| name.shorten().to_string());
        let slug = repo
            .config_snapshot()
            .string("remote.origin.url")
            .and_then(|url| github_slug(&url.to_string()));

        tracing::debug!(
            root = %root.display(),
            slug = ?slug,
            commit = ?commit,
            branch = ?branch,
            "discovered repository"
        );

        Ok(Self {
            root,
            slug,
            commit,
            branch,
        })
    }

    /// Override the slug (e.g. from `GITHUB_REPOSITORY`).
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Override the commit (e.g. from `GITHUB_SHA`).
    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    /// Override the branch (e.g. from `GITHUB_REF_NAME`).
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// `https://github.com/<slug>/blob/<commit>/`
    pub fn commit_base_url(&self) -> Option<String> {
        let slug = self.slug.as_ref()?;
        let commit = self.commit.as_ref()?;
        Some(format!("https://github.com/{}/blob/{}/", slug, commit))
    }

    /// `https://github.com/<slug>/tree/<branch>/`
    pub fn branch_base_url(&self) -> Option<String> {
        let slug = self.slug.as_ref()?;
        let branch = self.branch.as_ref()?;
        Some(format!("https://github.com/{}/tree/{}/", slug, branch))
    }

    /// `file` relative to the repository root, `/`-separated.
    pub fn relative_path(&self, file: &Path) -> Option<String> {
        let relative = match file.strip_prefix(&self.root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => {
                let canonical = std::fs::canonicalize(file).ok()?;
                canonical.strip_prefix(&self.root).ok()?.to_path_buf()
            }
        };
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        Some(parts.join("/"))
    }

    /// Link to a span of a file: `<base><path>#L<l>C<c>`, with `-L<l>C<c>`
    /// appended when the span covers more than one line.
    ///
    /// Uses the branch URL when `link_to_branch` is set, otherwise the commit
    /// URL. Returns `None` if that URL or the relative path is unknown.
    pub fn source_url(
        &self,
        file: &Path,
        start: Position,
        end: Position,
        link_to_branch: bool,
    ) -> Option<String> {
        let base = if link_to_branch {
            self.branch_base_url()
        } else {
            self.commit_base_url()
        }?;
        let relative = self.relative_path(file)?;

        let mut url = format!(
            "{}{}#L{}C{}",
            base,
            relative.replace(' ', "%20"),
            start.line,
            start.column
        );
        if end.line != start.line {
            url.push_str(&format!("-L{}C{}", end.line, end.column));
        }
        Some(url)
    }
}

/// Extract `owner/name` from a GitHub remote URL (HTTPS or SSH form).
pub fn github_slug(url: &str) -> Option<String> {
    static SLUG: OnceLock<Regex> = OnceLock::new();
    let re = SLUG.get_or_init(|| {
        Regex::new(r"github\.com[/:](?P<slug>[^/\s]+/[^/\s]+?)(?:\.git)?/?$")
            .expect("slug pattern must compile")
    });
    re.captures(url.trim())
        .and_then(|caps| caps.name("slug"))
        .map(|m| m.as_str().to_string())
}
