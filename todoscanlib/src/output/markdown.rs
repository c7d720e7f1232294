//! Markdown report rendering (`TO-DO.md`).
//!
//! The report has three parts:
//!
//! 1. A list of links to each project's section
//! 2. `## Summary`: chart images and a `Project | Total | <kind>...` table
//! 3. `## Projects`: one `Source | Category | Text` table per project
//!
//! Source cells link to the marker on GitHub when repository info is known;
//! the link definitions follow a `**********` rule at the end.

use crate::data::annotation::escape_cell;
use crate::output::links::LinkRegistry;
use crate::output::plot::{CHART_PER_KIND, CHART_PER_PROJECT, CHART_TOTAL};
use crate::query::aggregate::{Aggregation, ProjectCount};
use crate::source::repo::RepoInfo;

/// Width of the `Source` column.
const SOURCE_WIDTH: usize = 50;
/// Width of the `Category` column.
const CATEGORY_WIDTH: usize = 10;
/// Dashes under the `Text` column.
const TEXT_RULE_WIDTH: usize = 60;

const TOTAL_ROW_LABEL: &str = "**Total**";

/// Options for rendering the report.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Repository used for source links (plain titles when `None`)
    pub repo: Option<RepoInfo>,
    /// Chart directory relative to the report
    pub chart_dir: String,
    /// Link to the branch rather than the pinned commit
    pub link_to_branch: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            repo: None,
            chart_dir: "charts".to_string(),
            link_to_branch: true,
        }
    }
}

impl MarkdownOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repo(mut self, repo: Option<RepoInfo>) -> Self {
        self.repo = repo;
        self
    }

    pub fn chart_dir(mut self, dir: impl Into<String>) -> Self {
        self.chart_dir = dir.into();
        self
    }

    pub fn link_to_branch(mut self, link_to_branch: bool) -> Self {
        self.link_to_branch = link_to_branch;
        self
    }

    fn chart_link(&self, name: &str) -> String {
        let dir = self.chart_dir.trim_end_matches('/');
        if dir.is_empty() {
            format!("![{}]({}.png)", name, name)
        } else {
            format!("![{}]({}/{}.png)", name, dir, name)
        }
    }
}

/// Render the whole report.
pub fn render_report(aggregation: &Aggregation, options: &MarkdownOptions) -> String {
    let mut links = LinkRegistry::new();

    let mut out = String::from("# TO-DOs\n\n");
    for project in &aggregation.projects {
        out.push_str(&format!("- [{}](#{})\n", escape_cell(project.name()), project.anchor));
    }
    out.push('\n');

    out.push_str("## Summary\n\n");
    for chart in [CHART_TOTAL, CHART_PER_PROJECT, CHART_PER_KIND] {
        out.push_str(&options.chart_link(chart));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&summary_table(aggregation));

    out.push_str("\n## Projects\n");
    for project in &aggregation.projects {
        out.push_str(&format!("\n### {}\n\n", escape_cell(project.name())));
        out.push_str(&format!(
            "{:<sw$} | {:<cw$} | Text\n",
            "Source",
            "Category",
            sw = SOURCE_WIDTH,
            cw = CATEGORY_WIDTH
        ));
        out.push_str(&format!(
            "{}-|-{}-|-{}\n",
            "-".repeat(SOURCE_WIDTH),
            "-".repeat(CATEGORY_WIDTH),
            "-".repeat(TEXT_RULE_WIDTH)
        ));

        for annotation in project.files.iter().flat_map(|f| f.annotations.iter()) {
            let title = annotation.location();
            let source = match options.repo.as_ref().and_then(|repo| {
                repo.source_url(
                    &annotation.file_path,
                    annotation.start,
                    annotation.end,
                    options.link_to_branch,
                )
            }) {
                Some(url) => links.add(&title, &url),
                None => {
                    if options.repo.is_some() {
                        tracing::warn!(source = %title, "unable to create source link");
                    }
                    title
                }
            };
            out.push_str(&format!(
                "{:<sw$} | {:<cw$} | {}\n",
                source,
                annotation.kind,
                annotation.markdown_text(),
                sw = SOURCE_WIDTH,
                cw = CATEGORY_WIDTH
            ));
        }
    }

    out.push_str("\n**********\n\n");
    for reference in links.references() {
        out.push_str(&reference);
        out.push('\n');
    }
    out.push('\n');

    out
}

/// The `Project | Total | <kind>...` table with a bold total row.
pub fn summary_table(aggregation: &Aggregation) -> String {
    let names: Vec<String> = aggregation
        .projects
        .iter()
        .map(|p| escape_cell(p.name()))
        .collect();
    let name_width = names
        .iter()
        .map(|name| name.chars().count())
        .chain([TOTAL_ROW_LABEL.len(), "Project".len()])
        .max()
        .unwrap_or(0);

    let kinds: Vec<String> = aggregation.kinds.iter().map(|k| k.to_string()).collect();
    let mut headers = vec![format!("{:<w$}", "Project", w = name_width), "Total".to_string()];
    headers.extend(kinds.iter().cloned());
    let widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();

    let row = |label: &str, count: &ProjectCount| -> String {
        let mut cells = vec![
            format!("{:<w$}", label, w = widths[0]),
            format!("{:>w$}", count.total, w = widths[1]),
        ];
        for (i, kind) in kinds.iter().enumerate() {
            let value = count.kinds.get(kind).copied().unwrap_or(0);
            cells.push(format!("{:>w$}", value, w = widths[i + 2]));
        }
        cells.join(" | ")
    };

    let mut out = headers.join(" | ");
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("-|-"),
    );
    out.push('\n');
    for (name, project) in names.iter().zip(&aggregation.projects) {
        out.push_str(&row(name, &project.count));
        out.push('\n');
    }
    out.push_str(&row(TOTAL_ROW_LABEL, &aggregation.total));
    out.push('\n');
    out
}
