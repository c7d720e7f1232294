//! Terminal rendering for CLI output using console styles

use std::path::Path;

use console::Style;
use todoscanlib::query::TOTAL_LABEL;
use todoscanlib::{Aggregation, ProjectCount, ReportOutcome};

const NAME_WIDTH: usize = 40;
const CELL_WIDTH: usize = 8;

/// Styles used in the summary; all plain when color is off
struct Theme {
    header: Style,
    total: Style,
    muted: Style,
}

impl Theme {
    fn new(color: bool) -> Self {
        Self {
            header: Style::new().bold().force_styling(color),
            total: Style::new().bold().green().force_styling(color),
            muted: Style::new().dim().force_styling(color),
        }
    }
}

/// Truncate a name to fit within max_len, adding ".." prefix if needed
fn truncate_name(name: &str, max_len: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() > max_len {
        let tail: String = chars[chars.len() - (max_len - 2)..].iter().collect();
        format!("..{}", tail)
    } else {
        name.to_string()
    }
}

fn row(name: &str, count: &ProjectCount, kinds: &[String]) -> String {
    let mut line = format!(
        "{:<nw$}{:>cw$}",
        truncate_name(name, NAME_WIDTH - 2),
        count.total,
        nw = NAME_WIDTH,
        cw = CELL_WIDTH
    );
    for kind in kinds {
        let value = count.kinds.get(kind).copied().unwrap_or(0);
        line.push_str(&format!("{:>cw$}", value, cw = CELL_WIDTH));
    }
    line
}

/// Per-project counts as a fixed-width table
pub fn render_counts(aggregation: &Aggregation, color: bool) -> String {
    let theme = Theme::new(color);
    let kinds: Vec<String> = aggregation.kinds.iter().map(|k| k.to_string()).collect();

    let mut header = format!(
        "{:<nw$}{:>cw$}",
        "Project",
        "Total",
        nw = NAME_WIDTH,
        cw = CELL_WIDTH
    );
    for kind in &kinds {
        header.push_str(&format!("{:>cw$}", kind, cw = CELL_WIDTH));
    }
    let separator = "-".repeat(NAME_WIDTH + CELL_WIDTH * (kinds.len() + 1));

    let mut out = String::new();
    out.push_str(&format!("{}\n", theme.header.apply_to(header)));
    out.push_str(&format!("{}\n", theme.muted.apply_to(&separator)));
    for project in &aggregation.projects {
        out.push_str(&row(project.name(), &project.count, &kinds));
        out.push('\n');
    }
    out.push_str(&format!("{}\n", theme.muted.apply_to(&separator)));
    out.push_str(&format!(
        "{}\n",
        theme
            .total
            .apply_to(row(TOTAL_LABEL, &aggregation.total, &kinds))
    ));
    out
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Summary of a report run: counts table and the files written
pub fn render_summary(outcome: &ReportOutcome, color: bool) -> String {
    let theme = Theme::new(color);
    let mut out = format!(
        "Scanned {} files, found {} markers\n\n",
        outcome.files_scanned, outcome.aggregation.total.total
    );
    out.push_str(&render_counts(&outcome.aggregation, color));
    out.push('\n');

    out.push_str(&format!(
        "{} {}\n",
        theme.header.apply_to("Report: "),
        display_path(&outcome.report_path)
    ));
    match &outcome.timestamp {
        Some(timestamp) => out.push_str(&format!(
            "{} {} ({} snapshots, recorded {})\n",
            theme.header.apply_to("History:"),
            display_path(&outcome.history_path),
            outcome.history_len,
            timestamp
        )),
        None => out.push_str(&format!(
            "{} {}\n",
            theme.header.apply_to("History:"),
            theme.muted.apply_to("not recorded")
        )),
    }
    out.push_str(&format!(
        "{} {}\n",
        theme.header.apply_to("Charts: "),
        display_path(&outcome.plots_path)
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use todoscanlib::{ProjectMap, ScanSession};

    fn aggregation() -> Aggregation {
        let mut session = ScanSession::new();
        session
            .scan_text("/repo/App/Program.cs", "// TODO: a\n// BUG: b\n")
            .unwrap();
        let map = ProjectMap::from_projects(vec![todoscanlib::ProjectInfo::new(
            "App",
            "/repo/App",
        )]);
        Aggregation::build(&session, &map)
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("short", 10), "short");
        assert_eq!(truncate_name("a-very-long-project-name", 10), "..ect-name");
    }

    #[test]
    fn test_render_counts_plain() {
        let table = render_counts(&aggregation(), false);
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].starts_with("Project"));
        assert!(lines[0].ends_with("   Total    TODO     BUG"));
        assert!(lines[2].starts_with("App "));
        assert!(lines[2].ends_with("       2       1       1"));
        assert!(lines[3].starts_with("unassigned"));
        assert!(lines[5].starts_with("Total"));
        assert!(!table.contains('\u{1b}'));
    }
}
