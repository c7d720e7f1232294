//! Comment grammars for each supported file type.
//!
//! A grammar is an ordered list of comment forms. Each form is a single
//! regular expression using these named groups:
//!
//! - `Level`: the marker keyword (optional only for Markdown checkboxes)
//! - `Content`: the body following the keyword
//! - `MultiLineOpen` / `MultiLineClose`: block delimiters (block forms only)
//! - `Tail`: text after a keyword that has no colon (shell form only)
//!
//! The scanner takes the leftmost match over all forms of a grammar; when two
//! forms match at the same offset the earlier one wins.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::data::annotation::{MarkerKind, KEYWORD_ALTERNATION};
use crate::error::TodoscanError;
use crate::Result;

/// Language families with a distinct comment syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    CStyle,
    Xml,
    PowerShell,
    Shell,
    Markdown,
    Sql,
    Python,
}

impl Family {
    pub const ALL: [Family; 7] = [
        Family::CStyle,
        Family::Xml,
        Family::PowerShell,
        Family::Shell,
        Family::Markdown,
        Family::Sql,
        Family::Python,
    ];

    /// Normalised keys (extensions or bare file names) handled by this family.
    pub fn keys(self) -> &'static [&'static str] {
        match self {
            Family::CStyle => &["cs", "json", "jsonc"],
            Family::Xml => &["axaml", "xaml", "xml", "csproj", "props"],
            Family::PowerShell => &["ps1", "psm"],
            Family::Shell => &["sh", "yaml", "yml", "Dockerfile", "editorconfig"],
            Family::Markdown => &["md"],
            Family::Sql => &["sql"],
            Family::Python => &["py"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Family::CStyle => "C-style",
            Family::Xml => "XML",
            Family::PowerShell => "PowerShell",
            Family::Shell => "Shell",
            Family::Markdown => "Markdown",
            Family::Sql => "SQL",
            Family::Python => "Python",
        }
    }
}

/// Whether a form spans lines or ends at the line break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    Block,
    Line,
}

/// One comment form of a grammar.
#[derive(Debug)]
pub struct CommentForm {
    pub style: CommentStyle,
    pub pattern: Regex,
    /// Start of the next same-style marker; the body is cut there
    pub stop: Option<Regex>,
}

impl CommentForm {
    fn block(pattern: &str) -> Self {
        Self {
            style: CommentStyle::Block,
            pattern: compile(pattern),
            stop: None,
        }
    }

    fn line(pattern: &str, stop: Option<&str>) -> Self {
        Self {
            style: CommentStyle::Line,
            pattern: compile(pattern),
            stop: stop.map(compile),
        }
    }

    /// Offset of the next marker inside `body`, if the form has a stop.
    pub fn stop_in(&self, body: &str) -> Option<usize> {
        let stop = self.stop.as_ref()?;
        stop.find_iter(body)
            .find(|m| ends_keyword(body, m.end()))
            .map(|m| m.start())
    }
}

/// The compiled recogniser for one language family.
#[derive(Debug)]
pub struct Grammar {
    pub family: Family,
    pub forms: Vec<CommentForm>,
    /// Kind used when a match has no keyword
    pub default_kind: Option<MarkerKind>,
}

struct GrammarTable {
    grammars: Vec<Grammar>,
    by_key: HashMap<&'static str, usize>,
}

static TABLE: OnceLock<GrammarTable> = OnceLock::new();

fn table() -> &'static GrammarTable {
    TABLE.get_or_init(|| {
        let grammars: Vec<Grammar> = Family::ALL.iter().map(|&f| Grammar::build(f)).collect();
        let by_key = Family::ALL
            .iter()
            .enumerate()
            .flat_map(|(index, family)| family.keys().iter().map(move |&key| (key, index)))
            .collect();
        GrammarTable { grammars, by_key }
    })
}

impl Grammar {
    /// Look up the grammar for a normalised key (`cs`, `Dockerfile`, ...).
    ///
    /// A single leading dot is ignored, so `.cs` and `cs` are the same key.
    pub fn for_key(key: &str) -> Result<&'static Grammar> {
        let key = key.strip_prefix('.').unwrap_or(key);
        let table = table();
        table
            .by_key
            .get(key)
            .map(|&index| &table.grammars[index])
            .ok_or_else(|| TodoscanError::UnsupportedFileType {
                extension: key.to_string(),
            })
    }

    /// Look up the grammar for a file path by its extension, or by its bare
    /// file name when it has none.
    pub fn for_path(path: &Path) -> Result<&'static Grammar> {
        Self::for_key(&key_for_path(path))
    }

    /// Whether some grammar handles this path.
    pub fn supports(path: &Path) -> bool {
        table().by_key.contains_key(key_for_path(path).as_str())
    }

    /// Every key with a registered grammar.
    pub fn supported_keys() -> Vec<&'static str> {
        Family::ALL.iter().flat_map(|f| f.keys().iter().copied()).collect()
    }

    fn build(family: Family) -> Grammar {
        let level = format!(r"(?P<Level>{})", KEYWORD_ALTERNATION);
        let any = format!(r"(?:{})", KEYWORD_ALTERNATION);

        let forms = match family {
            Family::CStyle => vec![
                CommentForm::block(&c_block(&level)),
                CommentForm::line(
                    &[r"//[ ]*", &level, r":? ?(?P<Content>[^\n]*)"].concat(),
                    Some(&[r"// ?", &any].concat()),
                ),
            ],
            Family::Sql => vec![
                CommentForm::block(&c_block(&level)),
                CommentForm::line(
                    &[r"--[ ]*", &level, r":? ?(?P<Content>[^\n]*)"].concat(),
                    Some(&[r"-- ?", &any].concat()),
                ),
            ],
            Family::Python => vec![
                CommentForm::block(
                    &[
                        r#"(?P<MultiLineOpen>""")[\s*]*"#,
                        &level,
                        r#":? ?(?P<Content>(?s:.*?))[ ]*(?:(?P<MultiLineClose>""")|\z)"#,
                    ]
                    .concat(),
                ),
                CommentForm::line(
                    &[r"#[ ]*", &level, r":? ?(?P<Content>[^\n]*)"].concat(),
                    Some(&[r"# ?", &any].concat()),
                ),
            ],
            Family::PowerShell => vec![
                CommentForm::block(
                    &[
                        r"(?P<MultiLineOpen><#\s*#?)[ ]*",
                        &level,
                        r":? ?(?P<Content>(?s:.*?))(?:(?P<MultiLineClose>\s*#>)|\z)",
                    ]
                    .concat(),
                ),
                CommentForm::line(&[r"#[ ]*", &level, r":? ?(?P<Content>[^\n]*)"].concat(), None),
            ],
            Family::Xml => vec![CommentForm::block(
                &[
                    r"(?P<MultiLineOpen><!--)[ \t]*",
                    &level,
                    r"(?: *: *(?P<Content>(?s:.*?)))?\s*(?:(?P<MultiLineClose>-->)|\z)",
                ]
                .concat(),
            )],
            Family::Shell => vec![CommentForm::line(
                &[
                    r"#[ ]*",
                    &level,
                    r"(?:: *(?P<Content>[^\n]*)|(?P<Tail>[^\n]*))",
                ]
                .concat(),
                Some(&[r"# *", &any].concat()),
            )],
            Family::Markdown => vec![CommentForm::line(
                &[
                    r"^[ \t]*- \[ \][ ]+(?:",
                    &level,
                    r")?:? *(?P<Content>[^\n]+(?:\n {2,}[a-zA-Z0-9][^\n]*)*)",
                ]
                .concat(),
                None,
            )],
        };

        let default_kind = match family {
            Family::Markdown => Some(MarkerKind::Todo),
            _ => None,
        };

        Grammar {
            family,
            forms,
            default_kind,
        }
    }
}

/// A keyword ends at `at` unless a letter follows it; digits and
/// punctuation may. The regex crate has no lookahead, so matches are
/// checked with this after the fact.
pub fn ends_keyword(text: &str, at: usize) -> bool {
    !text[at..].starts_with(|c: char| c.is_ascii_alphabetic())
}

/// `/* ... */` with an end-of-file fallback when the block is never closed.
fn c_block(level: &str) -> String {
    [
        r"(?P<MultiLineOpen>/\*+)[\s*]*",
        level,
        r":? ?(?P<Content>(?s:.*?))[ ]*(?:(?P<MultiLineClose>\*/)|\z)",
    ]
    .concat()
}

/// Multi-line mode so `^` and `$` anchor to lines of the whole-file buffer.
fn compile(pattern: &str) -> Regex {
    Regex::new(&format!("(?m){}", pattern)).expect("built-in grammar pattern must compile")
}

/// Extension without its dot, or the file name for extension-less files.
///
/// Dot files such as `.editorconfig` have no extension and map to their
/// name minus the dot.
pub fn key_for_path(path: &Path) -> String {
    match path.extension() {
        Some(ext) => ext.to_string_lossy().to_string(),
        None => path
            .file_name()
            .map(|name| {
                let name = name.to_string_lossy();
                name.strip_prefix('.').unwrap_or(&name).to_string()
            })
            .unwrap_or_default(),
    }
}
