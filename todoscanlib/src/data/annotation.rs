//! Core data structures for scanned markers

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::position::Position;
use crate::error::TodoscanError;

/// Marker keywords shared by every grammar, as a regex alternation.
///
/// `NET` takes an optional one or two digit suffix (`NET7`, `NET48`).
pub const KEYWORD_ALTERNATION: &str = "TODO|NOTE|BUG|KILL|URGENT|NET[0-9]{0,2}";

/// The kind of a marker, i.e. its keyword.
///
/// Ordering follows the vocabulary (`TODO` first); `NET` variants sort by
/// their suffix text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MarkerKind {
    Todo,
    Note,
    Bug,
    Kill,
    Urgent,
    /// `NET` with its digit suffix kept verbatim (may be empty)
    Net(String),
}

impl MarkerKind {
    /// The keyword exactly as written in source.
    pub fn as_token(&self) -> String {
        match self {
            MarkerKind::Todo => "TODO".to_string(),
            MarkerKind::Note => "NOTE".to_string(),
            MarkerKind::Bug => "BUG".to_string(),
            MarkerKind::Kill => "KILL".to_string(),
            MarkerKind::Urgent => "URGENT".to_string(),
            MarkerKind::Net(suffix) => format!("NET{}", suffix),
        }
    }
}

impl FromStr for MarkerKind {
    type Err = TodoscanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TODO" => Ok(MarkerKind::Todo),
            "NOTE" => Ok(MarkerKind::Note),
            "BUG" => Ok(MarkerKind::Bug),
            "KILL" => Ok(MarkerKind::Kill),
            "URGENT" => Ok(MarkerKind::Urgent),
            _ => match s.strip_prefix("NET") {
                Some(suffix) if suffix.len() <= 2 && suffix.bytes().all(|b| b.is_ascii_digit()) => {
                    Ok(MarkerKind::Net(suffix.to_string()))
                }
                _ => Err(TodoscanError::InvalidMarkerKind(s.to_string())),
            },
        }
    }
}

impl TryFrom<String> for MarkerKind {
    type Error = TodoscanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MarkerKind> for String {
    fn from(kind: MarkerKind) -> Self {
        kind.as_token()
    }
}

impl std::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.as_token())
    }
}

/// One marker found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotation {
    /// Body after the keyword, trailing whitespace removed (may be empty)
    pub text: String,
    pub kind: MarkerKind,
    pub file_path: PathBuf,
    /// Keyword (or body) start
    pub start: Position,
    /// Last body character, or last keyword character when the body is empty
    pub end: Position,
}

impl Annotation {
    /// File name without its directory.
    pub fn file_name(&self) -> String {
        file_name_of(&self.file_path)
    }

    /// Whether the span covers more than one line.
    pub fn is_multi_line(&self) -> bool {
        self.start.line != self.end.line
    }

    /// `Name_LLLLLL:CCCCCC`, zero padded so string order is position order.
    pub fn sort_key(&self) -> String {
        format!(
            "{}_{:06}:{:06}",
            self.file_name(),
            self.start.line,
            self.start.column
        )
    }

    /// `Name L:C`, with `-L:C` appended for multi-line spans.
    pub fn location(&self) -> String {
        let mut location = format!("{} {}", self.file_name(), self.start);
        if self.is_multi_line() {
            location.push('-');
            location.push_str(&self.end.to_string());
        }
        location
    }

    /// Text safe for a single Markdown table cell.
    pub fn markdown_text(&self) -> String {
        escape_cell(&self.text)
    }
}

/// Escape `|` and line breaks so `text` stays inside one table cell.
pub fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "<br />")
}

/// Annotations of a single file, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileScan {
    pub path: PathBuf,
    pub annotations: Vec<Annotation>,
}

impl FileScan {
    pub fn new(path: impl Into<PathBuf>, annotations: Vec<Annotation>) -> Self {
        Self {
            path: path.into(),
            annotations,
        }
    }

    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Number of annotations of the given kind.
    pub fn count_kind(&self, kind: &MarkerKind) -> usize {
        self.annotations.iter().filter(|a| &a.kind == kind).count()
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
