//! Marker scanner.
//!
//! Runs a file's grammar over the whole text buffer in one pass, so block
//! comments span lines naturally, and converts every match into an
//! [`Annotation`] with exact start/end positions.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Captures;

use crate::data::annotation::{Annotation, FileScan};
use crate::data::grammar::{ends_keyword, CommentStyle, Grammar};
use crate::data::position::PositionIndex;
use crate::error::TodoscanError;
use crate::Result;

/// Scan a file on disk.
///
/// The grammar is resolved from the path before anything is read, so an
/// unsupported file fails with [`TodoscanError::UnsupportedFileType`] without
/// touching the file. Invalid UTF-8 sequences are replaced rather than
/// rejected.
pub fn scan_file(path: &Path) -> Result<FileScan> {
    let grammar = Grammar::for_path(path)?;
    let bytes = fs::read(path).map_err(|e| TodoscanError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    let annotations: Vec<Annotation> = MarkerScanner::new(grammar, path, &text).collect();
    tracing::debug!(path = %path.display(), found = annotations.len(), "scanned file");
    Ok(FileScan::new(path, annotations))
}

/// Scan text that is already in memory, using the grammar for `path`.
pub fn scan_text(path: impl AsRef<Path>, text: &str) -> Result<Vec<Annotation>> {
    let path = path.as_ref();
    let grammar = Grammar::for_path(path)?;
    Ok(MarkerScanner::new(grammar, path, text).collect())
}

/// Iterator over the annotations of one text buffer, in source order.
pub struct MarkerScanner<'t> {
    grammar: &'static Grammar,
    path: PathBuf,
    text: &'t str,
    index: PositionIndex<'t>,
    cursor: usize,
    /// Next match of each form at or after `cursor`
    pending: Vec<Option<Captures<'t>>>,
    exhausted: Vec<bool>,
}

impl<'t> MarkerScanner<'t> {
    pub fn new(grammar: &'static Grammar, path: &Path, text: &'t str) -> Self {
        let forms = grammar.forms.len();
        Self {
            grammar,
            path: path.to_path_buf(),
            text,
            index: PositionIndex::new(text),
            cursor: 0,
            pending: (0..forms).map(|_| None).collect(),
            exhausted: vec![false; forms],
        }
    }

    /// Leftmost match over all forms; the earlier form wins a tie.
    fn next_match(&mut self) -> Option<(usize, Captures<'t>)> {
        let mut best: Option<(usize, usize)> = None;

        for (i, form) in self.grammar.forms.iter().enumerate() {
            if self.exhausted[i] {
                continue;
            }
            let stale = match &self.pending[i] {
                Some(caps) => whole(caps).0 < self.cursor,
                None => true,
            };
            if stale {
                self.pending[i] = form.pattern.captures_at(self.text, self.cursor);
                if self.pending[i].is_none() {
                    self.exhausted[i] = true;
                    continue;
                }
            }
            if let Some(caps) = &self.pending[i] {
                let start = whole(caps).0;
                if best.map_or(true, |(_, best_start)| start < best_start) {
                    best = Some((i, start));
                }
            }
        }

        let (i, _) = best?;
        self.pending[i].take().map(|caps| (i, caps))
    }

    /// Turn one match into an annotation and advance the cursor.
    ///
    /// Returns `None` for a rejected match, after moving the cursor past its
    /// keyword so the search resumes behind it.
    fn accept(&mut self, form_index: usize, caps: &Captures<'t>) -> Option<Annotation> {
        let form = &self.grammar.forms[form_index];
        let text = self.text;
        let (_, match_end) = whole(caps);
        let mut level = caps.name("Level").filter(|m| !m.as_str().is_empty());
        let mut content = caps.name("Content").map(|m| (m.start(), m.as_str()));

        if let Some(m) = level.filter(|m| !ends_keyword(text, m.end())) {
            if self.grammar.default_kind.is_none() {
                self.cursor = m.end();
                return None;
            }
            // optional keyword glued to a word: the whole word is body text
            let end = content.map_or(m.end(), |(start, raw)| start + raw.len());
            content = Some((m.start(), &text[m.start()..end]));
            level = None;
        }

        if let Some(tail) = caps.name("Tail") {
            self.cursor = tail.start();
            let rest = tail.as_str().trim_start();
            let ends_here = rest.trim_end().is_empty() || form.stop_in(rest) == Some(0);
            if !ends_here {
                return None;
            }
        } else {
            self.cursor = match_end;
        }

        let kind = match level {
            Some(m) => m.as_str().parse().ok()?,
            None => self.grammar.default_kind.clone()?,
        };

        let (content_start, mut raw) =
            content.unwrap_or_else(|| (level.map_or(match_end, |m| m.end()), ""));

        if let Some(stop) = form.stop_in(raw) {
            raw = &raw[..stop];
            self.cursor = content_start + stop;
        }

        if form.style == CommentStyle::Block && caps.name("MultiLineClose").is_none() {
            tracing::warn!(
                path = %self.path.display(),
                at = %self.index.locate_char(whole(caps).0),
                "unclosed block comment runs to end of file"
            );
        }

        let body = raw.trim_end();
        if level.is_none() && body.is_empty() {
            return None;
        }
        let start = self
            .index
            .locate_char(level.map_or(content_start, |m| m.start()));
        let end = if body.is_empty() {
            self.index.locate(level.map_or(content_start, |m| m.end()))
        } else {
            self.index.locate(content_start + body.len())
        };

        Some(Annotation {
            text: body.to_string(),
            kind,
            file_path: self.path.clone(),
            start,
            end,
        })
    }
}

impl<'t> Iterator for MarkerScanner<'t> {
    type Item = Annotation;

    fn next(&mut self) -> Option<Annotation> {
        loop {
            let (form_index, caps) = self.next_match()?;
            if let Some(annotation) = self.accept(form_index, &caps) {
                return Some(annotation);
            }
        }
    }
}

fn whole(caps: &Captures<'_>) -> (usize, usize) {
    caps.get(0).map_or((0, 0), |m| (m.start(), m.end()))
}
