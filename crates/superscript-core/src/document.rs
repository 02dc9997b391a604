//! Rich-text document model.
//!
//! A [`Document`] is a sequence of lines, each terminated by a newline that carries the line's
//! block [`LineFormat`]. The text lives in a [`Rope`] so line lookups stay `O(log n)` while the
//! structure analyzer walks the document on every keystroke burst; formats live in a parallel
//! vector with exactly one entry per newline.
//!
//! Invariant: the text is never empty and always ends with `\n` (an empty document is a single
//! empty line), matching what rich-text hosts expose.

use crate::delta::{Delta, DeltaOp};
use crate::error::DocumentError;
use crate::format::{FormatChange, LineFormat};
use crate::text::normalize_line_endings;
use ropey::Rope;
use std::ops::Range;

/// A caret or selection expressed as a start offset plus a length (both in chars).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionRange {
    /// Start character offset.
    pub index: usize,
    /// Selected length in chars (`0` for a caret).
    pub length: usize,
}

impl SelectionRange {
    /// Create a new selection range.
    pub fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }

    /// A collapsed selection (caret) at `index`.
    pub fn caret(index: usize) -> Self {
        Self { index, length: 0 }
    }

    /// Returns `true` if nothing is selected.
    pub fn is_collapsed(&self) -> bool {
        self.length == 0
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.index + self.length
    }
}

/// A borrowed view of one document line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    /// Zero-based line number.
    pub index: usize,
    /// Character offset of the first char of the line.
    pub start: usize,
    /// Line text without its terminating newline.
    pub text: String,
    /// Block attributes carried by the terminating newline.
    pub format: &'a LineFormat,
}

impl Line<'_> {
    /// Length of the line text in chars (excluding the newline).
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns `true` if the line has no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A rich-text document made of formatted lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    rope: Rope,
    formats: Vec<LineFormat>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document (one empty, unformatted line).
    pub fn new() -> Self {
        Self {
            rope: Rope::from_str("\n"),
            formats: vec![LineFormat::default()],
        }
    }

    /// Build a document from plain text; every line starts unformatted.
    pub fn from_text(text: &str) -> Self {
        let mut normalized = normalize_line_endings(text).into_owned();
        if !normalized.ends_with('\n') {
            normalized.push('\n');
        }
        let line_count = normalized.matches('\n').count();
        Self {
            rope: Rope::from_str(&normalized),
            formats: vec![LineFormat::default(); line_count],
        }
    }

    /// Build a document from `(text, format)` pairs, one per line.
    ///
    /// Newlines embedded in a line's text split it; the extra lines start unformatted.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = (S, LineFormat)>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        let mut formats = Vec::new();
        for (line, format) in lines {
            let line = normalize_line_endings(line.as_ref()).into_owned();
            for _ in line.matches('\n') {
                formats.push(LineFormat::default());
            }
            text.push_str(&line);
            text.push('\n');
            formats.push(format);
        }
        if formats.is_empty() {
            return Self::new();
        }
        Self {
            rope: Rope::from_str(&text),
            formats,
        }
    }

    /// Full document text, including the trailing newline.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Total length in chars (including every newline).
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.formats.len()
    }

    /// Text of line `index` without its newline.
    pub fn line_text(&self, index: usize) -> Option<String> {
        if index >= self.line_count() {
            return None;
        }
        let mut text = self.rope.line(index).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        Some(text)
    }

    /// Block format of line `index`.
    pub fn line_format(&self, index: usize) -> Option<&LineFormat> {
        self.formats.get(index)
    }

    /// Character offset at which line `index` starts.
    pub fn line_start(&self, index: usize) -> Option<usize> {
        (index < self.line_count()).then(|| self.rope.line_to_char(index))
    }

    /// Line number and column of a character offset.
    ///
    /// Returns `None` for offsets at or past the end of the document.
    pub fn line_at(&self, offset: usize) -> Option<(usize, usize)> {
        if offset >= self.char_count() {
            return None;
        }
        let line = self.rope.char_to_line(offset);
        Some((line, offset - self.rope.line_to_char(line)))
    }

    /// The line containing `offset`, as a borrowed view.
    pub fn line_view_at(&self, offset: usize) -> Option<Line<'_>> {
        let (line, _) = self.line_at(offset)?;
        self.line(line)
    }

    /// Line `index` as a borrowed view.
    pub fn line(&self, index: usize) -> Option<Line<'_>> {
        Some(Line {
            index,
            start: self.line_start(index)?,
            text: self.line_text(index)?,
            format: self.formats.get(index)?,
        })
    }

    /// Block format of the line containing `offset`.
    pub fn format_at(&self, offset: usize) -> Option<&LineFormat> {
        let (line, _) = self.line_at(offset)?;
        self.formats.get(line)
    }

    /// Text between two char offsets (clamped to the document).
    pub fn slice(&self, start: usize, end: usize) -> String {
        let len = self.char_count();
        let end = end.min(len);
        let start = start.min(end);
        self.rope.slice(start..end).to_string()
    }

    /// Iterate over all lines in order.
    pub fn lines(&self) -> impl Iterator<Item = Line<'_>> + '_ {
        (0..self.line_count()).filter_map(move |index| self.line(index))
    }

    /// Copy of the lines in `range` (clamped) as a standalone document.
    pub fn slice_lines(&self, range: Range<usize>) -> Document {
        let end = range.end.min(self.line_count());
        let start = range.start.min(end);
        Document::from_lines(
            (start..end)
                .filter_map(|index| Some((self.line_text(index)?, self.formats.get(index)?.clone()))),
        )
    }

    /// Check that `selection` fits inside the document.
    pub fn validate_selection(&self, selection: SelectionRange) -> Result<(), DocumentError> {
        let len = self.char_count();
        if selection.end() > len {
            return Err(DocumentError::InvalidSelection {
                index: selection.index,
                length: selection.length,
                len,
            });
        }
        Ok(())
    }

    /// Apply `delta` in place.
    ///
    /// The delta is validated before any mutation, so on error the document is unchanged.
    pub fn apply_delta(&mut self, delta: &Delta) -> Result<(), DocumentError> {
        let required = delta.base_len();
        let len = self.char_count();
        if required > len {
            return Err(DocumentError::OutOfBounds { required, len });
        }

        let mut position = 0usize;
        for op in delta.ops() {
            match op {
                DeltaOp::Retain { len, format } => {
                    if !format.is_empty() {
                        self.format_range(position, *len, format);
                    }
                    position += len;
                }
                DeltaOp::Insert { text, format } => {
                    self.insert_at(position, text, format);
                    position += op.len();
                }
                DeltaOp::Delete { len } => self.remove_range(position, *len),
            }
        }

        self.ensure_trailing_newline();
        Ok(())
    }

    /// Apply `delta` to a copy of this document.
    pub fn with_delta(&self, delta: &Delta) -> Result<Document, DocumentError> {
        let mut next = self.clone();
        next.apply_delta(delta)?;
        Ok(next)
    }

    fn insert_at(&mut self, position: usize, text: &str, format: &FormatChange) {
        let text = normalize_line_endings(text);
        self.rope.insert(position, &text);
        let line_format = format.to_format();
        for (i, ch) in text.chars().enumerate() {
            if ch == '\n' {
                // The new newline terminates the first half of the split line; the old newline
                // (and its format) moves down with the second half.
                let line = self.rope.char_to_line(position + i);
                self.formats.insert(line, line_format.clone());
            }
        }
    }

    fn remove_range(&mut self, position: usize, len: usize) {
        if len == 0 {
            return;
        }
        let end = position + len;
        let removed_newlines = self
            .rope
            .slice(position..end)
            .chars()
            .filter(|c| *c == '\n')
            .count();
        if removed_newlines > 0 {
            // Joining lines keeps the format of the surviving (last) newline.
            let first = self.rope.char_to_line(position);
            let last = (first + removed_newlines).min(self.formats.len());
            self.formats.drain(first..last);
        }
        self.rope.remove(position..end);
    }

    fn format_range(&mut self, position: usize, len: usize, change: &FormatChange) {
        let end = position + len;
        let mut line = self.rope.char_to_line(position);
        while line < self.formats.len() {
            let newline = self.rope.line_to_char(line + 1) - 1;
            if newline >= end {
                break;
            }
            self.formats[line] = change.apply_to(&self.formats[line]);
            line += 1;
        }
    }

    fn ensure_trailing_newline(&mut self) {
        let len = self.rope.len_chars();
        if len == 0 || self.rope.char(len - 1) != '\n' {
            self.rope.insert(len, "\n");
            self.formats.push(LineFormat::default());
        }
        // A trailing newline removed and re-added by the same delta can leave a stale count.
        let newline_count = self.rope.len_lines() - 1;
        self.formats.resize(newline_count, LineFormat::default());
    }
}
