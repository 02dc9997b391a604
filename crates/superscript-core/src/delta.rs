//! Structured document deltas.
//!
//! Every mutation of a Superscript document, whether typed by the user or produced by the
//! structure analyzer, is expressed as a [`Delta`]: an ordered sequence of retain / insert /
//! delete operations walked from the start of the document. Offsets and lengths are expressed in
//! **character offsets** (Unicode scalar values).
//!
//! Block formatting travels with the newline that terminates a line, so a `Retain` carrying a
//! [`FormatChange`] reformats every line whose newline falls inside the retained range, and an
//! `Insert` carrying a format assigns it to every newline it inserts.
//!
//! Besides the operation-based [`Delta`], this module keeps the flatter [`TextDelta`] used for
//! change notifications, where consumers only care about which text went in and out.

use crate::document::Document;
use crate::error::DocumentError;
use crate::format::FormatChange;

/// A single delta operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaOp {
    /// Insert `text`; newlines it contains receive `format`.
    Insert {
        /// Inserted text.
        text: String,
        /// Block format assigned to inserted newlines.
        format: FormatChange,
    },
    /// Keep `len` characters, applying `format` to the newlines among them.
    Retain {
        /// Retained length in chars.
        len: usize,
        /// Block format change (may be empty).
        format: FormatChange,
    },
    /// Remove `len` characters.
    Delete {
        /// Deleted length in chars.
        len: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    Insert,
    Retain,
    Delete,
}

impl DeltaOp {
    /// Length of the operation in chars.
    pub fn len(&self) -> usize {
        match self {
            DeltaOp::Insert { text, .. } => text.chars().count(),
            DeltaOp::Retain { len, .. } | DeltaOp::Delete { len } => *len,
        }
    }

    /// Returns `true` if the operation covers no characters.
    pub fn is_empty(&self) -> bool {
        match self {
            DeltaOp::Insert { text, .. } => text.is_empty(),
            DeltaOp::Retain { len, .. } | DeltaOp::Delete { len } => *len == 0,
        }
    }

    fn kind(&self) -> OpKind {
        match self {
            DeltaOp::Insert { .. } => OpKind::Insert,
            DeltaOp::Retain { .. } => OpKind::Retain,
            DeltaOp::Delete { .. } => OpKind::Delete,
        }
    }
}

/// An ordered list of [`DeltaOp`]s kept in canonical form.
///
/// Canonical form: no empty ops, adjacent compatible ops merged, and an insert never directly
/// follows a delete (it is moved in front of it, which describes the same change).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    ops: Vec<DeltaOp>,
}

impl Delta {
    /// Create an empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// The operations of this delta.
    pub fn ops(&self) -> &[DeltaOp] {
        &self.ops
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` if the delta has no operations at all.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Keep `len` characters unchanged.
    pub fn retain(self, len: usize) -> Self {
        self.retain_with(len, FormatChange::default())
    }

    /// Keep `len` characters and apply `format` to the newlines among them.
    pub fn retain_with(mut self, len: usize, format: FormatChange) -> Self {
        self.push(DeltaOp::Retain { len, format });
        self
    }

    /// Insert unformatted text.
    pub fn insert(self, text: impl Into<String>) -> Self {
        self.insert_with(text, FormatChange::default())
    }

    /// Insert text whose newlines receive `format`.
    pub fn insert_with(mut self, text: impl Into<String>, format: FormatChange) -> Self {
        self.push(DeltaOp::Insert {
            text: text.into(),
            format,
        });
        self
    }

    /// Remove `len` characters.
    pub fn delete(mut self, len: usize) -> Self {
        self.push(DeltaOp::Delete { len });
        self
    }

    /// Append an operation, merging it with the previous one when possible.
    pub fn push(&mut self, op: DeltaOp) {
        if op.is_empty() {
            return;
        }

        let mut index = self.ops.len();
        if let Some(last) = self.ops.last_mut() {
            match (last, &op) {
                (DeltaOp::Delete { len }, DeltaOp::Delete { len: more }) => {
                    *len += more;
                    return;
                }
                (DeltaOp::Delete { .. }, DeltaOp::Insert { .. }) => {
                    // Inserts sort before deletes at the same position.
                    index -= 1;
                }
                _ => {}
            }
        }

        if index > 0 {
            match (&mut self.ops[index - 1], &op) {
                (
                    DeltaOp::Insert { text, format },
                    DeltaOp::Insert {
                        text: more,
                        format: more_format,
                    },
                ) if format == more_format => {
                    text.push_str(more);
                    return;
                }
                (
                    DeltaOp::Retain { len, format },
                    DeltaOp::Retain {
                        len: more,
                        format: more_format,
                    },
                ) if format == more_format => {
                    *len += more;
                    return;
                }
                _ => {}
            }
        }

        if index == self.ops.len() {
            self.ops.push(op);
        } else {
            self.ops.insert(index, op);
        }
    }

    /// Drop a trailing retain that carries no format change.
    pub fn chop(mut self) -> Self {
        if let Some(DeltaOp::Retain { format, .. }) = self.ops.last()
            && format.is_empty()
        {
            self.ops.pop();
        }
        self
    }

    /// Returns `true` if applying this delta would leave any document unchanged.
    pub fn is_noop(&self) -> bool {
        self.ops.iter().all(|op| match op {
            DeltaOp::Retain { format, .. } => format.is_empty(),
            _ => false,
        })
    }

    /// Number of characters of the base document this delta walks over (retains + deletes).
    pub fn base_len(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                DeltaOp::Retain { len, .. } | DeltaOp::Delete { len } => *len,
                DeltaOp::Insert { .. } => 0,
            })
            .sum()
    }

    /// Net change in document length produced by this delta.
    pub fn change_len(&self) -> isize {
        self.ops
            .iter()
            .map(|op| match op {
                DeltaOp::Insert { .. } => op.len() as isize,
                DeltaOp::Delete { len } => -(*len as isize),
                DeltaOp::Retain { .. } => 0,
            })
            .sum()
    }

    /// Apply this delta to a copy of `document`.
    pub fn apply(&self, document: &Document) -> Result<Document, DocumentError> {
        document.with_delta(self)
    }

    /// Compose `self` followed by `other` into a single delta.
    ///
    /// Applying the result is equivalent to applying `self` and then `other`.
    pub fn compose(&self, other: &Delta) -> Delta {
        let mut this_iter = OpIter::new(&self.ops);
        let mut other_iter = OpIter::new(&other.ops);
        let mut out = Delta::new();

        while this_iter.has_next() || other_iter.has_next() {
            if other_iter.peek_kind() == OpKind::Insert {
                out.push(other_iter.next(usize::MAX));
                continue;
            }
            if this_iter.peek_kind() == OpKind::Delete {
                out.push(this_iter.next(usize::MAX));
                continue;
            }

            let len = this_iter.peek_len().min(other_iter.peek_len());
            let this_op = this_iter.next(len);
            let other_op = other_iter.next(len);

            match other_op {
                DeltaOp::Retain {
                    format: other_format,
                    ..
                } => match this_op {
                    DeltaOp::Retain { len, format } => out.push(DeltaOp::Retain {
                        len,
                        format: format.merge(&other_format),
                    }),
                    DeltaOp::Insert { text, format } => out.push(DeltaOp::Insert {
                        text,
                        format: format.merge(&other_format),
                    }),
                    DeltaOp::Delete { .. } => unreachable!("deletes are drained before retains"),
                },
                DeltaOp::Delete { len } => {
                    // Deleting freshly inserted text cancels both operations.
                    if let DeltaOp::Retain { .. } = this_op {
                        out.push(DeltaOp::Delete { len });
                    }
                }
                DeltaOp::Insert { .. } => unreachable!("inserts are drained first"),
            }
        }

        out.chop()
    }

    /// Map a character offset in the base document through this delta.
    ///
    /// Text inserted exactly at `index` pushes the position forward, which is what a caret
    /// sitting at the insertion point expects.
    pub fn transform_position(&self, index: usize) -> usize {
        let mut index = index;
        let mut offset = 0usize;
        for op in &self.ops {
            if offset > index {
                break;
            }
            match op {
                DeltaOp::Delete { len } => {
                    index -= (*len).min(index - offset);
                    continue;
                }
                DeltaOp::Insert { .. } => {
                    index += op.len();
                }
                DeltaOp::Retain { .. } => {}
            }
            offset += op.len();
        }
        index
    }
}

impl FromIterator<DeltaOp> for Delta {
    fn from_iter<I: IntoIterator<Item = DeltaOp>>(iter: I) -> Self {
        let mut delta = Delta::new();
        for op in iter {
            delta.push(op);
        }
        delta
    }
}

/// Cursor over a slice of ops that can hand out partial operations.
struct OpIter<'a> {
    ops: &'a [DeltaOp],
    index: usize,
    offset: usize,
}

impl<'a> OpIter<'a> {
    fn new(ops: &'a [DeltaOp]) -> Self {
        Self {
            ops,
            index: 0,
            offset: 0,
        }
    }

    fn has_next(&self) -> bool {
        self.index < self.ops.len()
    }

    fn peek_kind(&self) -> OpKind {
        self.ops
            .get(self.index)
            .map(DeltaOp::kind)
            .unwrap_or(OpKind::Retain)
    }

    fn peek_len(&self) -> usize {
        self.ops
            .get(self.index)
            .map(|op| op.len() - self.offset)
            .unwrap_or(usize::MAX)
    }

    fn next(&mut self, len: usize) -> DeltaOp {
        let Some(op) = self.ops.get(self.index) else {
            // Past the end every delta implicitly retains the rest of the document.
            return DeltaOp::Retain {
                len,
                format: FormatChange::default(),
            };
        };

        let offset = self.offset;
        let remaining = op.len() - offset;
        let take = len.min(remaining);
        if take == remaining {
            self.index += 1;
            self.offset = 0;
        } else {
            self.offset += take;
        }

        match op {
            DeltaOp::Insert { text, format } => DeltaOp::Insert {
                text: char_slice(text, offset, take).to_string(),
                format: format.clone(),
            },
            DeltaOp::Retain { format, .. } => DeltaOp::Retain {
                len: take,
                format: format.clone(),
            },
            DeltaOp::Delete { .. } => DeltaOp::Delete { len: take },
        }
    }
}

fn char_slice(text: &str, start: usize, len: usize) -> &str {
    let mut indices = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len()));
    let begin = indices.nth(start).unwrap_or(text.len());
    let end = if len == 0 {
        begin
    } else {
        indices.nth(len - 1).unwrap_or(text.len())
    };
    &text[begin..end]
}

/// A single text edit expressed in character offsets.
///
/// Semantics:
/// - `start` is a character offset in the document **at the time this edit is applied**.
/// - The deleted range is defined by the length (in `char`s) of `deleted_text`.
/// - Edits inside a [`TextDelta`] must be applied **in order** to transform the "before" document
///   into the "after" document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDeltaEdit {
    /// Start character offset of the edit.
    pub start: usize,
    /// Exact deleted text (may be empty).
    pub deleted_text: String,
    /// Exact inserted text (may be empty).
    pub inserted_text: String,
}

impl TextDeltaEdit {
    /// Length of `deleted_text` in characters.
    pub fn deleted_len(&self) -> usize {
        self.deleted_text.chars().count()
    }

    /// Length of `inserted_text` in characters.
    pub fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// Exclusive end character offset in the pre-edit document.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.deleted_len())
    }
}

/// A structured description of a document text change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDelta {
    /// Character count before applying `edits`.
    pub before_char_count: usize,
    /// Character count after applying `edits`.
    pub after_char_count: usize,
    /// Ordered list of edits that transforms the "before" document into the "after" document.
    pub edits: Vec<TextDeltaEdit>,
}

impl TextDelta {
    /// Describe the text effect of `delta` applied to `before`.
    ///
    /// Format-only retains produce no edits.
    pub fn from_delta(delta: &Delta, before: &Document) -> Self {
        let mut edits = Vec::new();
        let mut position = 0usize;
        let mut original = 0usize;

        for op in delta.ops() {
            match op {
                DeltaOp::Retain { len, .. } => {
                    position += len;
                    original += len;
                }
                DeltaOp::Insert { text, .. } => {
                    edits.push(TextDeltaEdit {
                        start: position,
                        deleted_text: String::new(),
                        inserted_text: text.clone(),
                    });
                    position += op.len();
                }
                DeltaOp::Delete { len } => {
                    edits.push(TextDeltaEdit {
                        start: position,
                        deleted_text: before.slice(original, original + len),
                        inserted_text: String::new(),
                    });
                    original += len;
                }
            }
        }

        let before_char_count = before.char_count();
        let after_char_count = (before_char_count as isize + delta.change_len()).max(0) as usize;

        Self {
            before_char_count,
            after_char_count,
            edits,
        }
    }

    /// Returns `true` if this delta contains no edits.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Returns `true` if any edit inserted a line break.
    pub fn contains_newline_insert(&self) -> bool {
        self.edits.iter().any(|e| e.inserted_text.contains('\n'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_push_merges_and_reorders() {
        let delta = Delta::new().retain(2).retain(3).delete(1).insert("a").insert("b");
        assert_eq!(
            delta.ops(),
            &[
                DeltaOp::Retain {
                    len: 5,
                    format: FormatChange::default()
                },
                DeltaOp::Insert {
                    text: "ab".to_string(),
                    format: FormatChange::default()
                },
                DeltaOp::Delete { len: 1 },
            ]
        );
    }

    #[test]
    fn test_compose_retain_formats_onto_insert() {
        let a = Delta::new().insert("PAGE\n");
        let b = Delta::new().retain_with(5, FormatChange::new().header(1));
        let composed = a.compose(&b);
        assert_eq!(
            composed.ops(),
            &[DeltaOp::Insert {
                text: "PAGE\n".to_string(),
                format: FormatChange::new().header(1)
            }]
        );
    }

    #[test]
    fn test_compose_delete_cancels_insert() {
        let a = Delta::new().retain(3).insert("xyz");
        let b = Delta::new().retain(4).delete(2);
        let composed = a.compose(&b);
        assert_eq!(composed, Delta::new().retain(3).insert("x"));
    }

    #[test]
    fn test_compose_merges_retain_formats() {
        let a = Delta::new().retain_with(4, FormatChange::new().header(1));
        let b = Delta::new()
            .retain(2)
            .retain_with(2, FormatChange::new().word_count(Some(7)));
        let composed = a.compose(&b);
        assert_eq!(
            composed,
            Delta::new()
                .retain_with(2, FormatChange::new().header(1))
                .retain_with(2, FormatChange::new().header(1).word_count(Some(7)))
        );
    }

    #[test]
    fn test_noop_detection() {
        assert!(Delta::new().retain(10).is_noop());
        assert!(Delta::new().is_noop());
        assert!(!Delta::new().retain_with(1, FormatChange::new().header(2)).is_noop());
        assert!(!Delta::new().delete(1).is_noop());
    }

    #[test]
    fn test_transform_position() {
        let delta = Delta::new().retain(2).insert("abc").delete(1);
        assert_eq!(delta.transform_position(0), 0);
        assert_eq!(delta.transform_position(2), 5);
        assert_eq!(delta.transform_position(4), 6);
    }

    #[test]
    fn test_char_slice_handles_multibyte() {
        assert_eq!(char_slice("héllo", 1, 3), "éll");
        assert_eq!(char_slice("héllo", 5, 0), "");
    }
}
