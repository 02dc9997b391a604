//! Per-line reconciliation.
//!
//! Compares what a line currently looks like with what the classifier says it should look like
//! and produces the smallest edit: nothing, a format-only retain, or a replacement of the line
//! when its text is normalized.

use superscript_core::{Delta, FormatChange, LineFormat};

/// The edit that brings one line in line with its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinePatch {
    /// Already correct.
    Keep,
    /// Same text, different block format.
    Reformat(FormatChange),
    /// New text (and format) for the whole line.
    Replace {
        /// Replacement text, without the newline.
        text: String,
        /// Format of the replacement line.
        format: FormatChange,
    },
}

impl LinePatch {
    /// Append this patch for a line of `line_len` chars (newline excluded) to `delta`.
    pub fn append_to(self, delta: Delta, line_len: usize) -> Delta {
        match self {
            LinePatch::Keep => delta.retain(line_len + 1),
            LinePatch::Reformat(change) => delta.retain(line_len).retain_with(1, change),
            LinePatch::Replace { text, format } => {
                delta.insert_with(text + "\n", format).delete(line_len + 1)
            }
        }
    }
}

/// Every attribute of `format`, set explicitly.
pub fn full_change(format: &LineFormat) -> FormatChange {
    FormatChange {
        header: Some(format.header),
        blockquote: Some(format.blockquote),
        frontmatter: Some(format.frontmatter),
        offpage: Some(format.offpage),
        list: Some(format.list),
        panel_count: Some(format.panel_count),
        word_count: Some(format.word_count),
    }
}

/// Diff a line against its target.
///
/// After the patch is applied the line reads `target_text` and carries exactly `target`.
pub fn reconcile_line(
    current_text: &str,
    current: &LineFormat,
    target_text: &str,
    target: &LineFormat,
) -> LinePatch {
    if current_text != target_text {
        return LinePatch::Replace {
            text: target_text.to_string(),
            format: full_change(target),
        };
    }
    let change = full_change(target).relative_to(current);
    if change.is_empty() {
        LinePatch::Keep
    } else {
        LinePatch::Reformat(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use superscript_core::Document;

    #[test]
    fn test_identical_line_is_kept() {
        let format = LineFormat::heading(1);
        assert_eq!(reconcile_line("PAGE 1", &format, "PAGE 1", &format), LinePatch::Keep);
    }

    #[test]
    fn test_format_only_change_touches_changed_attributes() {
        let current = LineFormat {
            header: 2,
            word_count: Some(4),
            ..LineFormat::default()
        };
        let target = LineFormat {
            blockquote: true,
            ..LineFormat::default()
        };
        let patch = reconcile_line("  Hi", &current, "  Hi", &target);
        assert_eq!(
            patch,
            LinePatch::Reformat(
                FormatChange::new()
                    .header(0)
                    .blockquote(true)
                    .word_count(None)
            )
        );
    }

    #[test]
    fn test_text_change_replaces_line() {
        let document = Document::from_lines([("PAGE", LineFormat::plain()), ("x", LineFormat::plain())]);
        let patch = reconcile_line("PAGE", &LineFormat::plain(), "PAGE 1", &LineFormat::heading(1));
        assert!(matches!(patch, LinePatch::Replace { .. }));

        let delta = patch.append_to(Delta::new(), 4);
        let updated = document.with_delta(&delta).unwrap();
        assert_eq!(updated.text(), "PAGE 1\nx\n");
        assert_eq!(updated.line_format(0), Some(&LineFormat::heading(1)));
        assert_eq!(updated.line_format(1), Some(&LineFormat::plain()));
    }
}
