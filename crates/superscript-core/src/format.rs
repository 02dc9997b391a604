//! Block-level line formats.
//!
//! Superscript only reasons about formatting that belongs to a whole line: the attributes a
//! rich-text host stores on a line's terminating newline (heading level, dialog blockquote,
//! frontmatter/offpage region flags, list membership and the panel/word count annotations shown
//! next to headings). Inline formatting is opaque to the analyzer and is not represented here.

/// The kind of list a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// Bulleted list item.
    Bullet,
    /// Ordered (numbered) list item.
    Ordered,
}

/// The complete set of block attributes of one line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineFormat {
    /// Heading level (`0` means "not a heading", `1..=6` otherwise).
    pub header: u8,
    /// Dialog lines are rendered as block quotes.
    pub blockquote: bool,
    /// The line belongs to the leading frontmatter block.
    pub frontmatter: bool,
    /// The line belongs to an off-page region (Characters, Notes, markdown sections...).
    pub offpage: bool,
    /// List membership, if any.
    pub list: Option<ListKind>,
    /// Panel count annotation displayed next to page headings.
    pub panel_count: Option<u32>,
    /// Word count annotation displayed next to page/panel/character headings.
    pub word_count: Option<u32>,
}

impl LineFormat {
    /// A plain line with no block attributes.
    pub fn plain() -> Self {
        Self::default()
    }

    /// A heading line of the given level.
    pub fn heading(level: u8) -> Self {
        Self {
            header: level.min(6),
            ..Self::default()
        }
    }

    /// Returns `true` if this line is rendered as a heading.
    pub fn is_heading(&self) -> bool {
        self.header > 0
    }

    /// Returns `true` if this line is part of a list.
    pub fn is_list(&self) -> bool {
        self.list.is_some()
    }
}

/// A partial update of a [`LineFormat`].
///
/// Each field is `None` when the attribute is left untouched and `Some(value)` when it is set.
/// For the optional attributes (`list`, counts) `Some(None)` clears the attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormatChange {
    /// New heading level.
    pub header: Option<u8>,
    /// New blockquote flag.
    pub blockquote: Option<bool>,
    /// New frontmatter flag.
    pub frontmatter: Option<bool>,
    /// New offpage flag.
    pub offpage: Option<bool>,
    /// New list membership.
    pub list: Option<Option<ListKind>>,
    /// New panel count annotation.
    pub panel_count: Option<Option<u32>>,
    /// New word count annotation.
    pub word_count: Option<Option<u32>>,
}

impl FormatChange {
    /// An empty change.
    pub fn new() -> Self {
        Self::default()
    }

    /// The reset attribute set: not a heading, not dialog, not frontmatter, no counts.
    pub fn reset() -> Self {
        Self {
            header: Some(0),
            blockquote: Some(false),
            frontmatter: Some(false),
            offpage: None,
            list: None,
            panel_count: Some(None),
            word_count: Some(None),
        }
    }

    /// Set the heading level.
    pub fn header(mut self, level: u8) -> Self {
        self.header = Some(level.min(6));
        self
    }

    /// Set the blockquote flag.
    pub fn blockquote(mut self, value: bool) -> Self {
        self.blockquote = Some(value);
        self
    }

    /// Set the frontmatter flag.
    pub fn frontmatter(mut self, value: bool) -> Self {
        self.frontmatter = Some(value);
        self
    }

    /// Set the offpage flag.
    pub fn offpage(mut self, value: bool) -> Self {
        self.offpage = Some(value);
        self
    }

    /// Set (or clear) list membership.
    pub fn list(mut self, kind: Option<ListKind>) -> Self {
        self.list = Some(kind);
        self
    }

    /// Set (or clear) the panel count annotation.
    pub fn panel_count(mut self, count: Option<u32>) -> Self {
        self.panel_count = Some(count);
        self
    }

    /// Set (or clear) the word count annotation.
    pub fn word_count(mut self, count: Option<u32>) -> Self {
        self.word_count = Some(count);
        self
    }

    /// Returns `true` if no attribute is touched.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply this change to `format`, returning the updated format.
    pub fn apply_to(&self, format: &LineFormat) -> LineFormat {
        LineFormat {
            header: self.header.unwrap_or(format.header),
            blockquote: self.blockquote.unwrap_or(format.blockquote),
            frontmatter: self.frontmatter.unwrap_or(format.frontmatter),
            offpage: self.offpage.unwrap_or(format.offpage),
            list: self.list.unwrap_or(format.list),
            panel_count: self.panel_count.unwrap_or(format.panel_count),
            word_count: self.word_count.unwrap_or(format.word_count),
        }
    }

    /// The format produced when this change is applied to a fresh line.
    pub fn to_format(&self) -> LineFormat {
        self.apply_to(&LineFormat::default())
    }

    /// Combine two sequential changes; attributes set by `later` win.
    pub fn merge(&self, later: &FormatChange) -> FormatChange {
        FormatChange {
            header: later.header.or(self.header),
            blockquote: later.blockquote.or(self.blockquote),
            frontmatter: later.frontmatter.or(self.frontmatter),
            offpage: later.offpage.or(self.offpage),
            list: later.list.or(self.list),
            panel_count: later.panel_count.or(self.panel_count),
            word_count: later.word_count.or(self.word_count),
        }
    }

    /// Returns `true` if applying this change to `format` would modify it.
    pub fn differs_from(&self, format: &LineFormat) -> bool {
        self.apply_to(format) != *format
    }

    /// Drop every attribute that already has the requested value in `format`.
    pub fn relative_to(&self, format: &LineFormat) -> FormatChange {
        FormatChange {
            header: self.header.filter(|v| *v != format.header),
            blockquote: self.blockquote.filter(|v| *v != format.blockquote),
            frontmatter: self.frontmatter.filter(|v| *v != format.frontmatter),
            offpage: self.offpage.filter(|v| *v != format.offpage),
            list: self.list.filter(|v| *v != format.list),
            panel_count: self.panel_count.filter(|v| *v != format.panel_count),
            word_count: self.word_count.filter(|v| *v != format.word_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_and_merge() {
        let base = LineFormat::heading(2);
        let change = FormatChange::new().blockquote(true).header(0);
        let applied = change.apply_to(&base);
        assert_eq!(applied.header, 0);
        assert!(applied.blockquote);

        let later = FormatChange::new().header(3);
        let merged = change.merge(&later);
        assert_eq!(merged.header, Some(3));
        assert_eq!(merged.blockquote, Some(true));
    }

    #[test]
    fn test_reset_clears_counts() {
        let base = LineFormat {
            header: 1,
            panel_count: Some(4),
            word_count: Some(12),
            ..LineFormat::default()
        };
        let reset = FormatChange::reset().apply_to(&base);
        assert_eq!(reset, LineFormat::default());
    }

    #[test]
    fn test_relative_to_drops_noops() {
        let format = LineFormat::heading(1);
        let change = FormatChange::new().header(1).blockquote(true);
        let relative = change.relative_to(&format);
        assert_eq!(relative, FormatChange::new().blockquote(true));
        assert!(!FormatChange::new().header(1).differs_from(&format));
    }
}
