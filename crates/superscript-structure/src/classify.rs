//! Context-sensitive line classification.
//!
//! [`classify`] is a pure function of a line's text, its current block format and a
//! [`LineContext`]; the structure builder owns all state that changes between lines (the offpage
//! flag, running numbers, the character recency set) and passes a snapshot in.
//!
//! Rules are tried in order, first match wins:
//!
//! 1. list lines are plain
//! 2. `P` or a page heading
//! 3. `p` or a panel heading (on-page only)
//! 4. character heading, with colon shorthand (on-page only)
//! 5. dialog (on-page only)
//! 6. `Characters` / `Notes` / `Outline` / `Summary`
//! 7. markdown `#` heading; `##`..`######` only once off-page
//! 8. horizontal rule
//! 9. plain

use crate::heading::{HeadingKind, HeadingNumber, format_heading_number};
use crate::recency::CharacterRecency;
use crate::types::{
    CHARACTER_HEADING, DIALOG, EMPTY_LINE, MARKDOWN_H1, MARKDOWN_HR, PAGE_HEADING, PANEL_HEADING,
    PLAIN, SPECIAL_HEADING, StyleType, TypeName, markdown_headings,
};
use regex::Regex;
use std::sync::LazyLock;
use superscript_core::LineFormat;

static CHARACTER_PARTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)(:+)\s*(.*)$").expect("valid regex"));

/// State the classifier needs from the lines above.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    /// Still inside the leading frontmatter block.
    pub frontmatter: bool,
    /// Inside an off-page section.
    pub offpage: bool,
    /// Number the next page heading takes unless it pins its own.
    pub next_page: u32,
    /// Number the next panel heading takes.
    pub next_panel: u32,
    /// Character names seen so far.
    pub characters: &'a CharacterRecency,
    /// The caret sits at the start of this line (before any shorthand colon).
    pub caret_at_line_start: bool,
}

impl<'a> LineContext<'a> {
    /// Context for the first body line of a script.
    pub fn new(characters: &'a CharacterRecency) -> Self {
        Self {
            frontmatter: false,
            offpage: false,
            next_page: 1,
            next_panel: 1,
            characters,
            caret_at_line_start: false,
        }
    }
}

/// What a classified line means for the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Blank line.
    Empty,
    /// Part of the frontmatter block.
    Frontmatter,
    /// Page heading with its resolved number.
    Page(HeadingNumber),
    /// Panel heading with its resolved number.
    Panel(HeadingNumber),
    /// Character heading.
    Character {
        /// Resolved name.
        name: String,
        /// Parenthetical or bracketed direction after the colon.
        parenthetical: Option<String>,
        /// The name came from the recency set (bare colons).
        shorthand: bool,
    },
    /// Dialog line.
    Dialog {
        /// Words spoken.
        words: u32,
    },
    /// Special heading, markdown `#` heading or horizontal rule: starts an off-page section.
    OffpageHeading,
    /// Markdown `##`..`######` heading inside an off-page section.
    Marker {
        /// Markdown level (2..=6).
        level: u8,
    },
    /// Anything else.
    Plain,
}

/// The result of classifying one line.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Grammar rule that matched.
    pub style: &'static StyleType,
    /// Outline meaning.
    pub kind: LineKind,
    /// Display text; differs from the raw text when the line is normalized.
    pub text: String,
}

impl Classification {
    fn new(style: &'static StyleType, kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            style,
            kind,
            text: text.into(),
        }
    }

    /// Semantic name of the matched rule.
    pub fn name(&self) -> TypeName {
        self.style.name()
    }

    /// Returns `true` if this line opens a new off-page section.
    pub fn starts_offpage(&self) -> bool {
        self.kind == LineKind::OffpageHeading
    }
}

/// Classify one line.
pub fn classify(text: &str, format: &LineFormat, ctx: &LineContext<'_>) -> Classification {
    if ctx.frontmatter {
        return Classification::new(&PLAIN, LineKind::Frontmatter, text);
    }
    if text.is_empty() {
        return Classification::new(&EMPTY_LINE, LineKind::Empty, text);
    }
    if format.is_list() {
        return Classification::new(&PLAIN, LineKind::Plain, text);
    }

    if text == "P" || PAGE_HEADING.matches(text) {
        let number = format_heading_number(HeadingKind::Page, text, ctx.next_page);
        let display = number.heading_text.clone();
        return Classification::new(&PAGE_HEADING, LineKind::Page(number), display);
    }

    if !ctx.offpage {
        if text == "p" || PANEL_HEADING.matches(text) {
            let number = format_heading_number(HeadingKind::Panel, text, ctx.next_panel);
            let display = number.heading_text.clone();
            return Classification::new(&PANEL_HEADING, LineKind::Panel(number), display);
        }
        if CHARACTER_HEADING.matches(text) {
            return classify_character(text, ctx);
        }
        if DIALOG.matches(text) {
            let words = word_count(text);
            return Classification::new(&DIALOG, LineKind::Dialog { words }, text);
        }
    }

    for style in [&*SPECIAL_HEADING, &*MARKDOWN_H1] {
        if style.matches(text) {
            let display = style.transform(text, None, None);
            return Classification::new(style, LineKind::OffpageHeading, display);
        }
    }
    if ctx.offpage {
        for style in markdown_headings().into_iter().skip(1) {
            if style.matches(text) {
                let level = style.marker_level();
                let display = style.transform(text, None, None);
                return Classification::new(style, LineKind::Marker { level }, display);
            }
        }
    }
    if MARKDOWN_HR.matches(text) {
        return Classification::new(&MARKDOWN_HR, LineKind::OffpageHeading, text);
    }

    Classification::new(&PLAIN, LineKind::Plain, text)
}

fn classify_character(text: &str, ctx: &LineContext<'_>) -> Classification {
    let Some(caps) = CHARACTER_PARTS.captures(text) else {
        return Classification::new(&PLAIN, LineKind::Plain, text);
    };
    let typed = &caps[1];
    let colons = caps[2].len();
    let parenthetical = Some(caps[3].to_string()).filter(|p| !p.is_empty());

    let (name, shorthand) = if !typed.is_empty() {
        (Some(typed.to_string()), false)
    } else if ctx.caret_at_line_start {
        (None, false)
    } else {
        (ctx.characters.nth_most_recent(colons).map(str::to_string), true)
    };

    match name {
        Some(name) => {
            let display = match &parenthetical {
                Some(p) => format!("{name}: {p}"),
                None => format!("{name}:"),
            };
            Classification::new(
                &CHARACTER_HEADING,
                LineKind::Character {
                    name,
                    parenthetical,
                    shorthand,
                },
                display,
            )
        }
        None => Classification::new(&PLAIN, LineKind::Plain, text),
    }
}

/// Count words: whitespace-delimited tokens containing at least one letter or digit.
pub fn word_count(text: &str) -> u32 {
    let count = text
        .split_whitespace()
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Returns `true` if `text` ends the frontmatter block.
pub fn is_first_heading(text: &str) -> bool {
    text.eq_ignore_ascii_case("p")
        || text == "---"
        || PAGE_HEADING.matches(text)
        || PANEL_HEADING.matches(text)
        || SPECIAL_HEADING.matches(text)
        || MARKDOWN_H1.matches(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn body(recency: &CharacterRecency) -> LineContext<'_> {
        LineContext::new(recency)
    }

    #[test]
    fn test_page_and_panel_headings() {
        let recency = CharacterRecency::new();
        let ctx = LineContext {
            next_page: 3,
            next_panel: 2,
            ..body(&recency)
        };

        let page = classify("P", &LineFormat::plain(), &ctx);
        assert_eq!(page.name(), TypeName::PageHeading);
        assert_eq!(page.text, "PAGE 3");

        let panel = classify("p", &LineFormat::plain(), &ctx);
        assert_eq!(panel.name(), TypeName::PanelHeading);
        assert_eq!(panel.text, "Panel 2");
    }

    #[test]
    fn test_list_lines_are_plain() {
        let recency = CharacterRecency::new();
        let format = LineFormat {
            list: Some(superscript_core::ListKind::Bullet),
            ..LineFormat::default()
        };
        let result = classify("PAGE", &format, &body(&recency));
        assert_eq!(result.kind, LineKind::Plain);
        assert_eq!(result.text, "PAGE");
    }

    #[test]
    fn test_offpage_disables_panels_characters_and_dialog() {
        let recency = CharacterRecency::new();
        let ctx = LineContext {
            offpage: true,
            ..body(&recency)
        };
        for text in ["Panel", "JOHN:", "  Hello"] {
            assert_eq!(classify(text, &LineFormat::plain(), &ctx).kind, LineKind::Plain);
        }
        assert_eq!(
            classify("## Act two", &LineFormat::plain(), &ctx).kind,
            LineKind::Marker { level: 2 }
        );
        assert_eq!(
            classify("PAGE", &LineFormat::plain(), &ctx).name(),
            TypeName::PageHeading
        );
    }

    #[test]
    fn test_markdown_subheadings_need_offpage() {
        let recency = CharacterRecency::new();
        let result = classify("## Act two", &LineFormat::plain(), &body(&recency));
        assert_eq!(result.kind, LineKind::Plain);
        let result = classify("# Act one", &LineFormat::plain(), &body(&recency));
        assert!(result.starts_offpage());
        assert_eq!(result.style.header(), 1);
    }

    #[test]
    fn test_special_heading_is_title_cased() {
        let recency = CharacterRecency::new();
        let result = classify("CHARACTERS", &LineFormat::plain(), &body(&recency));
        assert!(result.starts_offpage());
        assert_eq!(result.text, "Characters");
        assert!(classify("***", &LineFormat::plain(), &body(&recency)).starts_offpage());
    }

    #[test]
    fn test_character_shorthand() {
        let mut recency = CharacterRecency::new();
        recency.touch("JOHN");
        recency.touch("MARY");
        let ctx = body(&recency);

        assert_eq!(classify(":", &LineFormat::plain(), &ctx).text, "MARY:");
        assert_eq!(classify("::", &LineFormat::plain(), &ctx).text, "JOHN:");
        assert_eq!(classify(":::", &LineFormat::plain(), &ctx).kind, LineKind::Plain);
        assert_eq!(
            classify(": (O.S.)", &LineFormat::plain(), &ctx).text,
            "MARY: (O.S.)"
        );

        let at_start = LineContext {
            caret_at_line_start: true,
            ..ctx
        };
        assert_eq!(classify(":", &LineFormat::plain(), &at_start).kind, LineKind::Plain);
    }

    #[test]
    fn test_named_character_normalizes_colons() {
        let recency = CharacterRecency::new();
        let result = classify("JOHN:: (whispering)", &LineFormat::plain(), &body(&recency));
        assert_eq!(result.text, "JOHN: (whispering)");
        assert_eq!(
            result.kind,
            LineKind::Character {
                name: "JOHN".into(),
                parenthetical: Some("(whispering)".into()),
                shorthand: false,
            }
        );
    }

    #[test]
    fn test_dialog_counts_words() {
        let recency = CharacterRecency::new();
        let result = classify("  Well -- I never said so.", &LineFormat::plain(), &body(&recency));
        assert_eq!(result.kind, LineKind::Dialog { words: 5 });
        assert_eq!(word_count("\tone two  three"), 3);
    }

    #[test]
    fn test_classification_is_pure() {
        let mut recency = CharacterRecency::new();
        recency.touch("ALICE");
        let ctx = body(&recency);
        for text in ["PAGE", ":", "  Hi there", "Notes", "plain text"] {
            let first = classify(text, &LineFormat::plain(), &ctx);
            let second = classify(text, &LineFormat::plain(), &ctx);
            assert_eq!(first, second);
        }
        assert_eq!(recency.len(), 1);
    }

    #[test]
    fn test_first_heading_detection() {
        for text in ["P", "p", "PAGE 1", "Panel", "Summary", "# Title", "---"] {
            assert!(is_first_heading(text), "{text}");
        }
        for text in ["Title", "by Someone", "----", "## Sub"] {
            assert!(!is_first_heading(text), "{text}");
        }
    }
}
