//! The StyleType grammar.
//!
//! Fourteen immutable [`StyleType`]s describe every line shape a script can contain: how it is
//! recognized, which block format it receives, and how its text is rendered for a given display
//! style. The classifier in [`crate::classify`] decides which one applies in context; this module
//! only holds the table.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use superscript_core::FormatChange;

/// Semantic classification of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeName {
    /// A line with no text.
    EmptyLine,
    /// `Characters`, `Notes`, `Outline` or `Summary`.
    SpecialHeading,
    /// Markdown heading or horizontal rule.
    Marker,
    /// `PAGE`, `PAGES 3-5`, `2 pages`...
    PageHeading,
    /// `Panel`, `Panels 2-3`...
    PanelHeading,
    /// `NAME:` optionally followed by a parenthetical.
    CharacterHeading,
    /// Indented line spoken by the current character.
    Dialog,
    /// Anything else.
    Plain,
}

/// How page headings are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageHeadingStyle {
    /// `THREE — FOUR`
    Longhand,
    /// `PAGES THREE — FOUR`
    PageAndLonghand,
    /// `PAGES 3-4`
    #[default]
    PageAndNumerals,
    /// `3-4`
    Numerals,
}

/// How panel headings are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelHeadingStyle {
    /// `Panel 2`
    #[default]
    PanelAndNumerals,
    /// `Panel 4.2`
    PanelAndNumeralsWithPage,
    /// `2.`
    NumeralAndDot,
    /// `4.2`
    NumeralWithPage,
    /// `2)`
    NumeralAndParenthesis,
}

/// How character headings are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CharacterHeadingStyle {
    /// `JOHN:`
    Name,
    /// `1. JOHN:`
    #[default]
    NumeralAndName,
}

/// How dialog is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DialogStyle {
    /// As typed.
    #[default]
    Normal,
    /// Upper-cased.
    AllCaps,
}

/// A display style handed to [`StyleType::transform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStyle {
    /// Page heading style.
    Page(PageHeadingStyle),
    /// Panel heading style.
    Panel(PanelHeadingStyle),
    /// Character heading style.
    Character(CharacterHeadingStyle),
    /// Dialog style.
    Dialog(DialogStyle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transform {
    Identity,
    PageHeading,
    PanelHeading,
    CharacterHeading,
    Dialog,
    TitleCase,
    CapitalizeFirst,
}

/// An immutable grammar rule: recognition pattern, semantic name, canonical format and display
/// transform.
pub struct StyleType {
    name: TypeName,
    pattern: Regex,
    format: FormatChange,
    marker_level: u8,
    transform: Transform,
}

impl fmt::Debug for StyleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleType")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .field("header", &self.format.header)
            .finish()
    }
}

impl PartialEq for StyleType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.pattern.as_str() == other.pattern.as_str()
    }
}

impl StyleType {
    fn new(name: TypeName, pattern: &str, format: FormatChange, transform: Transform) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("grammar patterns are static and valid"),
            format,
            marker_level: 0,
            transform,
        }
    }

    fn marker(level: u8, pattern: &str) -> Self {
        let mut style = Self::new(
            TypeName::Marker,
            pattern,
            FormatChange::reset().header(level).offpage(true),
            Transform::CapitalizeFirst,
        );
        style.marker_level = level;
        style
    }

    /// Semantic name.
    pub fn name(&self) -> TypeName {
        self.name
    }

    /// Recognition pattern.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Returns `true` if `text` has this rule's shape (context is not considered).
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Canonical block format applied to matching lines.
    pub fn format(&self) -> &FormatChange {
        &self.format
    }

    /// Heading level applied by this rule (`0` when none).
    pub fn header(&self) -> u8 {
        self.format.header.unwrap_or(0)
    }

    /// Returns `true` for dialog.
    pub fn blockquote(&self) -> bool {
        self.format.blockquote.unwrap_or(false)
    }

    /// Markdown heading level for markers (`0` for other rules).
    pub fn marker_level(&self) -> u8 {
        self.marker_level
    }

    /// Render `text` for display.
    ///
    /// `number` is the page number for panel styles that include it, and the sequence number for
    /// numbered character headings. Styles that do not apply to this rule are ignored.
    pub fn transform(&self, text: &str, style: Option<DisplayStyle>, number: Option<u32>) -> String {
        match self.transform {
            Transform::Identity => text.to_string(),
            Transform::PageHeading => {
                let style = match style {
                    Some(DisplayStyle::Page(style)) => style,
                    _ => PageHeadingStyle::default(),
                };
                transform_page_heading(text, style)
            }
            Transform::PanelHeading => {
                let style = match style {
                    Some(DisplayStyle::Panel(style)) => style,
                    _ => PanelHeadingStyle::default(),
                };
                transform_panel_heading(text, style, number.unwrap_or(1))
            }
            Transform::CharacterHeading => {
                let upper = text.to_uppercase();
                match (style, number) {
                    (
                        Some(DisplayStyle::Character(CharacterHeadingStyle::NumeralAndName)),
                        Some(n),
                    ) => format!("{n}. {upper}"),
                    _ => upper,
                }
            }
            Transform::Dialog => match style {
                Some(DisplayStyle::Dialog(DialogStyle::AllCaps)) => text.to_uppercase(),
                _ => text.to_string(),
            },
            Transform::TitleCase => {
                let mut chars = text.chars();
                match chars.next() {
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                    None => String::new(),
                }
            }
            Transform::CapitalizeFirst => capitalize_first(text),
        }
    }
}

pub(crate) fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub(crate) fn numbers_in(text: &str) -> Vec<&str> {
    static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));
    DIGITS.find_iter(text).map(|m| m.as_str()).collect()
}

fn transform_page_heading(text: &str, style: PageHeadingStyle) -> String {
    let numbers = numbers_in(text);
    if numbers.is_empty() {
        return text.to_string();
    }
    let plural = if numbers.len() > 1 { "S" } else { "" };
    let longhand = || {
        numbers
            .iter()
            .map(|n| n.parse::<u64>().map(number_to_words).unwrap_or_else(|_| n.to_string()))
            .map(|words| words.to_uppercase())
            .collect::<Vec<_>>()
            .join(" — ")
    };

    match style {
        PageHeadingStyle::Longhand => longhand(),
        PageHeadingStyle::PageAndLonghand => format!("PAGE{plural} {}", longhand()),
        PageHeadingStyle::PageAndNumerals => format!("PAGE{plural} {}", numbers.join("-")),
        PageHeadingStyle::Numerals => numbers.join("-"),
    }
}

fn transform_panel_heading(text: &str, style: PanelHeadingStyle, page_number: u32) -> String {
    let numbers = numbers_in(text);
    if numbers.is_empty() {
        return text.to_string();
    }
    let plural = if numbers.len() > 1 { "s" } else { "" };
    let joined = numbers.join("-");

    match style {
        PanelHeadingStyle::PanelAndNumerals => format!("Panel{plural} {joined}"),
        PanelHeadingStyle::PanelAndNumeralsWithPage => {
            format!("Panel{plural} {page_number}.{joined}")
        }
        PanelHeadingStyle::NumeralAndDot => format!("{joined}."),
        PanelHeadingStyle::NumeralWithPage => format!("{page_number}.{joined}"),
        PanelHeadingStyle::NumeralAndParenthesis => format!("{joined})"),
    }
}

/// Spell out a number in English (`21` → `twenty-one`).
pub fn number_to_words(n: u64) -> String {
    const ONES: [&str; 20] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
        "nineteen",
    ];
    const TENS: [&str; 10] = [
        "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
    ];
    const SCALES: [(u64, &str); 4] = [
        (1_000_000_000_000, "trillion"),
        (1_000_000_000, "billion"),
        (1_000_000, "million"),
        (1_000, "thousand"),
    ];

    fn below_thousand(n: u64) -> String {
        let mut parts = Vec::new();
        let hundreds = n / 100;
        let rest = n % 100;
        if hundreds > 0 {
            parts.push(format!("{} hundred", ONES[hundreds as usize]));
        }
        if rest > 0 {
            if rest < 20 {
                parts.push(ONES[rest as usize].to_string());
            } else if rest % 10 == 0 {
                parts.push(TENS[(rest / 10) as usize].to_string());
            } else {
                parts.push(format!(
                    "{}-{}",
                    TENS[(rest / 10) as usize],
                    ONES[(rest % 10) as usize]
                ));
            }
        }
        parts.join(" ")
    }

    if n == 0 {
        return ONES[0].to_string();
    }

    let mut parts = Vec::new();
    let mut rest = n;
    for (scale, name) in SCALES {
        if rest >= scale {
            parts.push(format!("{} {name}", number_to_words(rest / scale)));
            rest %= scale;
        }
    }
    if rest > 0 {
        parts.push(below_thousand(rest));
    }
    parts.join(" ")
}

/// Empty line.
pub static EMPTY_LINE: LazyLock<StyleType> = LazyLock::new(|| {
    StyleType::new(TypeName::EmptyLine, r"^$", FormatChange::new(), Transform::Identity)
});

/// Page heading: `PAGE`, `PAGE 3`, `PAGES 3-5`, `2 PAGES`, optional trailing period.
pub static PAGE_HEADING: LazyLock<StyleType> = LazyLock::new(|| {
    StyleType::new(
        TypeName::PageHeading,
        r"(?i)^PAGES?\s*$|^PAGES?\s*\d+-?\d*\s*\.?\s*$|^\d+\s*PAGES?\s*$",
        FormatChange::reset().header(1),
        Transform::PageHeading,
    )
});

/// Panel heading: same shapes as page headings with `Panel`.
pub static PANEL_HEADING: LazyLock<StyleType> = LazyLock::new(|| {
    StyleType::new(
        TypeName::PanelHeading,
        r"(?i)^Panels?\s*$|^Panels?\s*\d+-?\d*\s*\.?\s*$|^\d+\s*Panels?\s*$",
        FormatChange::reset().header(2),
        Transform::PanelHeading,
    )
});

/// Character heading: `NAME:`, `NAME: (O.S.)`, or bare colons (recency shorthand).
pub static CHARACTER_HEADING: LazyLock<StyleType> = LazyLock::new(|| {
    StyleType::new(
        TypeName::CharacterHeading,
        r"^(?:[^\s:][^\n:]*)?:+\s*(?:\(.*\)|\[.*\])?\s*$",
        FormatChange::reset().header(3),
        Transform::CharacterHeading,
    )
});

/// Dialog: a line indented by a tab or two spaces.
pub static DIALOG: LazyLock<StyleType> = LazyLock::new(|| {
    StyleType::new(
        TypeName::Dialog,
        r"^(?:\s{2}|\t).*$",
        FormatChange::reset().blockquote(true),
        Transform::Dialog,
    )
});

/// Catch-all.
pub static PLAIN: LazyLock<StyleType> = LazyLock::new(|| {
    StyleType::new(
        TypeName::Plain,
        r"^",
        FormatChange::new().header(0).blockquote(false),
        Transform::Identity,
    )
});

/// Off-page section heading.
pub static SPECIAL_HEADING: LazyLock<StyleType> = LazyLock::new(|| {
    StyleType::new(
        TypeName::SpecialHeading,
        r"(?i)^(?:Characters|Notes|Outline|Summary)$",
        FormatChange::reset().header(1),
        Transform::TitleCase,
    )
});

/// Markdown `# heading`.
pub static MARKDOWN_H1: LazyLock<StyleType> = LazyLock::new(|| StyleType::marker(1, r"^#\s+\S"));
/// Markdown `## heading`.
pub static MARKDOWN_H2: LazyLock<StyleType> =
    LazyLock::new(|| StyleType::marker(2, r"^#{2}\s+\S+"));
/// Markdown `### heading`.
pub static MARKDOWN_H3: LazyLock<StyleType> =
    LazyLock::new(|| StyleType::marker(3, r"^#{3}\s+\S+"));
/// Markdown `#### heading`.
pub static MARKDOWN_H4: LazyLock<StyleType> =
    LazyLock::new(|| StyleType::marker(4, r"^#{4}\s+\S+"));
/// Markdown `##### heading`.
pub static MARKDOWN_H5: LazyLock<StyleType> =
    LazyLock::new(|| StyleType::marker(5, r"^#{5}\s+\S+"));
/// Markdown `###### heading`.
pub static MARKDOWN_H6: LazyLock<StyleType> =
    LazyLock::new(|| StyleType::marker(6, r"^#{6}\s+\S+"));

/// Horizontal rule: `---`, `***`, `___`.
pub static MARKDOWN_HR: LazyLock<StyleType> =
    LazyLock::new(|| StyleType::marker(1, r"^-{3,}$|^\*{3,}$|^_{3,}$"));

/// Markdown heading rules, `#` first.
pub fn markdown_headings() -> [&'static StyleType; 6] {
    [
        &*MARKDOWN_H1,
        &*MARKDOWN_H2,
        &*MARKDOWN_H3,
        &*MARKDOWN_H4,
        &*MARKDOWN_H5,
        &*MARKDOWN_H6,
    ]
}

/// The full grammar.
pub fn types() -> [&'static StyleType; 14] {
    [
        &*EMPTY_LINE,
        &*PAGE_HEADING,
        &*PANEL_HEADING,
        &*CHARACTER_HEADING,
        &*DIALOG,
        &*PLAIN,
        &*SPECIAL_HEADING,
        &*MARKDOWN_H1,
        &*MARKDOWN_H2,
        &*MARKDOWN_H3,
        &*MARKDOWN_H4,
        &*MARKDOWN_H5,
        &*MARKDOWN_H6,
        &*MARKDOWN_HR,
    ]
}

/// Context-free line type used by exporters: page, panel, character, dialog, else plain.
pub fn type_for_line(text: &str) -> &'static StyleType {
    [&*PAGE_HEADING, &*PANEL_HEADING, &*CHARACTER_HEADING, &*DIALOG]
        .into_iter()
        .find(|style| style.matches(text))
        .unwrap_or(&*PLAIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_heading_shapes() {
        for text in ["PAGE", "page", "PAGES 3-5", "PAGE 10.", "2 pages", "Page 4"] {
            assert!(PAGE_HEADING.matches(text), "{text}");
        }
        for text in ["PAGEANT", "PAGE three", "the page"] {
            assert!(!PAGE_HEADING.matches(text), "{text}");
        }
    }

    #[test]
    fn test_character_heading_shapes() {
        for text in ["JOHN:", "Mary Jane: (O.S.)", ":", "::", "BOB: [whispering]"] {
            assert!(CHARACTER_HEADING.matches(text), "{text}");
        }
        for text in ["JOHN: Hello there", " JOHN:", "note: something"] {
            assert!(!CHARACTER_HEADING.matches(text), "{text}");
        }
    }

    #[test]
    fn test_page_transforms() {
        assert_eq!(PAGE_HEADING.transform("PAGES 3-4", None, None), "PAGES 3-4");
        assert_eq!(
            PAGE_HEADING.transform("PAGES 3-4", Some(DisplayStyle::Page(PageHeadingStyle::Longhand)), None),
            "THREE — FOUR"
        );
        assert_eq!(
            PAGE_HEADING.transform(
                "PAGE 21",
                Some(DisplayStyle::Page(PageHeadingStyle::PageAndLonghand)),
                None
            ),
            "PAGE TWENTY-ONE"
        );
        assert_eq!(
            PAGE_HEADING.transform("PAGE 7", Some(DisplayStyle::Page(PageHeadingStyle::Numerals)), None),
            "7"
        );
    }

    #[test]
    fn test_panel_transforms() {
        let with_page = Some(DisplayStyle::Panel(PanelHeadingStyle::PanelAndNumeralsWithPage));
        assert_eq!(PANEL_HEADING.transform("Panel 2", with_page, Some(4)), "Panel 4.2");
        assert_eq!(
            PANEL_HEADING.transform(
                "Panels 2-3",
                Some(DisplayStyle::Panel(PanelHeadingStyle::NumeralAndParenthesis)),
                None
            ),
            "2-3)"
        );
    }

    #[test]
    fn test_text_transforms() {
        assert_eq!(SPECIAL_HEADING.transform("cHARACTERS", None, None), "Characters");
        assert_eq!(MARKDOWN_H1.transform("# act one", None, None), "# act one");
        assert_eq!(
            CHARACTER_HEADING.transform(
                "john:",
                Some(DisplayStyle::Character(CharacterHeadingStyle::NumeralAndName)),
                Some(2)
            ),
            "2. JOHN:"
        );
        assert_eq!(
            DIALOG.transform("  hi", Some(DisplayStyle::Dialog(DialogStyle::AllCaps)), None),
            "  HI"
        );
    }

    #[test]
    fn test_number_to_words() {
        assert_eq!(number_to_words(0), "zero");
        assert_eq!(number_to_words(13), "thirteen");
        assert_eq!(number_to_words(40), "forty");
        assert_eq!(number_to_words(105), "one hundred five");
        assert_eq!(number_to_words(2_021), "two thousand twenty-one");
    }

    #[test]
    fn test_type_for_line() {
        assert_eq!(type_for_line("PAGE 1").name(), TypeName::PageHeading);
        assert_eq!(type_for_line("Panel 2").name(), TypeName::PanelHeading);
        assert_eq!(type_for_line("JOHN:").name(), TypeName::CharacterHeading);
        assert_eq!(type_for_line("  Hello").name(), TypeName::Dialog);
        assert_eq!(type_for_line("A dark night.").name(), TypeName::Plain);
        assert_eq!(types().len(), 14);
    }
}
