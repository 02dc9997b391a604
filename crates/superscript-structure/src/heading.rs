//! Page and panel heading numbers.
//!
//! Headings are renumbered as the user types unless they pin a number themselves:
//!
//! - `PAGE 10.` keeps `10` (a trailing period pins the last number in the line).
//! - `PAGES 3-5` keeps its span and shifts it to start at the expected number.
//! - `2 pages` expands to a range of that many numbers starting at the expected number.
//! - anything else becomes `PAGE n` with the expected number.

use crate::types::{TypeName, numbers_in};
use regex::Regex;
use std::sync::LazyLock;

static RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\d]+(\d+)-(\d+)[^\d]*$").expect("valid regex"));

/// Which label a heading number is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingKind {
    /// `PAGE` / `PAGES`.
    Page,
    /// `Panel` / `Panels`.
    Panel,
}

impl HeadingKind {
    fn label(self, plural: bool) -> &'static str {
        match (self, plural) {
            (HeadingKind::Page, false) => "PAGE",
            (HeadingKind::Page, true) => "PAGES",
            (HeadingKind::Panel, false) => "Panel",
            (HeadingKind::Panel, true) => "Panels",
        }
    }
}

impl TryFrom<TypeName> for HeadingKind {
    type Error = TypeName;

    fn try_from(name: TypeName) -> Result<Self, Self::Error> {
        match name {
            TypeName::PageHeading => Ok(HeadingKind::Page),
            TypeName::PanelHeading => Ok(HeadingKind::Panel),
            other => Err(other),
        }
    }
}

/// A resolved heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingNumber {
    /// The number the heading ends on; the next heading continues from here.
    pub heading_number: u32,
    /// Normalized heading text.
    pub heading_text: String,
}

/// Resolve the number and display text of a page or panel heading.
///
/// `expected` is the next sequential number (previous heading's number plus one).
pub fn format_heading_number(kind: HeadingKind, text: &str, expected: u32) -> HeadingNumber {
    if text.ends_with('.') {
        let heading_number = numbers_in(text)
            .last()
            .and_then(|n| n.parse().ok())
            .unwrap_or(expected);
        let heading_text = match kind {
            HeadingKind::Page => text.trim().to_uppercase(),
            HeadingKind::Panel => text.trim().to_string(),
        };
        return HeadingNumber {
            heading_number,
            heading_text,
        };
    }

    if let Some(caps) = RANGE.captures(text) {
        let first: u32 = caps[1].parse().unwrap_or(expected);
        let last: u32 = caps[2].parse().unwrap_or(first);
        return span(kind, expected, last.saturating_sub(first));
    }

    if text.starts_with(|c: char| c.is_ascii_digit()) {
        let count: u32 = numbers_in(text)
            .first()
            .and_then(|n| n.parse().ok())
            .unwrap_or(1);
        return span(kind, expected, count.saturating_sub(1));
    }

    span(kind, expected, 0)
}

fn span(kind: HeadingKind, first: u32, extra: u32) -> HeadingNumber {
    if extra == 0 {
        return HeadingNumber {
            heading_number: first,
            heading_text: format!("{} {first}", kind.label(false)),
        };
    }
    let last = first.saturating_add(extra);
    HeadingNumber {
        heading_number: last,
        heading_text: format!("{} {first}-{last}", kind.label(true)),
    }
}
