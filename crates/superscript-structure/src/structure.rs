//! Script outline data model.
//!
//! This module provides UI-agnostic types for:
//! - the page → panel → character outline of a script
//! - section numbering, including off-page sections slotted between real pages
//!
//! The goal is to give hosts a stable schema to build:
//! - outline trees and page navigators
//! - scroll-to-page and "current page" indicators
//! - word count summaries

use crate::types::{DisplayStyle, PAGE_HEADING, PANEL_HEADING, PageHeadingStyle, PanelHeadingStyle};
use std::fmt;

/// Position of a section in the page sequence.
///
/// Real pages have `sub == 0`. Off-page sections (Characters, Notes, markdown headings...) keep
/// the number of the page before them and count up `sub`, so `2.1` sits between pages 2 and 3
/// without renumbering either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SectionNumber {
    /// Integer page number.
    pub page: u32,
    /// Off-page ordinal under `page` (`0` for real pages).
    pub sub: u32,
}

impl SectionNumber {
    /// A real page, panel or character number.
    pub fn whole(number: u32) -> Self {
        Self {
            page: number,
            sub: 0,
        }
    }

    /// The next off-page section after this one.
    pub fn next_offpage(self) -> Self {
        Self {
            page: self.page,
            sub: self.sub + 1,
        }
    }

    /// The number the next real page is expected to take.
    pub fn next_page(self) -> u32 {
        self.page.saturating_add(1)
    }

    /// Returns `true` for off-page numbers.
    pub fn is_offpage(self) -> bool {
        self.sub > 0
    }
}

impl fmt::Display for SectionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sub == 0 {
            write!(f, "{}", self.page)
        } else {
            write!(f, "{}.{}", self.page, self.sub)
        }
    }
}

/// A heading in the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureSection {
    /// Character offset of the heading line.
    pub index: usize,
    /// Sequential number.
    pub number: SectionNumber,
    /// Heading text as displayed in the document.
    pub heading_text: String,
    /// Dialog words under this heading.
    pub word_count: u32,
}

impl StructureSection {
    pub(crate) fn new(index: usize, number: SectionNumber, heading_text: impl Into<String>) -> Self {
        Self {
            index,
            number,
            heading_text: heading_text.into(),
            word_count: 0,
        }
    }
}

/// Whether a page-level section is a numbered page or an off-page section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// A numbered page.
    Page,
    /// Characters, Notes, Outline, Summary, or a markdown section.
    Offpage,
}

/// A panel and its character headings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructurePanel {
    /// The panel heading.
    pub section: StructureSection,
    /// Character headings, in order.
    pub characters: Vec<StructureSection>,
}

/// A page-level section.
#[derive(Debug, Clone, PartialEq)]
pub struct StructurePage {
    /// The page heading.
    pub section: StructureSection,
    /// Page or off-page.
    pub kind: PageKind,
    /// Panels, in order.
    pub panels: Vec<StructurePanel>,
    /// Cached vertical offset of the heading, once layout has settled.
    pub scroll_top: Option<f32>,
}

impl StructurePage {
    /// Heading text rendered in a display style (off-page headings are returned unchanged).
    pub fn display_text(&self, style: PageHeadingStyle) -> String {
        match self.kind {
            PageKind::Page => {
                PAGE_HEADING.transform(&self.section.heading_text, Some(DisplayStyle::Page(style)), None)
            }
            PageKind::Offpage => self.section.heading_text.clone(),
        }
    }
}

impl StructurePanel {
    /// Heading text rendered in a display style, given the number of the enclosing page.
    pub fn display_text(&self, style: PanelHeadingStyle, page_number: u32) -> String {
        PANEL_HEADING.transform(
            &self.section.heading_text,
            Some(DisplayStyle::Panel(style)),
            Some(page_number),
        )
    }
}

/// Depth of an [`OutlineEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineLevel {
    /// Page-level section.
    Page(PageKind),
    /// Panel.
    Panel,
    /// Character heading.
    Character,
}

/// A flattened outline node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineEntry<'a> {
    /// Depth and kind.
    pub level: OutlineLevel,
    /// The heading.
    pub section: &'a StructureSection,
}

/// The outline of a script, rebuilt on every restyle pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Structure {
    /// Page-level sections in document order.
    pub pages: Vec<StructurePage>,
}

impl Structure {
    /// Create a new outline.
    pub fn new(pages: Vec<StructurePage>) -> Self {
        Self { pages }
    }

    /// Returns true if there are no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Number of numbered pages (off-page sections excluded).
    pub fn page_count(&self) -> usize {
        self.pages
            .iter()
            .filter(|page| page.kind == PageKind::Page)
            .count()
    }

    /// Flatten all sections in pre-order.
    pub fn flatten_preorder(&self) -> Vec<OutlineEntry<'_>> {
        let mut out = Vec::new();
        for page in &self.pages {
            out.push(OutlineEntry {
                level: OutlineLevel::Page(page.kind),
                section: &page.section,
            });
            for panel in &page.panels {
                out.push(OutlineEntry {
                    level: OutlineLevel::Panel,
                    section: &panel.section,
                });
                out.extend(panel.characters.iter().map(|section| OutlineEntry {
                    level: OutlineLevel::Character,
                    section,
                }));
            }
        }
        out
    }

    /// The page-level section containing character `offset`.
    pub fn page_at_index(&self, offset: usize) -> Option<&StructurePage> {
        let count = self
            .pages
            .partition_point(|page| page.section.index <= offset);
        count.checked_sub(1).and_then(|i| self.pages.get(i))
    }

    /// The last page whose cached scroll offset is at or above `top`.
    ///
    /// Pages whose offset has not been captured yet are skipped.
    pub fn page_at_scroll(&self, top: f32) -> Option<&StructurePage> {
        self.pages
            .iter()
            .rev()
            .find(|page| page.scroll_top.is_some_and(|scroll| scroll <= top))
    }

    /// Find a page-level section by number.
    pub fn find_page(&self, number: SectionNumber) -> Option<&StructurePage> {
        self.pages.iter().find(|page| page.section.number == number)
    }

    /// Dialog words across all numbered pages.
    pub fn total_word_count(&self) -> u32 {
        self.pages
            .iter()
            .filter(|page| page.kind == PageKind::Page)
            .map(|page| page.section.word_count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(index: usize, number: SectionNumber, words: u32) -> StructurePage {
        let mut section = StructureSection::new(index, number, format!("PAGE {number}"));
        section.word_count = words;
        StructurePage {
            section,
            kind: if number.is_offpage() {
                PageKind::Offpage
            } else {
                PageKind::Page
            },
            panels: vec![StructurePanel {
                section: StructureSection::new(index + 7, SectionNumber::whole(1), "Panel 1"),
                characters: vec![StructureSection::new(index + 15, SectionNumber::whole(1), "JOHN:")],
            }],
            scroll_top: None,
        }
    }

    fn sample() -> Structure {
        Structure::new(vec![
            page(0, SectionNumber::whole(1), 4),
            page(40, SectionNumber::whole(1).next_offpage(), 0),
            page(80, SectionNumber::whole(2), 6),
        ])
    }

    #[test]
    fn test_section_number_order_and_display() {
        let two = SectionNumber::whole(2);
        let offpage = two.next_offpage();
        assert!(two < offpage && offpage < SectionNumber::whole(3));
        assert_eq!(offpage.to_string(), "2.1");
        assert_eq!(offpage.next_offpage().to_string(), "2.2");
        assert_eq!(offpage.next_page(), 3);
    }

    #[test]
    fn test_flatten_preorder() {
        let structure = sample();
        let levels: Vec<_> = structure
            .flatten_preorder()
            .into_iter()
            .map(|entry| entry.level)
            .collect();
        assert_eq!(levels.len(), 9);
        assert_eq!(levels[0], OutlineLevel::Page(PageKind::Page));
        assert_eq!(levels[1], OutlineLevel::Panel);
        assert_eq!(levels[2], OutlineLevel::Character);
        assert_eq!(levels[3], OutlineLevel::Page(PageKind::Offpage));
    }

    #[test]
    fn test_lookups() {
        let mut structure = sample();
        assert_eq!(structure.page_at_index(50).unwrap().section.index, 40);
        assert_eq!(structure.page_at_index(0).unwrap().section.index, 0);
        assert_eq!(structure.find_page(SectionNumber::whole(2)).unwrap().section.index, 80);
        assert_eq!(structure.total_word_count(), 10);
        assert_eq!(structure.page_count(), 2);

        assert!(structure.page_at_scroll(100.0).is_none());
        structure.pages[0].scroll_top = Some(0.0);
        structure.pages[1].scroll_top = Some(300.0);
        assert_eq!(structure.page_at_scroll(120.0).unwrap().section.index, 0);
        assert_eq!(structure.page_at_scroll(300.0).unwrap().section.index, 40);
    }

    #[test]
    fn test_display_text_uses_style() {
        let structure = sample();
        assert_eq!(structure.pages[2].display_text(PageHeadingStyle::PageAndLonghand), "PAGE TWO");
        assert_eq!(
            structure.pages[2].panels[0].display_text(PanelHeadingStyle::NumeralWithPage, 2),
            "2.1"
        );
    }
}
