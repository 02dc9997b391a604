//! The restyle pass.
//!
//! [`StructureBuilder::build`] walks every line of a document once. For each line it classifies
//! the text, updates the outline (pages, panels, characters and their word tallies) and diffs
//! the line against what it should look like. The result is the outline plus one reconciliation
//! [`Delta`]: the per-line edits composed with two count annotation patches.
//!
//! The outline is rebuilt from scratch every pass; only the document is patched.

use crate::classify::{Classification, LineContext, LineKind, classify, is_first_heading};
use crate::frontmatter::{Attributes, parse_frontmatter};
use crate::heading::HeadingNumber;
use crate::reconcile::reconcile_line;
use crate::recency::CharacterRecency;
use crate::structure::{
    PageKind, SectionNumber, Structure, StructurePage, StructurePanel, StructureSection,
};
use superscript_core::{Delta, Document, FormatChange, LineFormat, SelectionRange};

/// Output of one restyle pass.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureBuild {
    /// The outline.
    pub structure: Structure,
    /// Parsed frontmatter.
    pub attributes: Attributes,
    /// Character names in order of last introduction.
    pub characters: CharacterRecency,
    /// Reconciliation patch against the input document.
    pub patch: Delta,
}

/// Builds the outline and reconciliation patch of a document.
#[derive(Debug, Clone, Copy)]
pub struct StructureBuilder<'a> {
    document: &'a Document,
    selection: Option<SelectionRange>,
}

impl<'a> StructureBuilder<'a> {
    /// Create a builder for `document`.
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            selection: None,
        }
    }

    /// Take the caret into account for colon shorthand.
    pub fn with_selection(mut self, selection: Option<SelectionRange>) -> Self {
        self.selection = selection;
        self
    }

    /// Run the pass.
    pub fn build(self) -> StructureBuild {
        let mut walk = Walk::default();
        let mut main = Delta::new();

        for line in self.document.lines() {
            if walk.frontmatter && is_first_heading(&line.text) {
                walk.frontmatter = false;
            }

            let ctx = LineContext {
                frontmatter: walk.frontmatter,
                offpage: walk.offpage,
                next_page: walk.last_page.next_page(),
                next_panel: walk.panel_number + 1,
                characters: &walk.characters,
                caret_at_line_start: self.selection.is_some_and(|s| s.index == line.start),
            };
            let class = classify(&line.text, line.format, &ctx);
            let role = walk.observe(&class.kind, &class.text);

            let target = walk.target_format(&class, line.format, role);
            let target_len = class.text.chars().count();
            if let Some(id) = role.tally() {
                walk.tallies[id].line_len = target_len;
                walk.tallies[id].format = target.clone();
            }

            let patch = reconcile_line(&line.text, line.format, &class.text, &target);
            main = patch.append_to(main, line.len());
            walk.index += target_len + 1;
        }

        let patch = main
            .compose(&walk.panel_count_patch())
            .compose(&walk.word_count_patch())
            .chop();
        let attributes = parse_frontmatter(walk.frontmatter_text.as_str());

        StructureBuild {
            structure: walk.structure(),
            attributes,
            characters: walk.characters,
            patch,
        }
    }
}

/// Build the outline and patch of `document` without caret information.
pub fn build_structure(document: &Document) -> StructureBuild {
    StructureBuilder::new(document).build()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Counts {
    /// Panel and word counts.
    Page,
    /// Word count only.
    Words,
    /// No annotations.
    None,
}

#[derive(Debug, Clone)]
struct Tally {
    section: StructureSection,
    counts: Counts,
    /// Line length and format once the main patch is applied.
    line_len: usize,
    format: LineFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Section(usize),
    Other,
}

impl Role {
    fn tally(self) -> Option<usize> {
        match self {
            Role::Section(id) => Some(id),
            Role::Other => None,
        }
    }
}

#[derive(Debug, Clone)]
struct PanelNode {
    tally: usize,
    characters: Vec<usize>,
}

#[derive(Debug, Clone)]
struct PageNode {
    tally: usize,
    kind: PageKind,
    panels: Vec<PanelNode>,
}

#[derive(Debug, Clone)]
struct Walk {
    frontmatter: bool,
    frontmatter_text: String,
    offpage: bool,
    /// Offset of the current line once the patch is applied.
    index: usize,
    last_page: SectionNumber,
    panel_number: u32,
    character_number: u32,
    characters: CharacterRecency,
    tallies: Vec<Tally>,
    pages: Vec<PageNode>,
    page: Option<usize>,
    panel: Option<usize>,
    character: Option<usize>,
    /// The current panel is attached to the last page node.
    panel_in_outline: bool,
}

impl Default for Walk {
    fn default() -> Self {
        Self {
            frontmatter: true,
            frontmatter_text: String::new(),
            offpage: false,
            index: 0,
            last_page: SectionNumber::default(),
            panel_number: 0,
            character_number: 0,
            characters: CharacterRecency::new(),
            tallies: Vec::new(),
            pages: Vec::new(),
            page: None,
            panel: None,
            character: None,
            panel_in_outline: false,
        }
    }
}

impl Walk {
    /// Update the outline for a classified line and report whether it is a section heading.
    fn observe(&mut self, kind: &LineKind, text: &str) -> Role {
        match kind {
            LineKind::Frontmatter => {
                self.frontmatter_text.push_str(text);
                self.frontmatter_text.push('\n');
                Role::Other
            }
            LineKind::Page(HeadingNumber { heading_number, .. }) => {
                self.offpage = false;
                self.open_page(SectionNumber::whole(*heading_number), text, PageKind::Page)
            }
            LineKind::OffpageHeading => {
                self.offpage = true;
                self.open_page(self.last_page.next_offpage(), text, PageKind::Offpage)
            }
            LineKind::Panel(HeadingNumber { heading_number, .. }) => {
                self.panel_number = *heading_number;
                self.character_number = 0;
                self.character = None;
                let id = self.push_tally(SectionNumber::whole(*heading_number), text, Counts::Words);
                self.panel = Some(id);
                self.panel_in_outline = match (self.page, self.pages.last_mut()) {
                    (Some(_), Some(page)) => {
                        page.panels.push(PanelNode {
                            tally: id,
                            characters: Vec::new(),
                        });
                        true
                    }
                    _ => false,
                };
                Role::Section(id)
            }
            LineKind::Character {
                name, shorthand, ..
            } => {
                if !*shorthand {
                    self.characters.touch(name);
                }
                self.character_number += 1;
                let id = self.push_tally(
                    SectionNumber::whole(self.character_number),
                    text,
                    Counts::Words,
                );
                self.character = Some(id);
                if self.panel_in_outline
                    && let Some(panel) = self
                        .pages
                        .last_mut()
                        .and_then(|page| page.panels.last_mut())
                {
                    panel.characters.push(id);
                }
                Role::Section(id)
            }
            LineKind::Dialog { words } => {
                for id in [self.page, self.panel, self.character].into_iter().flatten() {
                    self.tallies[id].section.word_count += words;
                }
                Role::Other
            }
            LineKind::Empty | LineKind::Marker { .. } | LineKind::Plain => Role::Other,
        }
    }

    fn open_page(&mut self, number: SectionNumber, text: &str, kind: PageKind) -> Role {
        let counts = match kind {
            PageKind::Page => Counts::Page,
            PageKind::Offpage => Counts::None,
        };
        let id = self.push_tally(number, text, counts);
        self.last_page = number;
        self.panel_number = 0;
        self.character_number = 0;
        self.page = match kind {
            PageKind::Page => Some(id),
            PageKind::Offpage => None,
        };
        self.panel = None;
        self.character = None;
        self.panel_in_outline = false;
        self.pages.push(PageNode {
            tally: id,
            kind,
            panels: Vec::new(),
        });
        Role::Section(id)
    }

    fn push_tally(&mut self, number: SectionNumber, text: &str, counts: Counts) -> usize {
        self.tallies.push(Tally {
            section: StructureSection::new(self.index, number, text),
            counts,
            line_len: 0,
            format: LineFormat::default(),
        });
        self.tallies.len() - 1
    }

    /// The format a line should carry after the pass.
    ///
    /// Count annotations are left as they are on headings that carry them; the count patches
    /// settle them afterwards.
    fn target_format(&self, class: &Classification, current: &LineFormat, role: Role) -> LineFormat {
        let base = LineFormat {
            list: current.list,
            ..LineFormat::default()
        };
        match class.kind {
            LineKind::Frontmatter => LineFormat {
                frontmatter: true,
                ..base
            },
            LineKind::Empty => LineFormat {
                frontmatter: self.frontmatter,
                offpage: self.offpage,
                ..base
            },
            _ => {
                let counts = role
                    .tally()
                    .map_or(Counts::None, |id| self.tallies[id].counts);
                LineFormat {
                    header: class.style.header(),
                    blockquote: class.style.blockquote(),
                    offpage: self.offpage,
                    panel_count: (counts == Counts::Page)
                        .then_some(current.panel_count)
                        .flatten(),
                    word_count: (counts != Counts::None)
                        .then_some(current.word_count)
                        .flatten(),
                    ..base
                }
            }
        }
    }

    fn panel_count_patch(&self) -> Delta {
        let updates = self.pages.iter().filter_map(|page| {
            let tally = &self.tallies[page.tally];
            let count = u32::try_from(page.panels.len()).unwrap_or(u32::MAX);
            (tally.counts == Counts::Page && tally.format.panel_count != Some(count))
                .then(|| (tally, FormatChange::new().panel_count(Some(count))))
        });
        count_patch(updates)
    }

    fn word_count_patch(&self) -> Delta {
        let updates = self.tallies.iter().filter_map(|tally| {
            let count = tally.section.word_count;
            (tally.counts != Counts::None && tally.format.word_count != Some(count))
                .then(|| (tally, FormatChange::new().word_count(Some(count))))
        });
        count_patch(updates)
    }

    fn structure(&self) -> Structure {
        let section = |id: usize| self.tallies[id].section.clone();
        let pages = self
            .pages
            .iter()
            .map(|page| StructurePage {
                section: section(page.tally),
                kind: page.kind,
                panels: page
                    .panels
                    .iter()
                    .map(|panel| StructurePanel {
                        section: section(panel.tally),
                        characters: panel.characters.iter().map(|&id| section(id)).collect(),
                    })
                    .collect(),
                scroll_top: None,
            })
            .collect();
        Structure::new(pages)
    }
}

/// Format the newline of each updated heading; updates must be in document order.
fn count_patch<'a>(updates: impl Iterator<Item = (&'a Tally, FormatChange)>) -> Delta {
    let mut delta = Delta::new();
    let mut position = 0;
    for (tally, change) in updates {
        let newline = tally.section.index + tally.line_len;
        delta = delta.retain(newline - position).retain_with(1, change);
        position = newline + 1;
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn restyled(text: &str) -> (StructureBuild, Document) {
        let document = Document::from_text(text);
        let build = build_structure(&document);
        let updated = document.with_delta(&build.patch).unwrap();
        (build, updated)
    }

    #[test]
    fn test_headings_are_numbered_and_formatted() {
        let (build, updated) = restyled("Title\n\nPAGE\nPanel\nJOHN:\n  Hello there.\n");
        assert_eq!(
            updated.text(),
            "Title\n\nPAGE 1\nPanel 1\nJOHN:\n  Hello there.\n"
        );

        let formats: Vec<_> = updated.lines().map(|l| l.format.clone()).collect();
        assert!(formats[0].frontmatter && formats[1].frontmatter);
        assert_eq!(formats[2].header, 1);
        assert_eq!(formats[2].panel_count, Some(1));
        assert_eq!(formats[2].word_count, Some(2));
        assert_eq!(formats[3].header, 2);
        assert_eq!(formats[3].panel_count, None);
        assert_eq!(formats[4].header, 3);
        assert!(formats[5].blockquote);

        let page = &build.structure.pages[0];
        assert_eq!(page.section.index, 7);
        assert_eq!(page.panels[0].section.index, 14);
        assert_eq!(page.panels[0].characters[0].heading_text, "JOHN:");
        assert_eq!(build.attributes.title(), "Title");
    }

    #[test]
    fn test_second_pass_is_noop() {
        let (first, updated) = restyled(
            "T\nP\np\nJOHN:\nMARY:\n:\n  One two three.\n::\n# Notes\n## Sub\nPAGES 3-5\n",
        );
        assert!(!first.patch.is_noop());
        assert_eq!(updated.line_text(5).unwrap(), "MARY:");
        assert_eq!(updated.line_text(7).unwrap(), "JOHN:");
        assert_eq!(updated.line_text(10).unwrap(), "PAGES 2-4");
        let second = build_structure(&updated);
        assert!(second.patch.is_noop(), "{:?}", second.patch);
    }

    #[test]
    fn test_orphan_panel_is_annotated_but_not_outlined() {
        let (build, updated) = restyled("Title\nPanel\n  Hi there\nPAGE\n");
        // "Panel" ends the frontmatter and is numbered even without a page.
        assert_eq!(updated.line_text(1).unwrap(), "Panel 1");
        assert_eq!(updated.line_format(1).unwrap().word_count, Some(2));
        assert_eq!(build.structure.pages.len(), 1);
        assert!(build.structure.pages[0].panels.is_empty());
    }

    #[test]
    fn test_stale_counts_are_cleared() {
        let document = Document::from_lines([
            ("Title", LineFormat::default()),
            ("PAGE 1", LineFormat::heading(1)),
            (
                "  A line",
                LineFormat {
                    header: 3,
                    word_count: Some(9),
                    ..LineFormat::default()
                },
            ),
        ]);
        let build = build_structure(&document);
        let updated = document.with_delta(&build.patch).unwrap();
        let dialog = updated.line_format(2).unwrap();
        assert!(dialog.blockquote);
        assert_eq!(dialog.header, 0);
        assert_eq!(dialog.word_count, None);
        assert_eq!(updated.line_format(1).unwrap().word_count, Some(2));
    }
}
