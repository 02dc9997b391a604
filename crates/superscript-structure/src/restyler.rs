//! As-you-type session.
//!
//! [`AsYouType`] sits between the host's change notifications and the restyle pass:
//! - user edits are coalesced with a [`Debouncer`] so bursts of keystrokes cost one pass
//! - pressing Enter restyles immediately, and after a character heading indents the new line
//! - page scroll offsets and autocomplete are refreshed from a [`DeferredQueue`] once layout
//!   has settled
//!
//! Time is always passed in by the host, so the session never reads the clock for scheduling.

use crate::builder::{StructureBuild, StructureBuilder};
use crate::completion::{Suggestions, autocomplete};
use crate::config::RestyleConfig;
use crate::error::StructureError;
use crate::frontmatter::Attributes;
use crate::recency::CharacterRecency;
use crate::structure::{OutlineLevel, SectionNumber, Structure, StructureSection};
use std::time::{Duration, Instant};
use superscript_core::{
    ChangeSource, Debouncer, DeferredQueue, Delta, DocumentProcessor, DocumentStateManager, Edge,
    SelectionRange, TextDelta,
};
use tracing::{debug, trace, warn};

/// Vertical layout of the host view.
pub trait LayoutProvider {
    /// Top offset, in view units, of the line starting at char `index`.
    fn offset_top(&self, index: usize) -> f32;
}

impl<F> LayoutProvider for F
where
    F: Fn(usize) -> f32,
{
    fn offset_top(&self, index: usize) -> f32 {
        self(index)
    }
}

/// Result of one restyle pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RestyleOutcome {
    /// The rebuilt outline.
    pub structure: Structure,
    /// Reconciliation patch computed against the document before the pass.
    pub patch: Delta,
    /// Whether the patch was applied (no-op patches are skipped).
    pub applied: bool,
}

/// A rendered outline row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineLabel {
    /// Depth and kind.
    pub level: OutlineLevel,
    /// Section number.
    pub number: SectionNumber,
    /// Heading in the configured display style.
    pub text: String,
    /// Char offset of the heading line.
    pub index: usize,
    /// Dialog words in the section.
    pub word_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    CaptureScroll { generation: u64 },
    InsertDialogIndent { line: usize },
    Autocomplete,
}

/// Restyles a live document as the user types.
#[derive(Debug)]
pub struct AsYouType {
    config: RestyleConfig,
    text_debounce: Debouncer,
    selection_debounce: Debouncer,
    deferred: DeferredQueue<Deferred>,
    has_changed: bool,
    generation: u64,
    caret_hidden: bool,
    structure: Structure,
    attributes: Attributes,
    characters: CharacterRecency,
    suggestions: Suggestions,
}

impl Default for AsYouType {
    fn default() -> Self {
        Self::new(RestyleConfig::default())
    }
}

impl AsYouType {
    /// Create a session.
    pub fn new(config: RestyleConfig) -> Self {
        let window = config.debounce();
        Self {
            config,
            text_debounce: Debouncer::new(window, Edge::Both),
            selection_debounce: Debouncer::new(window, Edge::Both),
            deferred: DeferredQueue::new(),
            has_changed: false,
            generation: 0,
            caret_hidden: false,
            structure: Structure::default(),
            attributes: Attributes::default(),
            characters: CharacterRecency::new(),
            suggestions: Suggestions::default(),
        }
    }

    /// Session settings.
    pub fn config(&self) -> &RestyleConfig {
        &self.config
    }

    /// Outline from the last pass.
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    /// Frontmatter from the last pass.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Character names from the last pass, least recent first.
    pub fn characters(&self) -> &CharacterRecency {
        &self.characters
    }

    /// Current autocomplete suggestions.
    pub fn suggestions(&self) -> &Suggestions {
        &self.suggestions
    }

    /// Returns `true` while a dialog indent is pending and the caret should not be drawn.
    pub fn caret_hidden(&self) -> bool {
        self.caret_hidden
    }

    /// Returns `true` if a user edit has not been restyled yet.
    pub fn has_pending_changes(&self) -> bool {
        self.has_changed
    }

    /// When [`AsYouType::tick`] next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.text_debounce.deadline(),
            self.selection_debounce.deadline(),
            self.deferred.next_due(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// The outline with page and panel headings rendered in the configured styles.
    pub fn outline(&self) -> Vec<OutlineLabel> {
        let mut out = Vec::new();
        for page in &self.structure.pages {
            out.push(label(
                OutlineLevel::Page(page.kind),
                &page.section,
                page.display_text(self.config.page_heading_style),
            ));
            for panel in &page.panels {
                out.push(label(
                    OutlineLevel::Panel,
                    &panel.section,
                    panel.display_text(self.config.panel_heading_style, page.section.number.page),
                ));
                out.extend(panel.characters.iter().map(|character| {
                    label(
                        OutlineLevel::Character,
                        character,
                        character.heading_text.clone(),
                    )
                }));
            }
        }
        out
    }

    /// React to a document change.
    ///
    /// Only user edits are considered, and none while history is being replayed. A newline
    /// restyles right away; anything else goes through the debounce window.
    pub fn on_text_change(
        &mut self,
        state: &mut DocumentStateManager,
        delta: &TextDelta,
        source: ChangeSource,
        now: Instant,
    ) -> Result<Option<RestyleOutcome>, StructureError> {
        if source != ChangeSource::User || state.ignores_history() {
            return Ok(None);
        }
        self.has_changed = true;

        let outcome = if delta.contains_newline_insert() {
            let split_line = last_newline(delta)
                .and_then(|offset| state.document().line_at(offset))
                .map(|(line, _)| line);
            let outcome = self.restyle(state, now)?;
            if let Some(line) = split_line {
                self.queue_dialog_indent(state, line, now);
            }
            Some(outcome)
        } else if self.text_debounce.call(now) {
            Some(self.restyle(state, now)?)
        } else {
            None
        };

        self.deferred
            .schedule(Deferred::Autocomplete, Duration::ZERO, now);
        Ok(outcome)
    }

    /// React to a selection move. Restyles if an edit is still pending.
    ///
    /// A collapsed caret refreshes the suggestions on the next tick; a range or lost focus
    /// clears them at once.
    pub fn on_selection_change(
        &mut self,
        state: &mut DocumentStateManager,
        now: Instant,
    ) -> Result<Option<RestyleOutcome>, StructureError> {
        if state.selection().is_some_and(|s| s.is_collapsed()) {
            self.deferred
                .schedule(Deferred::Autocomplete, Duration::ZERO, now);
        } else {
            self.suggestions = Suggestions::default();
        }
        if self.has_changed && self.selection_debounce.call(now) {
            return self.restyle(state, now).map(Some);
        }
        Ok(None)
    }

    /// Run whatever is due at `now`.
    pub fn tick(
        &mut self,
        state: &mut DocumentStateManager,
        layout: &impl LayoutProvider,
        now: Instant,
    ) -> Result<Option<RestyleOutcome>, StructureError> {
        let text_due = self.text_debounce.poll(now);
        let selection_due = self.selection_debounce.poll(now);
        let outcome = if (text_due || selection_due) && self.has_changed {
            Some(self.restyle(state, now)?)
        } else {
            None
        };

        for task in self.deferred.drain_due(now) {
            match task {
                Deferred::CaptureScroll { generation } if generation == self.generation => {
                    for page in &mut self.structure.pages {
                        page.scroll_top = Some(layout.offset_top(page.section.index));
                    }
                }
                Deferred::CaptureScroll { .. } => {}
                Deferred::InsertDialogIndent { line } => {
                    self.caret_hidden = false;
                    self.insert_dialog_indent(state, line)?;
                }
                Deferred::Autocomplete => {
                    self.suggestions = autocomplete(
                        state.document(),
                        state.selection(),
                        self.config.min_autocomplete_len,
                    );
                }
            }
        }
        Ok(outcome)
    }

    /// Rebuild the outline and apply the reconciliation patch.
    pub fn restyle(
        &mut self,
        state: &mut DocumentStateManager,
        now: Instant,
    ) -> Result<RestyleOutcome, StructureError> {
        let (build, applied) = run_pass(state)?;
        self.has_changed = false;
        // This pass covers every edit so far.
        self.text_debounce.cancel();
        self.selection_debounce.cancel();
        self.generation += 1;
        self.deferred.schedule(
            Deferred::CaptureScroll {
                generation: self.generation,
            },
            self.config.scroll_capture_delay(),
            now,
        );
        Ok(self.store(build, applied))
    }

    fn store(&mut self, build: StructureBuild, applied: bool) -> RestyleOutcome {
        self.structure = build.structure.clone();
        self.attributes = build.attributes;
        self.characters = build.characters;
        RestyleOutcome {
            structure: build.structure,
            patch: build.patch,
            applied,
        }
    }

    fn queue_dialog_indent(&mut self, state: &DocumentStateManager, line: usize, now: Instant) {
        if self.config.dialog_indent.is_empty() {
            return;
        }
        let document = state.document();
        let on_character = document
            .line_start(line)
            .and_then(|start| document.format_at(start))
            .is_some_and(|format| format.header == 3 && !format.offpage);
        let next_is_empty = document.line(line + 1).is_some_and(|next| next.is_empty());
        if on_character && next_is_empty {
            self.caret_hidden = true;
            self.deferred.schedule(
                Deferred::InsertDialogIndent { line: line + 1 },
                Duration::ZERO,
                now,
            );
        }
    }

    fn insert_dialog_indent(
        &mut self,
        state: &mut DocumentStateManager,
        line: usize,
    ) -> Result<(), StructureError> {
        let Some(start) = state
            .document()
            .line(line)
            .filter(|line| line.is_empty())
            .map(|line| line.start)
        else {
            return Ok(());
        };
        let indent = self.config.dialog_indent.as_str();
        state.apply_delta(&Delta::new().retain(start).insert(indent), ChangeSource::Api)?;
        state.set_selection(Some(SelectionRange::caret(start + indent.chars().count())))?;
        self.has_changed = true;
        Ok(())
    }
}

impl DocumentProcessor for AsYouType {
    type Error = StructureError;

    fn process(&mut self, state: &DocumentStateManager) -> Result<Option<Delta>, Self::Error> {
        let build = StructureBuilder::new(state.document())
            .with_selection(state.selection())
            .build();
        let outcome = self.store(build, false);
        Ok((!outcome.patch.is_noop()).then_some(outcome.patch))
    }
}

/// Restyle `state` once, outside any session.
pub fn restyle(state: &mut DocumentStateManager) -> Result<RestyleOutcome, StructureError> {
    let (build, applied) = run_pass(state)?;
    Ok(RestyleOutcome {
        structure: build.structure,
        patch: build.patch,
        applied,
    })
}

fn run_pass(state: &mut DocumentStateManager) -> Result<(StructureBuild, bool), StructureError> {
    let started = Instant::now();
    let build = StructureBuilder::new(state.document())
        .with_selection(state.selection())
        .build();

    if build.patch.is_noop() {
        trace!(pages = build.structure.pages.len(), "restyle: document already up to date");
        return Ok((build, false));
    }
    if let Err(err) = state.apply_delta(&build.patch, ChangeSource::Api) {
        warn!(%err, ops = build.patch.len(), "restyle: patch rejected");
        return Err(err.into());
    }
    debug!(
        elapsed = ?started.elapsed(),
        ops = build.patch.len(),
        pages = build.structure.pages.len(),
        "restyle: patch applied"
    );
    Ok((build, true))
}

fn last_newline(delta: &TextDelta) -> Option<usize> {
    delta.edits.iter().rev().find_map(|edit| {
        edit.inserted_text
            .chars()
            .enumerate()
            .filter(|(_, c)| *c == '\n')
            .last()
            .map(|(i, _)| edit.start + i)
    })
}

fn label(level: OutlineLevel, section: &StructureSection, text: String) -> OutlineLabel {
    OutlineLabel {
        level,
        number: section.number,
        text,
        index: section.index,
        word_count: section.word_count,
    }
}
