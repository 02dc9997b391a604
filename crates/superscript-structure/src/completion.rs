//! As-you-type suggestions.
//!
//! Two contexts:
//! - in the frontmatter, suggest unused keys, `PAGE`/`Panel` starters and locales on the
//!   `language:` line
//! - in the body, suggest character names and vocabulary terms matching the word at the caret,
//!   echoing its capitalization; on an empty line offer the starters instead
//!
//! Every suggestion carries the [`Delta`] that applies it and where the caret lands afterwards.

use crate::frontmatter::{SPECIAL_ATTRIBUTES, parse_frontmatter, split_frontmatter};
use crate::locales;
use crate::types::{PAGE_HEADING, PANEL_HEADING};
use std::sync::Arc;
use superscript_core::{
    ChangeSource, Delta, Document, DocumentError, DocumentStateManager, SelectionRange, TextDelta,
};
use unicode_segmentation::UnicodeSegmentation;

/// What a suggestion inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    /// A frontmatter key.
    Attribute,
    /// `PAGE` or `Panel`.
    Starter,
    /// A `language:` value.
    Locale,
    /// A character name.
    Character,
    /// A vocabulary term.
    Vocabulary,
}

/// The edit performed when a suggestion is picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEdit {
    /// Change to the document.
    pub delta: Delta,
    /// Caret offset after the change.
    pub cursor: usize,
}

/// One suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    /// Text shown in the menu.
    pub label: String,
    /// What the suggestion inserts.
    pub kind: CompletionKind,
    /// Rendered in bold (starters).
    pub bold: bool,
    /// Edit applied on selection.
    pub edit: CompletionEdit,
}

impl CompletionItem {
    fn new(label: impl Into<String>, kind: CompletionKind, delta: Delta, cursor: usize) -> Self {
        Self {
            label: label.into(),
            kind,
            bold: kind == CompletionKind::Starter,
            edit: CompletionEdit { delta, cursor },
        }
    }
}

/// Suggestions for a caret position. An empty list means "show nothing".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Suggestions {
    /// Suggestions in menu order.
    pub items: Vec<CompletionItem>,
    /// Char offset the menu is anchored at.
    pub position: usize,
}

impl Suggestions {
    fn none(position: usize) -> Self {
        Self {
            items: Vec::new(),
            position,
        }
    }

    /// Returns `true` if there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The word around a caret, in chars relative to the line start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordAt {
    /// The word.
    pub word: String,
    /// Offset of its first char.
    pub start: usize,
    /// Length in chars.
    pub len: usize,
}

/// The word that ends at or spans char `cursor` of `text`.
///
/// A caret right after a space or at the start of the line has no word.
pub fn word_at(text: &str, cursor: usize) -> Option<WordAt> {
    let cursor_byte = text
        .char_indices()
        .nth(cursor)
        .map_or(text.len(), |(byte, _)| byte);
    let (byte_start, word) = text
        .split_word_bound_indices()
        .find(|(start, segment)| *start < cursor_byte && cursor_byte <= start + segment.len())?;
    if !word.chars().any(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some(WordAt {
        word: word.to_string(),
        start: text[..byte_start].chars().count(),
        len: word.chars().count(),
    })
}

/// Echo the capitalization of `typed` onto `candidate`.
pub fn echo_case(typed: &str, candidate: &str) -> String {
    let mut typed_chars = typed.chars();
    let all_caps = typed.chars().count() >= 2
        && typed.chars().all(|c| c.is_alphabetic() && c.is_uppercase());
    if all_caps {
        candidate.to_uppercase()
    } else if typed_chars.next().is_some_and(char::is_uppercase) {
        crate::types::capitalize_first(candidate)
    } else {
        candidate.to_string()
    }
}

/// Suggestions for the caret in `document`.
///
/// Nothing is suggested for a missing or non-collapsed selection, on the title line, or on a page
/// or panel heading in the body. Names are offered once the word at the caret has at least
/// `min_word_len` chars.
pub fn autocomplete(
    document: &Document,
    selection: Option<SelectionRange>,
    min_word_len: usize,
) -> Suggestions {
    let Some(selection) = selection.filter(SelectionRange::is_collapsed) else {
        return Suggestions::default();
    };
    let index = selection.index;
    let Some(line) = document.line_view_at(index) else {
        return Suggestions::none(index);
    };
    if line.index == 0 {
        return Suggestions::none(index);
    }

    let split = split_frontmatter(document);
    let attributes = parse_frontmatter(split.text.as_str());
    let column = index - line.start;
    let current = word_at(&line.text, column);
    let word = current
        .as_ref()
        .map(|w| w.word.to_lowercase())
        .unwrap_or_default();
    let mut items = Vec::new();

    if split.contains(line.start) {
        let at_beginning = current.as_ref().is_some_and(|w| w.start == 0);
        if !line.is_empty() && at_beginning {
            let Some(current) = &current else {
                return Suggestions::none(index);
            };
            let word_start = line.start + current.start;
            let followed_by_colon = line.text.chars().nth(current.start + current.len) == Some(':');
            for attr in SPECIAL_ATTRIBUTES {
                if attributes.has_value(attr) || !attr.starts_with(&word) {
                    continue;
                }
                let mut delta = Delta::new()
                    .retain(word_start)
                    .insert(attr)
                    .delete(current.len);
                if !followed_by_colon {
                    delta = delta.insert(": ");
                }
                let cursor = word_start + attr.chars().count() + 2;
                items.push(CompletionItem::new(attr, CompletionKind::Attribute, delta, cursor));
            }
            push_starters(&mut items, &word, word_start, current.len);
        } else if line.is_empty() {
            for attr in SPECIAL_ATTRIBUTES {
                if attributes.has_value(attr) {
                    continue;
                }
                let delta = Delta::new().retain(index).insert(format!("{attr}: "));
                let cursor = index + attr.chars().count() + 2;
                items.push(CompletionItem::new(attr, CompletionKind::Attribute, delta, cursor));
            }
            push_starters(&mut items, "", index, 0);
        } else if let Some(rest) = line.text.strip_prefix("language:") {
            for locale in locales::search(rest) {
                let text = format!("language: {}", locale.label());
                let cursor = line.start + text.chars().count();
                let delta = Delta::new().retain(line.start).insert(text).delete(line.len());
                items.push(CompletionItem::new(locale.label(), CompletionKind::Locale, delta, cursor));
            }
        }
        return Suggestions { items, position: index };
    }

    if PAGE_HEADING.matches(&line.text) || PANEL_HEADING.matches(&line.text) {
        return Suggestions::none(index);
    }
    if line.is_empty() {
        push_starters(&mut items, "", index, 0);
        return Suggestions { items, position: index };
    }

    let Some(current) = current.filter(|w| w.len >= min_word_len) else {
        return Suggestions::none(index);
    };
    let word_start = line.start + current.start;
    let names = attributes
        .characters()
        .iter()
        .map(|name| (name, CompletionKind::Character))
        .chain(
            attributes
                .vocabulary()
                .iter()
                .map(|term| (term, CompletionKind::Vocabulary)),
        );
    for (name, kind) in names {
        if current.len >= name.chars().count() || !name.to_lowercase().starts_with(&word) {
            continue;
        }
        let replacement = echo_case(&current.word, name);
        let cursor = word_start + replacement.chars().count();
        let delta = Delta::new()
            .retain(word_start)
            .insert(replacement.as_str())
            .delete(current.len);
        items.push(CompletionItem::new(replacement, kind, delta, cursor));
    }

    Suggestions { items, position: index }
}

fn push_starters(items: &mut Vec<CompletionItem>, word: &str, at: usize, replace: usize) {
    for (label, prefix) in [("PAGE", "page"), ("Panel", "panel")] {
        if !prefix.starts_with(word) {
            continue;
        }
        let text = format!("{label}\n");
        let cursor = at + text.chars().count();
        let delta = Delta::new().retain(at).insert(text).delete(replace);
        items.push(CompletionItem::new(label, CompletionKind::Starter, delta, cursor));
    }
}

/// Apply a picked suggestion and move the caret after it.
pub fn apply_completion(
    state: &mut DocumentStateManager,
    item: &CompletionItem,
) -> Result<Arc<TextDelta>, DocumentError> {
    let text_delta = state.apply_delta(&item.edit.delta, ChangeSource::User)?;
    state.set_selection(Some(SelectionRange::caret(item.edit.cursor)))?;
    Ok(text_delta)
}
