//! Document State Interface
//!
//! Owns the live document, the selection and the subscriber list, and is the single place every
//! mutation goes through.
//!
//! # Overview
//!
//! The analyzer never edits the document directly: it hands a [`Delta`] to
//! [`DocumentStateManager::apply_delta`], which applies it atomically, bumps the version, maps
//! the selection through the change and notifies subscribers with a structured [`TextDelta`]
//! plus the [`ChangeSource`] that produced it.
//!
//! On a multi-threaded host, wrap the manager in a single lock (or give it to one actor); the
//! analyzer relies on each pass observing a document that does not change underneath it.
//!
//! # Example
//!
//! ```rust
//! use superscript_core::{ChangeSource, Delta, DocumentStateManager, StateChangeType};
//!
//! let mut manager = DocumentStateManager::new("Title\n");
//!
//! manager.subscribe(|change| {
//!     println!("State changed: {:?}", change.change_type);
//! });
//!
//! manager
//!     .apply_delta(&Delta::new().retain(6).insert("PAGE\n"), ChangeSource::User)
//!     .unwrap();
//! assert_eq!(manager.document().text(), "Title\nPAGE\n");
//! ```

use crate::delta::{Delta, TextDelta};
use crate::document::{Document, SelectionRange};
use crate::error::DocumentError;
use std::sync::Arc;
use tracing::{debug, trace};

/// Who produced a document change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeSource {
    /// Typed or pasted by the user (or applied on their behalf as a user-visible edit).
    #[default]
    User,
    /// Programmatic change that should still be recorded in history.
    Api,
    /// Programmatic change that bypasses history.
    Silent,
}

/// State change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChangeType {
    /// Document text or formatting changed.
    TextChanged,
    /// Selection (or caret) moved.
    SelectionChanged,
}

/// State change record
#[derive(Debug, Clone)]
pub struct StateChange {
    /// Change type
    pub change_type: StateChangeType,
    /// Old version number
    pub old_version: u64,
    /// New version number
    pub new_version: u64,
    /// Source tag of the change.
    pub source: ChangeSource,
    /// Structured text delta for document changes.
    pub text_delta: Option<Arc<TextDelta>>,
    /// Selection after the change.
    pub selection: Option<SelectionRange>,
}

impl StateChange {
    /// Create a new state change record.
    pub fn new(change_type: StateChangeType, old_version: u64, new_version: u64) -> Self {
        Self {
            change_type,
            old_version,
            new_version,
            source: ChangeSource::User,
            text_delta: None,
            selection: None,
        }
    }

    /// Attach a structured text delta to this change record.
    pub fn with_text_delta(mut self, delta: Arc<TextDelta>) -> Self {
        self.text_delta = Some(delta);
        self
    }

    /// Attach the source tag to this change record.
    pub fn with_source(mut self, source: ChangeSource) -> Self {
        self.source = source;
        self
    }

    /// Attach the resulting selection to this change record.
    pub fn with_selection(mut self, selection: Option<SelectionRange>) -> Self {
        self.selection = selection;
        self
    }
}

/// State change callback function type
pub type StateChangeCallback = Box<dyn FnMut(&StateChange) + Send>;

/// Document state manager
///
/// - **Atomic edits**: a delta is applied completely or not at all.
/// - **Version Tracking**: the version increments after each change.
/// - **Change Notifications**: subscribers see the text delta and its source.
/// - **History accounting**: user/API edits count as one history entry each; silent edits and
///   edits applied while history is being replayed do not.
pub struct DocumentStateManager {
    document: Document,
    selection: Option<SelectionRange>,
    version: u64,
    history_depth: usize,
    ignore_history: bool,
    callbacks: Vec<StateChangeCallback>,
    last_text_delta: Option<Arc<TextDelta>>,
}

impl DocumentStateManager {
    /// Create a new state manager over plain text.
    pub fn new(text: &str) -> Self {
        Self::from_document(Document::from_text(text))
    }

    /// Create a new state manager over an existing document.
    pub fn from_document(document: Document) -> Self {
        Self {
            document,
            selection: None,
            version: 0,
            history_depth: 0,
            ignore_history: false,
            callbacks: Vec::new(),
            last_text_delta: None,
        }
    }

    /// The live document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Current selection, if the document has focus.
    pub fn selection(&self) -> Option<SelectionRange> {
        self.selection
    }

    /// Current version number.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of recorded (undoable) edits.
    pub fn history_depth(&self) -> usize {
        self.history_depth
    }

    /// Returns `true` while a history replay (undo/redo) is being applied.
    pub fn ignores_history(&self) -> bool {
        self.ignore_history
    }

    /// Mark the start/end of a history replay.
    pub fn set_ignore_history(&mut self, ignore: bool) {
        self.ignore_history = ignore;
    }

    /// Subscribe to state change notifications
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Move the selection (or drop focus with `None`).
    pub fn set_selection(&mut self, selection: Option<SelectionRange>) -> Result<(), DocumentError> {
        if let Some(range) = selection {
            self.document.validate_selection(range)?;
        }
        self.selection = selection;

        let old_version = self.version;
        self.version += 1;
        let change = StateChange::new(StateChangeType::SelectionChanged, old_version, self.version)
            .with_selection(selection);
        self.notify_callbacks(&change);
        Ok(())
    }

    /// Apply `delta` atomically and notify subscribers.
    ///
    /// The selection is mapped through the delta.
    pub fn apply_delta(
        &mut self,
        delta: &Delta,
        source: ChangeSource,
    ) -> Result<Arc<TextDelta>, DocumentError> {
        let text_delta = Arc::new(TextDelta::from_delta(delta, &self.document));
        if let Err(err) = self.document.apply_delta(delta) {
            debug!(%err, ?source, version = self.version, "delta rejected");
            return Err(err);
        }

        if let Some(selection) = self.selection {
            let start = delta.transform_position(selection.index);
            let end = delta.transform_position(selection.end()).max(start);
            let len = self.document.char_count();
            let start = start.min(len.saturating_sub(1));
            self.selection = Some(SelectionRange::new(start, (end - start).min(len - start)));
        }

        if source != ChangeSource::Silent && !self.ignore_history {
            self.history_depth += 1;
        }

        let old_version = self.version;
        self.version += 1;
        self.last_text_delta = Some(text_delta.clone());
        trace!(
            ?source,
            version = self.version,
            edits = text_delta.edits.len(),
            "delta applied"
        );

        let change = StateChange::new(StateChangeType::TextChanged, old_version, self.version)
            .with_source(source)
            .with_text_delta(text_delta.clone())
            .with_selection(self.selection);
        self.notify_callbacks(&change);

        Ok(text_delta)
    }

    /// Insert plain text at `index`.
    pub fn insert_text(
        &mut self,
        index: usize,
        text: &str,
        source: ChangeSource,
    ) -> Result<Arc<TextDelta>, DocumentError> {
        self.apply_delta(&Delta::new().retain(index).insert(text), source)
    }

    /// Get the structured text delta produced by the last document edit, if any.
    pub fn last_text_delta(&self) -> Option<&TextDelta> {
        self.last_text_delta.as_deref()
    }

    /// Notify all callbacks
    fn notify_callbacks(&mut self, change: &StateChange) {
        for callback in &mut self.callbacks {
            callback(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_apply_delta_notifies_and_maps_selection() {
        let mut manager = DocumentStateManager::new("abc\n");
        manager.set_selection(Some(SelectionRange::caret(2))).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = seen.clone();
        manager.subscribe(move |change| {
            seen_cb.lock().expect("lock").push(change.clone());
        });

        manager
            .apply_delta(&Delta::new().insert("xx"), ChangeSource::User)
            .unwrap();

        assert_eq!(manager.selection(), Some(SelectionRange::caret(4)));
        let seen = seen.lock().expect("lock");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].change_type, StateChangeType::TextChanged);
        assert_eq!(seen[0].source, ChangeSource::User);
        let delta = seen[0].text_delta.as_ref().expect("missing delta");
        assert_eq!(delta.edits[0].inserted_text, "xx");
    }

    #[test]
    fn test_silent_and_replayed_edits_skip_history() {
        let mut manager = DocumentStateManager::new("abc\n");
        manager.insert_text(0, "a", ChangeSource::Silent).unwrap();
        assert_eq!(manager.history_depth(), 0);

        manager.set_ignore_history(true);
        manager.insert_text(0, "b", ChangeSource::User).unwrap();
        manager.set_ignore_history(false);
        assert_eq!(manager.history_depth(), 0);

        manager.insert_text(0, "c", ChangeSource::User).unwrap();
        assert_eq!(manager.history_depth(), 1);
    }

    #[test]
    fn test_rejected_delta_keeps_version() {
        let mut manager = DocumentStateManager::new("abc\n");
        let version = manager.version();
        assert!(manager.apply_delta(&Delta::new().delete(50), ChangeSource::User).is_err());
        assert_eq!(manager.version(), version);
        assert_eq!(manager.document().text(), "abc\n");
    }

    #[test]
    fn test_invalid_selection_is_rejected() {
        let mut manager = DocumentStateManager::new("abc\n");
        assert!(manager.set_selection(Some(SelectionRange::new(3, 5))).is_err());
    }
}
