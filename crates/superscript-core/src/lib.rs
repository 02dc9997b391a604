#![warn(missing_docs)]
//! Superscript Core - Headless Rich-Text Document Substrate
//!
//! # Overview
//!
//! `superscript-core` is the document layer the Superscript script analyzer runs on. It models a
//! rich-text document the way rich-text editors expose it (lines whose terminating newline
//! carries block attributes), the retain/insert/delete [`Delta`] every mutation is expressed as,
//! and the state manager that applies deltas atomically and notifies the host.
//!
//! It does not render anything and performs no I/O.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Document Processors (structure analyzer)   │  ← superscript-structure
//! ├─────────────────────────────────────────────┤
//! │  State Manager (selection, notifications)   │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Delta (retain / insert / delete, compose)  │  ← Mutations
//! ├─────────────────────────────────────────────┤
//! │  Document (Rope text + line formats)        │  ← Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use superscript_core::{ChangeSource, Delta, DocumentStateManager, FormatChange};
//!
//! let mut manager = DocumentStateManager::new("PAGE\n  Hello there.\n");
//!
//! // Turn the first line into a level-1 heading without touching its text.
//! let delta = Delta::new().retain_with(5, FormatChange::new().header(1));
//! manager.apply_delta(&delta, ChangeSource::Silent).unwrap();
//!
//! assert_eq!(manager.document().line_format(0).unwrap().header, 1);
//! ```
//!
//! # Module Description
//!
//! - [`format`] - block-level line formats and partial format changes
//! - [`delta`] - operation deltas (compose, position mapping) and text change records
//! - [`document`] - the line-oriented document model
//! - [`state`] - state manager and change notifications
//! - [`processing`] - the document processor seam
//! - [`schedule`] - debounce and deferred-task primitives

pub mod delta;
pub mod document;
pub mod error;
pub mod format;
pub mod processing;
pub mod schedule;
pub mod state;
mod text;

pub use delta::{Delta, DeltaOp, TextDelta, TextDeltaEdit};
pub use document::{Document, Line, SelectionRange};
pub use error::DocumentError;
pub use format::{FormatChange, LineFormat, ListKind};
pub use processing::DocumentProcessor;
pub use schedule::{Debouncer, DeferredQueue, Edge};
pub use state::{
    ChangeSource, DocumentStateManager, StateChange, StateChangeCallback, StateChangeType,
};
