#![warn(missing_docs)]
//! Superscript Structure - As-You-Type Script Analysis
//!
//! # Overview
//!
//! `superscript-structure` reads a comic script held in a [`superscript_core::Document`] and keeps
//! it styled while the writer types. Every line is classified against a small grammar (page and
//! panel headings, character headings, indented dialog, off-page sections, markdown headings),
//! the page → panel → character outline is rebuilt, and a single reconciliation [`Delta`](superscript_core::Delta) brings
//! the document's line formats, heading numbers and word counts in line with it.
//!
//! A second pass over a restyled document produces a no-op delta.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  AsYouType (debounce, deferred follow-ups)  │  ← Host integration
//! ├─────────────────────────────────────────────┤
//! │  StructureBuilder / autocomplete            │  ← One pass per change
//! ├─────────────────────────────────────────────┤
//! │  classify / frontmatter / heading numbers   │  ← Pure per-line logic
//! ├─────────────────────────────────────────────┤
//! │  superscript-core (Document, Delta, state)  │  ← Storage and mutation
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use superscript_core::DocumentStateManager;
//! use superscript_structure::restyle;
//!
//! let mut state = DocumentStateManager::new("My Script\nPAGE\nPanel\nJOHN:\n  Hi there.\n");
//! let outcome = restyle(&mut state).unwrap();
//!
//! assert!(outcome.applied);
//! assert_eq!(state.document().line_text(1).unwrap(), "PAGE 1");
//! assert_eq!(outcome.structure.total_word_count(), 2);
//!
//! // Nothing left to do.
//! assert!(!restyle(&mut state).unwrap().applied);
//! ```
//!
//! # Module Description
//!
//! - [`types`] - line grammar, style types and display transforms
//! - [`classify`] - context-sensitive line classification
//! - [`heading`] - page and panel heading numbering
//! - [`frontmatter`] - the attribute block before the first heading
//! - [`structure`] - the outline data model
//! - [`builder`] - the restyle pass and its reconciliation patch
//! - [`completion`] - as-you-type suggestions
//! - [`restyler`] - the debounced session hosts drive
//! - [`config`] - session settings

pub mod builder;
pub mod classify;
pub mod completion;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod heading;
pub mod locales;
pub mod recency;
pub mod reconcile;
pub mod restyler;
pub mod structure;
pub mod types;

pub use builder::{StructureBuild, StructureBuilder, build_structure};
pub use classify::{Classification, LineContext, LineKind, classify, word_count};
pub use completion::{
    CompletionEdit, CompletionItem, CompletionKind, Suggestions, apply_completion, autocomplete,
};
pub use config::{MAX_DELAY_MS, RestyleConfig};
pub use error::StructureError;
pub use frontmatter::{
    Attributes, FrontmatterSplit, Script, UNTITLED, WordListDiff, append_frontmatter_value,
    parse_frontmatter, split_frontmatter,
};
pub use heading::{HeadingKind, HeadingNumber, format_heading_number};
pub use locales::Locale;
pub use recency::CharacterRecency;
pub use restyler::{AsYouType, LayoutProvider, OutlineLabel, RestyleOutcome, restyle};
pub use structure::{
    OutlineEntry, OutlineLevel, PageKind, SectionNumber, Structure, StructurePage, StructurePanel,
    StructureSection,
};
pub use types::{
    CharacterHeadingStyle, DialogStyle, DisplayStyle, PageHeadingStyle, PanelHeadingStyle,
    StyleType, TypeName, type_for_line,
};
