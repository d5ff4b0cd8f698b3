//! mono-editor-core: live "invisible markdown" formatting for Mono notes.
//!
//! The note text is plain markdown and is never rewritten by styling. After
//! every change the whole text is re-matched and its attributes re-derived:
//! syntax characters become invisible, content gets heading sizes, bold,
//! italic, link and hashtag styles. Lists are handled structurally as the
//! user types.
//!
//! This crate provides:
//! - `TextBuffer` trait for text storage, `EditorRope` backed by ropey
//! - `EditorDocument` - styled buffer with undo, `PlainEditor` for headless use
//! - `Patterns` / `StyleApplicator` - matching and styling per category
//! - `continuation` - list triggers, continuation and the marker guard
//! - `Reconciler` - the full-document pass
//! - `FormattingEngine` / `NoteEditor` - host entry points

pub mod actions;
pub mod apply;
pub mod attrs;
pub mod config;
pub mod continuation;
pub mod document;
pub mod engine;
pub mod error;
pub mod execute;
pub mod matcher;
pub mod reconcile;
pub mod session;
pub mod sink;
pub mod style;
pub mod text;
pub mod text_helpers;
pub mod types;
pub mod undo;

pub use actions::{EditEvent, FormatCommand, Range};
pub use apply::StyleApplicator;
pub use attrs::{AttrChange, AttributeEdit, AttributeMap, Attributes};
pub use config::EditorConfig;
pub use continuation::{Continuation, allows_edit};
pub use document::{EditorDocument, PlainEditor, RopeEditor};
pub use engine::{FormattingEngine, InputOutcome};
pub use error::FormatError;
pub use execute::{execute_command, execute_event};
pub use matcher::{Category, Patterns, Scan, SyntaxSpan};
pub use reconcile::{DriverState, PassReport, Reconciler};
pub use session::NoteEditor;
pub use sink::{FnSink, HashtagSink, MutationObserver};
pub use smol_str::SmolStr;
pub use style::{Color, Font, FontFamily, FontWeight, ParagraphStyle, Theme, ThemeProvider};
pub use text::{EditorRope, TextBuffer};
pub use text_helpers::{LIST_INDENT, ListMarker};
pub use types::{EditInfo, Selection, SelectionSnapshot};
pub use undo::{UndoManager, UndoableBuffer};
