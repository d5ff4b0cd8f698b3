//! Core editor document trait and implementations.
//!
//! Defines the `EditorDocument` trait: the styled buffer the formatting
//! engine works against. It pairs raw text (with undo) and a parallel
//! attribute map, plus the cursor and selection. Different hosts can back it
//! with different storage while sharing the editing logic.

use std::ops::Range;

use smol_str::SmolStr;
use web_time::Instant;

use crate::attrs::{AttributeMap, Attributes};
use crate::text::{EditorRope, TextBuffer};
use crate::types::{EditInfo, Selection, SelectionSnapshot};
use crate::undo::{UndoManager, UndoableBuffer};

/// Core trait for editor documents.
///
/// The trait is generic over the buffer type, which must implement both
/// `TextBuffer` (for text operations) and `UndoManager` (for undo/redo).
/// Every provided text operation keeps the attribute map the same length as
/// the text.
pub trait EditorDocument {
    /// The buffer type used for text storage and undo.
    type Buffer: TextBuffer + UndoManager;

    // === Required: Buffer access ===

    /// Get a reference to the underlying buffer.
    fn buffer(&self) -> &Self::Buffer;

    /// Get a mutable reference to the underlying buffer.
    fn buffer_mut(&mut self) -> &mut Self::Buffer;

    /// Attribute runs parallel to the buffer.
    fn attributes(&self) -> &AttributeMap;

    fn attributes_mut(&mut self) -> &mut AttributeMap;

    // === Required: Cursor/selection state ===

    /// Get the cursor offset.
    fn cursor_offset(&self) -> usize;

    /// Set the cursor offset.
    fn set_cursor_offset(&mut self, offset: usize);

    /// Get the current selection, if any.
    fn selection(&self) -> Option<Selection>;

    /// Set the selection.
    fn set_selection(&mut self, selection: Option<Selection>);

    // === Required: Edit tracking ===

    /// Get the last edit info, if any.
    fn last_edit(&self) -> Option<EditInfo>;

    /// Set the last edit info.
    fn set_last_edit(&mut self, edit: Option<EditInfo>);

    // === Provided: Convenience accessors ===

    /// Get the full content as a String.
    fn content_string(&self) -> String {
        self.buffer().to_string()
    }

    /// Get length in characters.
    fn len_chars(&self) -> usize {
        self.buffer().len_chars()
    }

    /// Check if document is empty.
    fn is_empty(&self) -> bool {
        self.buffer().len_chars() == 0
    }

    /// Get a slice of the content.
    fn slice(&self, range: Range<usize>) -> Option<SmolStr> {
        self.buffer().slice(range)
    }

    /// Get character at offset.
    fn char_at(&self, offset: usize) -> Option<char> {
        self.buffer().char_at(offset)
    }

    /// Get selected text, if any.
    fn selected_text(&self) -> Option<SmolStr> {
        self.selection()
            .and_then(|sel| self.buffer().slice(sel.to_range()))
    }

    /// Capture the cursor and selection.
    fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            cursor: self.cursor_offset(),
            selection: self.selection(),
        }
    }

    /// Put back a snapshot as is.
    fn restore(&mut self, snapshot: SelectionSnapshot) {
        self.set_cursor_offset(snapshot.cursor);
        self.set_selection(snapshot.selection);
    }

    /// Attributes freshly typed text picks up: those of the char before
    /// `offset`, like a text view's typing attributes.
    fn typing_attributes(&self, offset: usize) -> Attributes {
        offset
            .checked_sub(1)
            .and_then(|prev| self.attributes().at(prev))
            .cloned()
            .unwrap_or_default()
    }

    // === Provided: Text operations ===

    /// Insert text at char offset, returning edit info.
    fn insert(&mut self, offset: usize, text: &str) -> EditInfo {
        let attrs = self.typing_attributes(offset);
        self.insert_styled(offset, text, attrs)
    }

    /// Insert text carrying explicit attributes.
    fn insert_styled(&mut self, offset: usize, text: &str, attrs: Attributes) -> EditInfo {
        self.replace_styled(offset..offset, text, attrs)
    }

    /// Delete char range, returning edit info.
    fn delete(&mut self, range: Range<usize>) -> EditInfo {
        self.replace_styled(range, "", Attributes::default())
    }

    /// Replace char range with text, returning edit info.
    fn replace(&mut self, range: Range<usize>, text: &str) -> EditInfo {
        let attrs = self.typing_attributes(range.start);
        self.replace_styled(range, text, attrs)
    }

    /// Replace char range with text carrying `attrs`. The buffer records the
    /// delete and insert as one undo step.
    fn replace_styled(&mut self, range: Range<usize>, text: &str, attrs: Attributes) -> EditInfo {
        let deleted_contains_newline = self
            .buffer()
            .slice(range.clone())
            .map(|s| s.contains('\n'))
            .unwrap_or(false);
        let contains_newline = text.contains('\n') || deleted_contains_newline;
        let deleted_len = range.end - range.start;
        let inserted_len = text.chars().count();

        match (deleted_len, inserted_len) {
            (0, 0) => {}
            (_, 0) => self.buffer_mut().delete(range.clone()),
            (0, _) => self.buffer_mut().insert(range.start, text),
            _ => self.buffer_mut().replace(range.clone(), text),
        }
        self.track_attributes(range.clone(), inserted_len, attrs);
        self.set_cursor_offset(range.start + inserted_len);

        let edit = EditInfo {
            edit_char_pos: range.start,
            inserted_len,
            deleted_len,
            contains_newline,
            doc_len_after: self.buffer().len_chars(),
            timestamp: Instant::now(),
        };

        self.set_last_edit(Some(edit.clone()));
        edit
    }

    /// Delete the current selection, if any.
    fn delete_selection(&mut self) -> Option<EditInfo> {
        let sel = self.selection()?;
        self.set_selection(None);
        if sel.is_collapsed() {
            return None;
        }
        Some(self.delete(sel.to_range()))
    }

    /// Replace the whole content, as when a note is opened. History is
    /// cleared and attributes are reset; the next pass restyles everything.
    fn load(&mut self, text: &str) -> EditInfo {
        let deleted_len = self.len_chars();
        self.buffer_mut().set_content(text);
        self.buffer_mut().clear_history();

        let len = self.len_chars();
        self.attributes_mut().reset(len, Attributes::default());
        self.set_selection(None);
        self.set_cursor_offset(len);

        let edit = EditInfo::whole_buffer(deleted_len, len);
        self.set_last_edit(Some(edit.clone()));
        edit
    }

    // === Provided: Undo/Redo ===

    /// Run `f` so that every buffer edit it makes undoes as one step.
    fn grouped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        self.buffer_mut().begin_group();
        let result = f(self);
        self.buffer_mut().end_group();
        result
    }

    fn undo(&mut self) -> bool {
        let before = self.len_chars();
        let undone = self.buffer_mut().undo();
        if undone {
            self.after_history_change(before);
        }
        undone
    }

    fn redo(&mut self) -> bool {
        let before = self.len_chars();
        let redone = self.buffer_mut().redo();
        if redone {
            self.after_history_change(before);
        }
        redone
    }

    fn can_undo(&self) -> bool {
        self.buffer().can_undo()
    }

    fn can_redo(&self) -> bool {
        self.buffer().can_redo()
    }

    fn clear_history(&mut self) {
        self.buffer_mut().clear_history();
    }

    // === Provided: Helpers ===

    /// Keep the attribute map in step with a text splice.
    fn track_attributes(&mut self, range: Range<usize>, inserted: usize, attrs: Attributes) {
        if let Err(err) = self.attributes_mut().splice(range, inserted, attrs) {
            tracing::trace!(target: "mono::format", %err, "attribute map out of step; resetting");
            let len = self.len_chars();
            self.attributes_mut().reset(len, Attributes::default());
        }
    }

    /// Undo and redo rewrite text behind the attribute map's back; reset it
    /// and keep the cursor inside the buffer.
    fn after_history_change(&mut self, len_before: usize) {
        let len = self.len_chars();
        self.attributes_mut().reset(len, Attributes::default());
        let restored = self.snapshot().clamped(len);
        self.restore(restored);
        self.set_last_edit(Some(EditInfo::whole_buffer(len_before, len)));
    }
}

/// The headless document: a rope with undo.
pub type RopeEditor = PlainEditor<UndoableBuffer<EditorRope>>;

/// Simple field-based implementation of EditorDocument.
///
/// Stores cursor, selection, attributes and edit state as plain fields.
/// Use this for headless hosts or as a base for testing.
#[derive(Clone)]
pub struct PlainEditor<T: TextBuffer + UndoManager> {
    buffer: T,
    attributes: AttributeMap,
    cursor: usize,
    selection: Option<Selection>,
    last_edit: Option<EditInfo>,
}

impl<T: TextBuffer + UndoManager + Default> Default for PlainEditor<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: TextBuffer + UndoManager> PlainEditor<T> {
    /// Create a new editor with the given buffer, cursor at the start.
    pub fn new(buffer: T) -> Self {
        let attributes = AttributeMap::new(buffer.len_chars(), Attributes::default());
        Self {
            buffer,
            attributes,
            cursor: 0,
            selection: None,
            last_edit: None,
        }
    }

    /// Get direct access to the inner buffer (bypasses trait).
    pub fn inner(&self) -> &T {
        &self.buffer
    }
}

impl<T: TextBuffer + UndoManager> EditorDocument for PlainEditor<T> {
    type Buffer = T;

    fn buffer(&self) -> &Self::Buffer {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut Self::Buffer {
        &mut self.buffer
    }

    fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }

    fn cursor_offset(&self) -> usize {
        self.cursor
    }

    fn set_cursor_offset(&mut self, offset: usize) {
        self.cursor = offset;
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    fn last_edit(&self) -> Option<EditInfo> {
        self.last_edit.clone()
    }

    fn set_last_edit(&mut self, edit: Option<EditInfo>) {
        self.last_edit = edit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;
    use crate::{EditorRope, UndoableBuffer};

    type TestEditor = PlainEditor<UndoableBuffer<EditorRope>>;

    fn make_editor(content: &str) -> TestEditor {
        let rope = EditorRope::new(content);
        let buf = UndoableBuffer::new(rope, 100);
        PlainEditor::new(buf)
    }

    #[test]
    fn test_basic_insert() {
        let mut editor = make_editor("hello");
        assert_eq!(editor.content_string(), "hello");

        let edit = editor.insert(5, " world");
        assert_eq!(editor.content_string(), "hello world");
        assert_eq!(edit.inserted_len, 6);
        assert_eq!(editor.cursor_offset(), 11);
        assert_eq!(editor.attributes().len(), 11);
    }

    #[test]
    fn test_delete() {
        let mut editor = make_editor("hello world");

        let edit = editor.delete(5..11);
        assert_eq!(editor.content_string(), "hello");
        assert_eq!(edit.deleted_len, 6);
        assert_eq!(editor.cursor_offset(), 5);
        assert_eq!(editor.attributes().len(), 5);
    }

    #[test]
    fn test_replace_is_one_undo_step() {
        let mut editor = make_editor("hello world");

        let edit = editor.replace(6..11, "rust");
        assert_eq!(editor.content_string(), "hello rust");
        assert_eq!(edit.deleted_len, 5);
        assert_eq!(edit.inserted_len, 4);

        assert!(editor.undo());
        assert_eq!(editor.content_string(), "hello world");
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_grouped_edits_undo_together() {
        let mut editor = make_editor("* ");

        editor.grouped(|doc| {
            doc.delete(0..2);
            doc.insert(0, "  • ");
        });
        assert_eq!(editor.content_string(), "  • ");

        assert!(editor.undo());
        assert_eq!(editor.content_string(), "* ");
        assert!(editor.cursor_offset() <= 2);
        assert_eq!(editor.attributes().len(), 2);
    }

    #[test]
    fn test_typed_text_inherits_attributes() {
        let mut editor = make_editor("ab");
        let red = Attributes {
            color: Some(Color::rgba(0xFF0000FF)),
            ..Attributes::default()
        };
        editor.attributes_mut().reset(2, red.clone());

        editor.insert(2, "c");
        assert_eq!(editor.attributes().at(2), Some(&red));

        editor.insert_styled(0, "z", Attributes::default());
        assert_eq!(editor.attributes().at(0), Some(&Attributes::default()));
    }

    #[test]
    fn test_selection() {
        let mut editor = make_editor("hello world");

        editor.set_selection(Some(Selection::new(0, 5)));
        assert_eq!(editor.selected_text(), Some("hello".into()));

        let edit = editor.delete_selection();
        assert!(edit.is_some());
        assert_eq!(editor.content_string(), " world");
        assert!(editor.selection().is_none());
    }

    #[test]
    fn test_load_clears_history() {
        let mut editor = make_editor("draft");
        editor.insert(5, "!");
        assert!(editor.can_undo());

        let edit = editor.load("# Note\nbody");
        assert_eq!(editor.content_string(), "# Note\nbody");
        assert!(!editor.can_undo());
        assert_eq!(editor.attributes().len(), 11);
        assert_eq!(editor.cursor_offset(), 11);
        assert_eq!(edit.deleted_len, 6);
        assert_eq!(edit.inserted_len, 11);
    }

    #[test]
    fn test_undo_clamps_cursor() {
        let mut editor = make_editor("");
        editor.insert(0, "hello");
        assert_eq!(editor.cursor_offset(), 5);

        assert!(editor.undo());
        assert_eq!(editor.content_string(), "");
        assert_eq!(editor.cursor_offset(), 0);
        let edit = editor.last_edit().unwrap();
        assert_eq!(edit.doc_len_after, 0);
    }
}
