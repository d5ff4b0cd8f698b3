//! Core editor types: selection, selection snapshots, and edit tracking.
//!
//! These types are framework-agnostic and can be used with any text buffer implementation.

use std::ops::Range;

use web_time::Instant;

/// Text selection with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where cursor is now
    pub head: usize,
}

impl Selection {
    /// Create a new selection.
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Get the start (lower bound) of the selection.
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Get the end (upper bound) of the selection.
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Check if the selection is collapsed (empty, cursor only).
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Convert to a Range<usize> (ordered).
    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Whether both ends lie within a buffer of `len` chars.
    pub fn fits(&self, len: usize) -> bool {
        self.end() <= len
    }

    /// Pull both ends back into `[0, len]`.
    pub fn clamped(&self, len: usize) -> Self {
        Self {
            anchor: self.anchor.min(len),
            head: self.head.min(len),
        }
    }
}

/// Cursor and selection captured before a reconciliation pass.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub cursor: usize,
    pub selection: Option<Selection>,
}

impl SelectionSnapshot {
    /// Whether the snapshot can be restored verbatim into a buffer of `len` chars.
    pub fn fits(&self, len: usize) -> bool {
        self.cursor <= len && self.selection.map(|s| s.fits(len)).unwrap_or(true)
    }

    /// The snapshot with every offset clamped into `[0, len]`.
    pub fn clamped(&self, len: usize) -> Self {
        Self {
            cursor: self.cursor.min(len),
            selection: self.selection.map(|s| s.clamped(len)),
        }
    }
}

/// Information about a single buffer mutation.
///
/// This is the payload handed to mutation observers after every edit.
#[derive(Clone, Debug)]
pub struct EditInfo {
    /// Character offset where the edit occurred
    pub edit_char_pos: usize,
    /// Number of characters inserted
    pub inserted_len: usize,
    /// Number of characters deleted
    pub deleted_len: usize,
    /// Whether the inserted or deleted text contains a newline
    pub contains_newline: bool,
    /// Document length (in chars) after this edit was applied.
    pub doc_len_after: usize,
    /// When this edit occurred. Observers debounce persistence on this.
    pub timestamp: Instant,
}

impl PartialEq for EditInfo {
    fn eq(&self, other: &Self) -> bool {
        // Compare all fields except timestamp (not meaningful for equality)
        self.edit_char_pos == other.edit_char_pos
            && self.inserted_len == other.inserted_len
            && self.deleted_len == other.deleted_len
            && self.contains_newline == other.contains_newline
            && self.doc_len_after == other.doc_len_after
    }
}

impl EditInfo {
    /// An edit that replaced the whole buffer (load, undo, redo).
    pub fn whole_buffer(deleted_len: usize, new_len: usize) -> Self {
        Self {
            edit_char_pos: 0,
            inserted_len: new_len,
            deleted_len,
            contains_newline: true,
            doc_len_after: new_len,
            timestamp: Instant::now(),
        }
    }

    /// Check if this edit info is stale (doc has changed since this edit).
    pub fn is_stale(&self, current_doc_len: usize) -> bool {
        self.doc_len_after != current_doc_len
    }

    /// Get the range that was affected by this edit.
    ///
    /// For insertions: the range of inserted text.
    /// For deletions: an empty range at the deletion point.
    /// For replacements: the range of inserted text.
    pub fn affected_range(&self) -> Range<usize> {
        self.edit_char_pos..self.edit_char_pos + self.inserted_len
    }
}
