//! Undo/redo management for editor operations.
//!
//! Provides:
//! - `UndoManager` trait for abstracting undo implementations
//! - `UndoableBuffer<T>` - wraps a TextBuffer and provides grouped undo/redo
//!
//! The formatting engine never records styling here: attributes are
//! regenerated from text after every undo, so only raw edits are tracked.

use std::ops::Range;

use smol_str::{SmolStr, ToSmolStr};

use crate::text::TextBuffer;

/// Trait for managing undo/redo operations.
///
/// Implementations must actually perform the undo/redo, not just track state.
pub trait UndoManager {
    /// Check if undo is available.
    fn can_undo(&self) -> bool;

    /// Check if redo is available.
    fn can_redo(&self) -> bool;

    /// Perform undo. Returns true if successful.
    fn undo(&mut self) -> bool;

    /// Perform redo. Returns true if successful.
    fn redo(&mut self) -> bool;

    /// Clear all undo/redo history.
    fn clear_history(&mut self);

    /// Start collecting edits into a single undo step. Groups may nest;
    /// only the outermost `end_group` closes the step.
    fn begin_group(&mut self) {}

    /// Close the group opened by the matching `begin_group`.
    fn end_group(&mut self) {}
}

/// A recorded edit operation for undo/redo.
#[derive(Debug, Clone)]
struct EditOperation {
    /// Character position where edit occurred
    pos: usize,
    /// Text that was deleted (empty for pure insertions)
    deleted: SmolStr,
    /// Text that was inserted (empty for pure deletions)
    inserted: SmolStr,
}

/// One undo step: every operation recorded inside one group, in order.
type UndoStep = Vec<EditOperation>;

/// A TextBuffer wrapper that tracks edits and provides undo/redo.
///
/// All mutations go through this wrapper, which records them for undo.
#[derive(Clone)]
pub struct UndoableBuffer<T> {
    buffer: T,
    undo_stack: Vec<UndoStep>,
    redo_stack: Vec<UndoStep>,
    open_group: Option<UndoStep>,
    group_depth: usize,
    max_steps: usize,
}

impl<T: TextBuffer + Default> Default for UndoableBuffer<T> {
    fn default() -> Self {
        Self::new(T::default(), 100)
    }
}

impl<T: TextBuffer> UndoableBuffer<T> {
    /// Create a new undoable buffer wrapping the given buffer.
    pub fn new(buffer: T, max_steps: usize) -> Self {
        Self {
            buffer,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            open_group: None,
            group_depth: 0,
            max_steps,
        }
    }

    /// Get a reference to the inner buffer.
    pub fn inner(&self) -> &T {
        &self.buffer
    }

    /// Number of undo steps currently available.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    fn record_op(&mut self, pos: usize, deleted: &str, inserted: &str) {
        // Clear redo stack on new edit
        self.redo_stack.clear();

        let op = EditOperation {
            pos,
            deleted: deleted.to_smolstr(),
            inserted: inserted.to_smolstr(),
        };

        match self.open_group.as_mut() {
            Some(group) => group.push(op),
            None => self.push_step(vec![op]),
        }
    }

    fn push_step(&mut self, step: UndoStep) {
        self.undo_stack.push(step);

        // Trim if over max
        while self.undo_stack.len() > self.max_steps {
            self.undo_stack.remove(0);
        }
    }

    fn revert(&mut self, op: &EditOperation) {
        let inserted_chars = op.inserted.chars().count();
        if inserted_chars > 0 {
            self.buffer.delete(op.pos..op.pos + inserted_chars);
        }
        if !op.deleted.is_empty() {
            self.buffer.insert(op.pos, &op.deleted);
        }
    }

    fn reapply(&mut self, op: &EditOperation) {
        let deleted_chars = op.deleted.chars().count();
        if deleted_chars > 0 {
            self.buffer.delete(op.pos..op.pos + deleted_chars);
        }
        if !op.inserted.is_empty() {
            self.buffer.insert(op.pos, &op.inserted);
        }
    }
}

impl<T: TextBuffer> TextBuffer for UndoableBuffer<T> {
    fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    fn insert(&mut self, char_offset: usize, text: &str) {
        self.record_op(char_offset, "", text);
        self.buffer.insert(char_offset, text);
    }

    fn delete(&mut self, char_range: Range<usize>) {
        let deleted = self.buffer.slice(char_range.clone()).unwrap_or_default();
        self.record_op(char_range.start, &deleted, "");
        self.buffer.delete(char_range);
    }

    fn replace(&mut self, char_range: Range<usize>, text: &str) {
        self.begin_group();
        self.delete(char_range.clone());
        self.insert(char_range.start, text);
        self.end_group();
    }

    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr> {
        self.buffer.slice(char_range)
    }

    fn char_at(&self, char_offset: usize) -> Option<char> {
        self.buffer.char_at(char_offset)
    }

    fn to_string(&self) -> String {
        self.buffer.to_string()
    }
}

impl<T: TextBuffer> UndoManager for UndoableBuffer<T> {
    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn undo(&mut self) -> bool {
        let Some(step) = self.undo_stack.pop() else {
            return false;
        };

        for op in step.iter().rev() {
            self.revert(op);
        }

        self.redo_stack.push(step);
        true
    }

    fn redo(&mut self) -> bool {
        let Some(step) = self.redo_stack.pop() else {
            return false;
        };

        for op in step.iter() {
            self.reapply(op);
        }

        self.undo_stack.push(step);
        true
    }

    fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open_group = None;
        self.group_depth = 0;
    }

    fn begin_group(&mut self) {
        if self.group_depth == 0 {
            self.open_group = Some(Vec::new());
        }
        self.group_depth += 1;
    }

    fn end_group(&mut self) {
        if self.group_depth == 0 {
            return;
        }
        self.group_depth -= 1;
        if self.group_depth == 0
            && let Some(step) = self.open_group.take()
            && !step.is_empty()
        {
            self.push_step(step);
        }
    }
}
