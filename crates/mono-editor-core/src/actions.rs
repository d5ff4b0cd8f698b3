//! Editor events and formatting commands.
//!
//! `EditEvent` is what the host surface reports: keystrokes, paste, cursor
//! movement and history. `FormatCommand` is what menus and toolbars send
//! straight to the engine.

/// A range in the document, measured in character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normalize range so start <= end.
    pub fn normalize(self) -> Self {
        if self.start <= self.end {
            self
        } else {
            Self {
                start: self.end,
                end: self.start,
            }
        }
    }

    /// Pull both ends into `[0, len]`.
    pub fn clamp(self, len: usize) -> Self {
        Self {
            start: self.start.min(len),
            end: self.end.min(len),
        }
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

impl From<Range> for std::ops::Range<usize> {
    fn from(r: Range) -> Self {
        r.start..r.end
    }
}

/// A structural or plain editing event from the host surface.
///
/// Ranges are the host's selection at the time of the event; a caret range
/// means nothing is selected.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    /// Typed text replacing the range. A lone `" "` is the list trigger key.
    InsertText { text: String, range: Range },

    /// Return / Enter.
    InsertNewline { range: Range },

    /// Backspace.
    DeleteBackward { range: Range },

    /// Forward delete.
    DeleteForward { range: Range },

    /// Delete word backward (Alt+Backspace).
    DeleteWordBackward { range: Range },

    /// Delete to start of line (Cmd+Backspace).
    DeleteToLineStart { range: Range },

    /// Paste of clipboard text. Rich formatting is already stripped.
    Paste { text: String, range: Range },

    Undo,

    Redo,

    SelectAll,

    /// Move cursor to position.
    MoveCursor { offset: usize },

    /// Extend selection to position.
    ExtendSelection { offset: usize },
}

/// Direct formatting commands from menus and toolbars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCommand {
    /// Wrap the selection (or word at the cursor) in `**`, or unwrap it.
    Bold,
    /// Wrap the selection (or word at the cursor) in `*`, or unwrap it.
    Italic,
    /// Set, replace or remove a `#`, `##` or `###` line prefix.
    Heading(u8),
    /// Start the line with a `•` marker.
    BulletList,
    /// Start the line with a `1.` marker.
    NumberedList,
    /// Turn the selection (or word at the cursor) into `[text](url)`.
    Link,
}
