//! Event and command execution for editor documents.
//!
//! `execute_event` is the plain editing fallback the engine uses once the
//! continuation engine has declined an event. `execute_command` implements
//! the menu/toolbar formatting commands by editing markdown syntax into the
//! text; the next reconciliation pass styles it.

use crate::actions::{EditEvent, FormatCommand, Range};
use crate::document::EditorDocument;
use crate::text_helpers::{
    ListMarker, detect_list_context, find_line_start, find_word_boundary_backward, line_range,
    word_at,
};
use crate::types::Selection;

/// The host's current selection as a range, or a caret at the cursor.
pub fn selection_range<D: EditorDocument>(doc: &D) -> Range {
    doc.selection()
        .map(|sel| Range::new(sel.start(), sel.end()))
        .unwrap_or_else(|| Range::caret(doc.cursor_offset()))
}

/// Execute an editing event on a document.
///
/// Returns true if the event was handled.
pub fn execute_event<D: EditorDocument>(doc: &mut D, event: &EditEvent) -> bool {
    let len = doc.len_chars();
    match event {
        EditEvent::InsertText { text, range } | EditEvent::Paste { text, range } => {
            execute_insert(doc, text, range.normalize().clamp(len))
        }
        EditEvent::InsertNewline { range } => {
            execute_insert(doc, "\n", range.normalize().clamp(len))
        }
        EditEvent::DeleteBackward { range } => {
            execute_delete_backward(doc, range.normalize().clamp(len))
        }
        EditEvent::DeleteForward { range } => {
            execute_delete_forward(doc, range.normalize().clamp(len))
        }
        EditEvent::DeleteWordBackward { range } => {
            execute_delete_word_backward(doc, range.normalize().clamp(len))
        }
        EditEvent::DeleteToLineStart { range } => {
            execute_delete_to_line_start(doc, range.normalize().clamp(len))
        }
        EditEvent::Undo => execute_history(doc, D::undo),
        EditEvent::Redo => execute_history(doc, D::redo),
        EditEvent::SelectAll => execute_select_all(doc),
        EditEvent::MoveCursor { offset } => execute_move_cursor(doc, *offset),
        EditEvent::ExtendSelection { offset } => execute_extend_selection(doc, *offset),
    }
}

fn execute_insert<D: EditorDocument>(doc: &mut D, text: &str, range: Range) -> bool {
    if range.is_caret() {
        doc.insert(range.start, text);
    } else {
        doc.replace(range.start..range.end, text);
    }
    doc.set_selection(None);
    true
}

fn execute_delete_backward<D: EditorDocument>(doc: &mut D, range: Range) -> bool {
    if !range.is_caret() {
        doc.delete(range.start..range.end);
        doc.set_selection(None);
        return true;
    }

    if range.start == 0 {
        return false;
    }

    doc.delete(range.start - 1..range.start);
    doc.set_selection(None);
    true
}

fn execute_delete_forward<D: EditorDocument>(doc: &mut D, range: Range) -> bool {
    if !range.is_caret() {
        doc.delete(range.start..range.end);
        doc.set_selection(None);
        return true;
    }

    if range.start >= doc.len_chars() {
        return false;
    }

    doc.delete(range.start..range.start + 1);
    doc.set_selection(None);
    true
}

fn execute_delete_word_backward<D: EditorDocument>(doc: &mut D, range: Range) -> bool {
    if !range.is_caret() {
        doc.delete(range.start..range.end);
        doc.set_selection(None);
        return true;
    }

    let cursor = range.start;
    let word_start = find_word_boundary_backward(doc, cursor);
    if word_start == cursor {
        return false;
    }
    doc.delete(word_start..cursor);
    doc.set_selection(None);
    true
}

fn execute_delete_to_line_start<D: EditorDocument>(doc: &mut D, range: Range) -> bool {
    let cursor = range.start;
    let line_start = find_line_start(doc, cursor);
    let end = if range.is_caret() { cursor } else { range.end };

    if line_start == end {
        return false;
    }
    doc.delete(line_start..end);
    doc.set_selection(None);
    true
}

fn execute_history<D: EditorDocument>(doc: &mut D, step: fn(&mut D) -> bool) -> bool {
    if step(doc) {
        doc.set_selection(None);
        true
    } else {
        false
    }
}

fn execute_select_all<D: EditorDocument>(doc: &mut D) -> bool {
    let len = doc.len_chars();
    doc.set_selection(Some(Selection::new(0, len)));
    doc.set_cursor_offset(len);
    true
}

fn execute_move_cursor<D: EditorDocument>(doc: &mut D, offset: usize) -> bool {
    let offset = offset.min(doc.len_chars());
    doc.set_cursor_offset(offset);
    doc.set_selection(None);
    true
}

fn execute_extend_selection<D: EditorDocument>(doc: &mut D, offset: usize) -> bool {
    let offset = offset.min(doc.len_chars());
    let anchor = doc
        .selection()
        .map(|s| s.anchor)
        .unwrap_or_else(|| doc.cursor_offset());
    doc.set_selection(Some(Selection::new(anchor, offset)));
    doc.set_cursor_offset(offset);
    true
}

/// Execute a formatting command on a document.
///
/// Returns true if the text changed.
pub fn execute_command<D: EditorDocument>(doc: &mut D, command: FormatCommand) -> bool {
    match command {
        FormatCommand::Bold => execute_toggle_wrap(doc, "**"),
        FormatCommand::Italic => execute_toggle_wrap(doc, "*"),
        FormatCommand::Heading(level) => execute_heading(doc, level),
        FormatCommand::BulletList => execute_list(doc, ListMarker::Bullet),
        FormatCommand::NumberedList => execute_list(doc, ListMarker::Numbered(1)),
        FormatCommand::Link => execute_insert_link(doc),
    }
}

/// Target of a wrapping command: the selection, else the word at the
/// cursor, else an empty range at the cursor.
fn wrap_target<D: EditorDocument>(doc: &D) -> Range {
    let range = selection_range(doc).clamp(doc.len_chars());
    if !range.is_caret() {
        return range;
    }
    word_at(doc, range.start)
        .map(Range::from)
        .unwrap_or(range)
}

fn slice_is<D: EditorDocument>(doc: &D, start: usize, end: usize, expected: &str) -> bool {
    start <= end && doc.slice(start..end).is_some_and(|s| s == expected)
}

/// A one-char marker next to another copy of itself belongs to a longer
/// delimiter (a lone `*` beside `**`), so it does not count as a wrap.
fn is_lone<D: EditorDocument>(doc: &D, marker: &str, neighbour: Option<usize>) -> bool {
    let mut chars = marker.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => neighbour.and_then(|pos| doc.char_at(pos)) != Some(c),
        _ => true,
    }
}

fn execute_toggle_wrap<D: EditorDocument>(doc: &mut D, marker: &str) -> bool {
    let Range { start, end } = wrap_target(doc);
    let m = marker.chars().count();

    // Markers just outside the target: "**|word|**".
    let outside = start >= m
        && slice_is(doc, start - m, start, marker)
        && slice_is(doc, end, end + m, marker)
        && is_lone(doc, marker, (start - m).checked_sub(1))
        && is_lone(doc, marker, Some(end + m));
    // Markers at the edges of the selection: "|**word**|".
    let inside = end - start >= 2 * m
        && slice_is(doc, start, start + m, marker)
        && slice_is(doc, end - m, end, marker)
        && is_lone(doc, marker, start.checked_sub(1))
        && is_lone(doc, marker, Some(end));

    if outside || inside {
        let (open, close) = if outside {
            (start - m..start, end..end + m)
        } else {
            (start..start + m, end - m..end)
        };
        doc.grouped(|doc| {
            doc.delete(close.clone());
            doc.delete(open.clone());
        });
        let content_start = open.start;
        let content_end = close.start - m;
        doc.set_selection(Some(Selection::new(content_start, content_end)));
        doc.set_cursor_offset(content_end);
        return true;
    }

    // Insert end marker first so start position stays valid.
    doc.grouped(|doc| {
        doc.insert(end, marker);
        doc.insert(start, marker);
    });
    if start == end {
        doc.set_selection(None);
    } else {
        doc.set_selection(Some(Selection::new(start + m, end + m)));
    }
    doc.set_cursor_offset(end + m);
    true
}

/// Move the cursor to follow a line prefix changing from `old_len` to
/// `new_len` chars.
fn follow_prefix<D: EditorDocument>(
    doc: &mut D,
    cursor: usize,
    line_start: usize,
    old_len: usize,
    new_len: usize,
) {
    let moved = if cursor >= line_start + old_len {
        cursor - old_len + new_len
    } else {
        line_start + new_len
    };
    doc.set_selection(None);
    doc.set_cursor_offset(moved.min(doc.len_chars()));
}

fn heading_prefix_len(line: &str) -> usize {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if (1..=3).contains(&hashes) && line[hashes..].starts_with(' ') {
        hashes + 1
    } else {
        0
    }
}

fn execute_heading<D: EditorDocument>(doc: &mut D, level: u8) -> bool {
    if !(1..=3).contains(&level) {
        return false;
    }
    let cursor = doc.cursor_offset().min(doc.len_chars());
    let line = line_range(doc, cursor);
    let text = doc.slice(line.clone()).unwrap_or_default();
    let old_len = heading_prefix_len(&text);

    let wanted = format!("{} ", "#".repeat(usize::from(level)));
    let new_prefix = if old_len == wanted.len() { "" } else { wanted.as_str() };

    doc.replace(line.start..line.start + old_len, new_prefix);
    follow_prefix(doc, cursor, line.start, old_len, new_prefix.len());
    true
}

fn execute_list<D: EditorDocument>(doc: &mut D, marker: ListMarker) -> bool {
    let cursor = doc.cursor_offset().min(doc.len_chars());
    let line_start = find_line_start(doc, cursor);
    let existing = detect_list_context(doc, cursor);

    let old_len = existing.as_ref().map(|ctx| ctx.prefix.len()).unwrap_or(0);
    // Any numbered marker counts as the same kind as `1.`.
    let same_kind = existing.as_ref().is_some_and(|ctx| {
        ctx.marker == marker || (ctx.marker.is_numbered() && marker.is_numbered())
    });
    let new_prefix = if same_kind {
        Default::default()
    } else {
        marker.prefix()
    };
    let new_len = new_prefix.chars().count();

    doc.replace(line_start..line_start + old_len, &new_prefix);
    follow_prefix(doc, cursor, line_start, old_len, new_len);
    true
}

fn execute_insert_link<D: EditorDocument>(doc: &mut D) -> bool {
    let Range { start, end } = wrap_target(doc);
    let label = doc.slice(start..end).unwrap_or_default();
    let link = format!("[{label}](url)");

    doc.replace(start..end, &link);

    // Select the placeholder url so typing replaces it.
    let url_start = start + label.chars().count() + 3;
    doc.set_selection(Some(Selection::new(url_start, url_start + 3)));
    doc.set_cursor_offset(url_start + 3);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EditorRope, PlainEditor, UndoableBuffer};

    type TestEditor = PlainEditor<UndoableBuffer<EditorRope>>;

    fn make_editor(content: &str) -> TestEditor {
        let rope = EditorRope::new(content);
        let buf = UndoableBuffer::new(rope, 100);
        PlainEditor::new(buf)
    }

    #[test]
    fn test_insert() {
        let mut editor = make_editor("hello");
        let event = EditEvent::InsertText {
            text: " world".to_string(),
            range: Range::caret(5),
        };
        assert!(execute_event(&mut editor, &event));
        assert_eq!(editor.content_string(), "hello world");
        assert_eq!(editor.cursor_offset(), 11);
    }

    #[test]
    fn test_delete_backward() {
        let mut editor = make_editor("hello");
        let event = EditEvent::DeleteBackward {
            range: Range::caret(5),
        };
        assert!(execute_event(&mut editor, &event));
        assert_eq!(editor.content_string(), "hell");

        let at_start = EditEvent::DeleteBackward {
            range: Range::caret(0),
        };
        assert!(!execute_event(&mut editor, &at_start));
    }

    #[test]
    fn test_delete_selection() {
        let mut editor = make_editor("hello world");
        editor.set_selection(Some(Selection::new(5, 11)));
        let event = EditEvent::DeleteBackward {
            range: Range::new(5, 11),
        };
        assert!(execute_event(&mut editor, &event));
        assert_eq!(editor.content_string(), "hello");
        assert!(editor.selection().is_none());
    }

    #[test]
    fn test_out_of_range_event_is_clamped() {
        let mut editor = make_editor("abc");
        let event = EditEvent::InsertText {
            text: "d".into(),
            range: Range::caret(40),
        };
        assert!(execute_event(&mut editor, &event));
        assert_eq!(editor.content_string(), "abcd");
    }

    #[test]
    fn test_undo_redo() {
        let mut editor = make_editor("hello");

        let event = EditEvent::InsertText {
            text: " world".to_string(),
            range: Range::caret(5),
        };
        execute_event(&mut editor, &event);
        assert_eq!(editor.content_string(), "hello world");

        assert!(execute_event(&mut editor, &EditEvent::Undo));
        assert_eq!(editor.content_string(), "hello");

        assert!(execute_event(&mut editor, &EditEvent::Redo));
        assert_eq!(editor.content_string(), "hello world");
    }

    #[test]
    fn test_select_all() {
        let mut editor = make_editor("hello world");
        assert!(execute_event(&mut editor, &EditEvent::SelectAll));
        let sel = editor.selection().unwrap();
        assert_eq!(sel.start(), 0);
        assert_eq!(sel.end(), 11);
    }

    #[test]
    fn test_toggle_bold_selection() {
        let mut editor = make_editor("hello");
        editor.set_selection(Some(Selection::new(0, 5)));
        assert!(execute_command(&mut editor, FormatCommand::Bold));
        assert_eq!(editor.content_string(), "**hello**");

        // Selection now covers the content; toggling again unwraps.
        assert_eq!(editor.selection(), Some(Selection::new(2, 7)));
        assert!(execute_command(&mut editor, FormatCommand::Bold));
        assert_eq!(editor.content_string(), "hello");
    }

    #[test]
    fn test_toggle_italic_word_at_cursor() {
        let mut editor = make_editor("say hello there");
        editor.set_cursor_offset(6);
        assert!(execute_command(&mut editor, FormatCommand::Italic));
        assert_eq!(editor.content_string(), "say *hello* there");

        // One undo reverts both inserted markers.
        assert!(editor.undo());
        assert_eq!(editor.content_string(), "say hello there");
    }

    #[test]
    fn test_italic_does_not_unwrap_bold() {
        let mut editor = make_editor("**hello**");
        editor.set_selection(Some(Selection::new(2, 7)));
        assert!(execute_command(&mut editor, FormatCommand::Italic));
        assert_eq!(editor.content_string(), "***hello***");
    }

    #[test]
    fn test_heading_set_replace_toggle() {
        let mut editor = make_editor("Title\nbody");
        editor.set_cursor_offset(3);

        assert!(execute_command(&mut editor, FormatCommand::Heading(1)));
        assert_eq!(editor.content_string(), "# Title\nbody");
        assert_eq!(editor.cursor_offset(), 5);

        assert!(execute_command(&mut editor, FormatCommand::Heading(3)));
        assert_eq!(editor.content_string(), "### Title\nbody");

        assert!(execute_command(&mut editor, FormatCommand::Heading(3)));
        assert_eq!(editor.content_string(), "Title\nbody");

        assert!(!execute_command(&mut editor, FormatCommand::Heading(4)));
    }

    #[test]
    fn test_list_commands() {
        let mut editor = make_editor("first\nsecond");
        editor.set_cursor_offset(8);

        assert!(execute_command(&mut editor, FormatCommand::BulletList));
        assert_eq!(editor.content_string(), "first\n  • second");
        assert_eq!(editor.cursor_offset(), 12);

        assert!(execute_command(&mut editor, FormatCommand::NumberedList));
        assert_eq!(editor.content_string(), "first\n  1. second");

        assert!(execute_command(&mut editor, FormatCommand::NumberedList));
        assert_eq!(editor.content_string(), "first\nsecond");
    }

    #[test]
    fn test_insert_link() {
        let mut editor = make_editor("visit Mono today");
        editor.set_selection(Some(Selection::new(6, 10)));
        assert!(execute_command(&mut editor, FormatCommand::Link));
        assert_eq!(editor.content_string(), "visit [Mono](url) today");
        assert_eq!(editor.selected_text().as_deref(), Some("url"));
    }
}
