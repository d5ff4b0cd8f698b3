//! List continuation: structural rewrites driven by keystrokes.
//!
//! Runs before generic edit handling. Space after a bare trigger (`*`, `-`,
//! `N.`) turns it into a live marker; newline continues or terminates a
//! list; backspace on an empty marker removes the line; paste goes in as
//! plain text. Every rewrite is a single undo step.

use std::ops::Range;

use crate::actions::EditEvent;
use crate::attrs::Attributes;
use crate::document::EditorDocument;
use crate::style::ThemeProvider;
use crate::text_helpers::{
    LIST_INDENT, ListMarker, detect_list_context, detect_list_trigger, find_line_start,
    find_word_boundary_backward, is_empty_marker_line, line_range, parse_marker_prefix,
};

/// What the continuation engine did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Not a structural event; generic handling should run.
    Declined,
    /// A bare trigger became a live marker.
    Converted(ListMarker),
    /// Newline on a marker line started the next item.
    Continued(ListMarker),
    /// Newline on an empty marker line ended the list.
    Terminated,
    /// Backspace on an empty marker line removed it.
    RemovedLine,
    /// Paste inserted plain text.
    Pasted,
    /// The edit would have broken a marker prefix and was dropped.
    Refused,
}

impl Continuation {
    pub fn is_consumed(&self) -> bool {
        !matches!(self, Continuation::Declined)
    }
}

/// Attributes a freshly inserted marker glyph carries until the next pass
/// restyles it the same way.
pub fn marker_attributes<T: ThemeProvider>(theme: &T, marker: ListMarker) -> Attributes {
    let mut attrs = theme.base_attributes();
    attrs.color = Some(theme.marker_color());
    if marker.is_numbered() {
        attrs.font = Some(theme.digit_font());
    }
    attrs
}

/// Try to handle `event` structurally.
pub fn handle_event<D, T>(doc: &mut D, event: &EditEvent, theme: &T) -> Continuation
where
    D: EditorDocument,
    T: ThemeProvider,
{
    let len = doc.len_chars();
    match event {
        EditEvent::InsertText { text, range } => {
            let range = range.normalize().clamp(len);
            if text == " "
                && range.is_caret()
                && let Some(marker) = convert_trigger(doc, range.start, theme)
            {
                return Continuation::Converted(marker);
            }
            guard(doc, range.into())
        }
        EditEvent::InsertNewline { range } => {
            let range = range.normalize().clamp(len);
            if !range.is_caret() {
                return guard(doc, range.into());
            }
            newline(doc, range.start, theme)
        }
        EditEvent::DeleteBackward { range } => {
            let range = range.normalize().clamp(len);
            if !range.is_caret() {
                return guard(doc, range.into());
            }
            if remove_empty_marker_line(doc, range.start) {
                return Continuation::RemovedLine;
            }
            match range.start {
                0 => Continuation::Declined,
                cursor => guard(doc, cursor - 1..cursor),
            }
        }
        EditEvent::DeleteForward { range } => {
            let range = range.normalize().clamp(len);
            if range.is_caret() && range.start < len {
                guard(doc, range.start..range.start + 1)
            } else {
                guard(doc, range.into())
            }
        }
        EditEvent::DeleteWordBackward { range } => {
            let range = range.normalize().clamp(len);
            if !range.is_caret() {
                return guard(doc, range.into());
            }
            let start = find_word_boundary_backward(doc, range.start);
            guard(doc, start..range.start)
        }
        EditEvent::DeleteToLineStart { range } => {
            let range = range.normalize().clamp(len);
            guard(doc, find_line_start(doc, range.start)..range.end)
        }
        EditEvent::Paste { text, range } => {
            let range = range.normalize().clamp(len);
            doc.replace_styled(range.into(), text, theme.base_attributes());
            doc.set_selection(None);
            Continuation::Pasted
        }
        _ => Continuation::Declined,
    }
}

fn guard<D: EditorDocument>(doc: &D, range: Range<usize>) -> Continuation {
    if allows_edit(doc, range.clone()) {
        Continuation::Declined
    } else {
        tracing::debug!(target: "mono::format", ?range, "edit would break a list marker; refused");
        Continuation::Refused
    }
}

/// Whether replacing `range` keeps every list marker intact.
///
/// An edit that takes part of a marker prefix (`"  • "`) is refused. Edits
/// that stay clear of it, or remove it whole, are fine.
pub fn allows_edit<D: EditorDocument>(doc: &D, range: Range<usize>) -> bool {
    if range.is_empty() {
        return true;
    }
    let lines = [range.start, range.end];
    lines.iter().all(|&offset| {
        let Some(ctx) = detect_list_context(doc, offset) else {
            return true;
        };
        let prefix = ctx.prefix;
        let overlaps = range.start < prefix.end && range.end > prefix.start;
        let covers = range.start <= prefix.start && range.end >= prefix.end;
        !overlaps || covers
    })
}

/// Insert indent, styled glyph and space at `at`. Returns chars inserted.
fn insert_marker<D, T>(doc: &mut D, at: usize, marker: ListMarker, theme: &T) -> usize
where
    D: EditorDocument,
    T: ThemeProvider,
{
    let glyph = marker.glyph();
    let mut pos = at;
    doc.insert_styled(pos, LIST_INDENT, theme.base_attributes());
    pos += LIST_INDENT.chars().count();
    doc.insert_styled(pos, &glyph, marker_attributes(theme, marker));
    pos += glyph.chars().count();
    doc.insert_styled(pos, " ", theme.base_attributes());
    pos + 1 - at
}

fn convert_trigger<D, T>(doc: &mut D, cursor: usize, theme: &T) -> Option<ListMarker>
where
    D: EditorDocument,
    T: ThemeProvider,
{
    let line_start = find_line_start(doc, cursor);
    let before = doc.slice(line_start..cursor)?;
    let marker = detect_list_trigger(&before)?;

    let inserted = doc.grouped(|doc| {
        doc.delete(line_start..cursor);
        insert_marker(doc, line_start, marker, theme)
    });
    doc.set_selection(None);
    doc.set_cursor_offset(line_start + inserted);
    tracing::trace!(target: "mono::format", ?marker, "converted list trigger");
    Some(marker)
}

fn newline<D, T>(doc: &mut D, cursor: usize, theme: &T) -> Continuation
where
    D: EditorDocument,
    T: ThemeProvider,
{
    let line = line_range(doc, cursor);
    let Some(text) = doc.slice(line.clone()) else {
        return Continuation::Declined;
    };

    if is_empty_marker_line(&text) {
        // Submitting an empty item ends the list: clear the line, no newline.
        doc.delete(line.clone());
        doc.set_selection(None);
        doc.set_cursor_offset(line.start);
        return Continuation::Terminated;
    }

    let before = doc.slice(line.start..cursor).unwrap_or_default();
    let Some(prefix) = parse_marker_prefix(&before) else {
        return Continuation::Declined;
    };
    let next = prefix.marker.next();

    let end = doc.grouped(|doc| {
        doc.insert_styled(cursor, "\n", theme.base_attributes());
        cursor + 1 + insert_marker(doc, cursor + 1, next, theme)
    });
    doc.set_selection(None);
    doc.set_cursor_offset(end);
    Continuation::Continued(next)
}

fn remove_empty_marker_line<D: EditorDocument>(doc: &mut D, cursor: usize) -> bool {
    let line = line_range(doc, cursor);
    let is_empty_marker = doc
        .slice(line.clone())
        .is_some_and(|text| !text.is_empty() && is_empty_marker_line(&text));
    if !is_empty_marker {
        return false;
    }

    // Take the line's newline with it when there is one.
    let end = if line.end < doc.len_chars() {
        line.end + 1
    } else {
        line.end
    };
    doc.delete(line.start..end);
    doc.set_selection(None);
    doc.set_cursor_offset(line.start);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Range as EditRange;
    use crate::style::Theme;
    use crate::{EditorRope, PlainEditor, UndoableBuffer};

    type TestEditor = PlainEditor<UndoableBuffer<EditorRope>>;

    fn make_editor(content: &str) -> TestEditor {
        let rope = EditorRope::new(content);
        let buf = UndoableBuffer::new(rope, 100);
        let mut editor = PlainEditor::new(buf);
        editor.set_cursor_offset(editor.len_chars());
        editor
    }

    fn at_cursor(editor: &TestEditor) -> EditRange {
        EditRange::caret(editor.cursor_offset())
    }

    fn space(editor: &mut TestEditor) -> Continuation {
        let event = EditEvent::InsertText {
            text: " ".into(),
            range: at_cursor(editor),
        };
        handle_event(editor, &event, &Theme::default())
    }

    fn newline_key(editor: &mut TestEditor) -> Continuation {
        let event = EditEvent::InsertNewline {
            range: at_cursor(editor),
        };
        handle_event(editor, &event, &Theme::default())
    }

    fn backspace(editor: &mut TestEditor) -> Continuation {
        let event = EditEvent::DeleteBackward {
            range: at_cursor(editor),
        };
        handle_event(editor, &event, &Theme::default())
    }

    #[test]
    fn test_asterisk_becomes_bullet() {
        let mut editor = make_editor("*");
        assert_eq!(
            space(&mut editor),
            Continuation::Converted(ListMarker::Bullet)
        );
        assert_eq!(editor.content_string(), "  • ");
        assert_eq!(editor.cursor_offset(), 4);

        let theme = Theme::default();
        assert_eq!(
            editor.attributes().at(2).unwrap().color,
            Some(theme.marker_color())
        );
    }

    #[test]
    fn test_indented_dash_and_number() {
        let mut editor = make_editor("notes\n   -");
        assert_eq!(
            space(&mut editor),
            Continuation::Converted(ListMarker::Dash)
        );
        assert_eq!(editor.content_string(), "notes\n  – ");

        let mut editor = make_editor("3.");
        assert_eq!(
            space(&mut editor),
            Continuation::Converted(ListMarker::Numbered(3))
        );
        assert_eq!(editor.content_string(), "  3. ");
        assert_eq!(editor.cursor_offset(), 5);
        let theme = Theme::default();
        assert_eq!(editor.attributes().font_at(2), Some(theme.digit_font()));
    }

    #[test]
    fn test_space_elsewhere_declines() {
        let mut editor = make_editor("a*");
        assert_eq!(space(&mut editor), Continuation::Declined);
        assert_eq!(editor.content_string(), "a*");
    }

    #[test]
    fn test_trigger_conversion_is_one_undo_step() {
        let mut editor = make_editor("");
        editor.insert(0, "*");
        space(&mut editor);
        assert_eq!(editor.content_string(), "  • ");

        assert!(editor.undo());
        assert_eq!(editor.content_string(), "*");
    }

    #[test]
    fn test_newline_continues_list() {
        let mut editor = make_editor("  • item");
        assert_eq!(
            newline_key(&mut editor),
            Continuation::Continued(ListMarker::Bullet)
        );
        assert_eq!(editor.content_string(), "  • item\n  • ");
        assert_eq!(editor.cursor_offset(), 13);
    }

    #[test]
    fn test_newline_increments_number() {
        let mut editor = make_editor("  9. ninth");
        assert_eq!(
            newline_key(&mut editor),
            Continuation::Continued(ListMarker::Numbered(10))
        );
        assert_eq!(editor.content_string(), "  9. ninth\n  10. ");
    }

    #[test]
    fn test_newline_on_empty_marker_terminates() {
        let mut editor = make_editor("  • ");
        assert_eq!(newline_key(&mut editor), Continuation::Terminated);
        assert_eq!(editor.content_string(), "");
        assert_eq!(editor.cursor_offset(), 0);

        let mut editor = make_editor("  • a\n  • ");
        assert_eq!(newline_key(&mut editor), Continuation::Terminated);
        assert_eq!(editor.content_string(), "  • a\n");
    }

    #[test]
    fn test_plain_newline_declines() {
        let mut editor = make_editor("2024.");
        assert_eq!(newline_key(&mut editor), Continuation::Declined);
        assert_eq!(editor.content_string(), "2024.");
    }

    #[test]
    fn test_backspace_removes_empty_marker_line() {
        let mut editor = make_editor("  – \nnext");
        editor.set_cursor_offset(4);
        assert_eq!(backspace(&mut editor), Continuation::RemovedLine);
        assert_eq!(editor.content_string(), "next");
        assert_eq!(editor.cursor_offset(), 0);
    }

    #[test]
    fn test_backspace_into_marker_is_refused() {
        let mut editor = make_editor("  • item");
        editor.set_cursor_offset(4);
        assert_eq!(backspace(&mut editor), Continuation::Refused);
        assert_eq!(editor.content_string(), "  • item");

        // Ordinary backspace inside the content is left to generic handling.
        editor.set_cursor_offset(8);
        assert_eq!(backspace(&mut editor), Continuation::Declined);
    }

    #[test]
    fn test_word_delete_into_marker_is_refused() {
        let theme = Theme::default();
        let mut editor = make_editor("  1. x");
        let event = EditEvent::DeleteWordBackward {
            range: EditRange::caret(5),
        };
        assert_eq!(
            handle_event(&mut editor, &event, &theme),
            Continuation::Refused
        );
        assert_eq!(editor.content_string(), "  1. x");

        // Deleting the word after the marker is left to generic handling.
        let event = EditEvent::DeleteWordBackward {
            range: EditRange::caret(6),
        };
        assert_eq!(
            handle_event(&mut editor, &event, &theme),
            Continuation::Declined
        );
    }

    #[test]
    fn test_line_start_delete_into_marker_is_refused() {
        let theme = Theme::default();
        let mut editor = make_editor("  • x");
        let event = EditEvent::DeleteToLineStart {
            range: EditRange::caret(3),
        };
        assert_eq!(
            handle_event(&mut editor, &event, &theme),
            Continuation::Refused
        );
        assert_eq!(editor.content_string(), "  • x");

        // From the end of the line the whole marker goes with the content.
        let event = EditEvent::DeleteToLineStart {
            range: EditRange::caret(5),
        };
        assert_eq!(
            handle_event(&mut editor, &event, &theme),
            Continuation::Declined
        );
    }

    #[test]
    fn test_guard_allows_whole_prefix() {
        let editor = make_editor("  • item\nplain");
        assert!(allows_edit(&editor, 0..4));
        assert!(allows_edit(&editor, 0..14));
        assert!(allows_edit(&editor, 5..8));
        assert!(!allows_edit(&editor, 3..6));
        assert!(!allows_edit(&editor, 1..2));
    }

    #[test]
    fn test_paste_is_plain() {
        let mut editor = make_editor("ab");
        editor.set_selection(Some(crate::Selection::new(0, 1)));
        let event = EditEvent::Paste {
            text: "**x**".into(),
            range: EditRange::new(0, 1),
        };
        let theme = Theme::default();
        assert_eq!(
            handle_event(&mut editor, &event, &theme),
            Continuation::Pasted
        );
        assert_eq!(editor.content_string(), "**x**b");
        assert_eq!(editor.cursor_offset(), 5);
        assert_eq!(editor.attributes().at(0), Some(&theme.base_attributes()));
    }
}
