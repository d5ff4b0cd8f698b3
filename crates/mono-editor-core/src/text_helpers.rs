//! Text navigation and list-marker helpers.
//!
//! These functions work with the `EditorDocument` trait to find line and
//! word boundaries, and recognize the live list markers (`•`, `–`, `N.`)
//! the continuation engine inserts.

use std::ops::Range;

use smol_str::{SmolStr, format_smolstr};

use crate::document::EditorDocument;

/// Indentation placed before every live list marker.
pub const LIST_INDENT: &str = "  ";

/// Find start of line containing offset.
pub fn find_line_start<D: EditorDocument>(doc: &D, offset: usize) -> usize {
    if offset == 0 {
        return 0;
    }

    let mut pos = offset.min(doc.len_chars());
    while pos > 0 {
        if let Some('\n') = doc.char_at(pos - 1) {
            return pos;
        }
        pos -= 1;
    }
    0
}

/// Find end of line containing offset (position of newline or end of doc).
pub fn find_line_end<D: EditorDocument>(doc: &D, offset: usize) -> usize {
    let len = doc.len_chars();
    if offset >= len {
        return len;
    }

    let mut pos = offset;
    while pos < len {
        if let Some('\n') = doc.char_at(pos) {
            return pos;
        }
        pos += 1;
    }
    len
}

/// Char range of the line containing offset, without its newline.
pub fn line_range<D: EditorDocument>(doc: &D, offset: usize) -> Range<usize> {
    find_line_start(doc, offset)..find_line_end(doc, offset)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Find word boundary backward from cursor.
pub fn find_word_boundary_backward<D: EditorDocument>(doc: &D, cursor: usize) -> usize {
    if cursor == 0 {
        return 0;
    }

    let mut pos = cursor;

    // Skip any whitespace/punctuation immediately before cursor.
    while pos > 0 {
        match doc.char_at(pos - 1) {
            Some(c) if is_word_char(c) => break,
            Some(_) => pos -= 1,
            None => break,
        }
    }

    // Skip the word characters.
    while pos > 0 {
        match doc.char_at(pos - 1) {
            Some(c) if is_word_char(c) => pos -= 1,
            _ => break,
        }
    }

    pos
}

/// The word touching `offset`, if any. Unlike the boundary finder this
/// never skips punctuation, so a cursor between two spaces yields `None`.
pub fn word_at<D: EditorDocument>(doc: &D, offset: usize) -> Option<Range<usize>> {
    let len = doc.len_chars();
    let mut start = offset.min(len);
    while start > 0 && doc.char_at(start - 1).is_some_and(is_word_char) {
        start -= 1;
    }
    let mut end = offset.min(len);
    while end < len && doc.char_at(end).is_some_and(is_word_char) {
        end += 1;
    }
    (start < end).then_some(start..end)
}

/// A live list marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    /// `•`, typed as `*`.
    Bullet,
    /// `–`, typed as `-`.
    Dash,
    /// `N.`, typed as itself.
    Numbered(u32),
}

impl ListMarker {
    /// The visible marker glyph(s), without indent or trailing space.
    pub fn glyph(&self) -> SmolStr {
        match self {
            ListMarker::Bullet => SmolStr::new_static("•"),
            ListMarker::Dash => SmolStr::new_static("–"),
            ListMarker::Numbered(n) => format_smolstr!("{n}."),
        }
    }

    /// Indent, glyph and trailing space: the text a marker line starts with.
    pub fn prefix(&self) -> SmolStr {
        format_smolstr!("{LIST_INDENT}{} ", self.glyph())
    }

    /// Marker for the following list item.
    pub fn next(&self) -> Self {
        match self {
            ListMarker::Numbered(n) => ListMarker::Numbered(n.saturating_add(1)),
            other => *other,
        }
    }

    pub fn is_numbered(&self) -> bool {
        matches!(self, ListMarker::Numbered(_))
    }
}

/// A marker prefix recognized at the start of a line, in chars relative to
/// the line start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPrefix {
    pub marker: ListMarker,
    /// The glyph chars (`•`, `–`, or digits plus `.`).
    pub glyph: Range<usize>,
    /// Indent, glyph and trailing space.
    pub len: usize,
}

/// Recognize `"  • "`, `"  – "` or `"  N. "` at the start of `line`.
pub fn parse_marker_prefix(line: &str) -> Option<MarkerPrefix> {
    let rest = line.strip_prefix(LIST_INDENT)?;
    let indent = LIST_INDENT.chars().count();

    let (marker, glyph_len) = if rest.starts_with("• ") {
        (ListMarker::Bullet, 1)
    } else if rest.starts_with("– ") {
        (ListMarker::Dash, 1)
    } else {
        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 || !rest[digits..].starts_with(". ") {
            return None;
        }
        let number = rest[..digits].parse().ok()?;
        (ListMarker::Numbered(number), digits + 1)
    };

    Some(MarkerPrefix {
        marker,
        glyph: indent..indent + glyph_len,
        len: indent + glyph_len + 1,
    })
}

/// Whether a line holds nothing but a marker: trimmed `•` or `–`, or a
/// live numbered prefix with only whitespace after it. A bare `2024.` is
/// ordinary text, not an empty marker.
pub fn is_empty_marker_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed == "•" || trimmed == "–" {
        return true;
    }
    parse_marker_prefix(line).is_some_and(|prefix| {
        line.chars().skip(prefix.len).all(char::is_whitespace)
    })
}

/// Recognize a bare list trigger: optional whitespace, then `*`, `-` or
/// digits followed by `.`, and nothing else.
pub fn detect_list_trigger(line_before_cursor: &str) -> Option<ListMarker> {
    match line_before_cursor.trim_start() {
        "*" => Some(ListMarker::Bullet),
        "-" => Some(ListMarker::Dash),
        trigger => {
            let digits = trigger.strip_suffix('.')?;
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            digits.parse().ok().map(ListMarker::Numbered)
        }
    }
}

/// Describes the list item the cursor is in, in absolute char offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListContext {
    pub marker: ListMarker,
    /// Indent, glyph and trailing space.
    pub prefix: Range<usize>,
}

/// Detect if offset is on a marker line and return its context.
pub fn detect_list_context<D: EditorDocument>(doc: &D, offset: usize) -> Option<ListContext> {
    let line = line_range(doc, offset);
    if line.is_empty() {
        return None;
    }

    let text = doc.slice(line.clone())?;
    let prefix = parse_marker_prefix(&text)?;

    Some(ListContext {
        marker: prefix.marker,
        prefix: line.start..line.start + prefix.len,
    })
}
