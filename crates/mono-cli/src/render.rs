//! Terminal views of a styled note.

use std::fmt::Write as _;

use mono_editor_core::{Attributes, EditorDocument, ThemeProvider};

/// The note as a reader sees it: hidden syntax removed.
pub fn visible_text<D: EditorDocument>(doc: &D) -> String {
    let text = doc.content_string();
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (range, attrs) in doc.attributes().runs() {
        if attrs.is_hidden() {
            continue;
        }
        out.extend(chars.get(range).into_iter().flatten());
    }
    out
}

/// One line per attribute run: range, style, and text.
pub fn runs<D: EditorDocument, T: ThemeProvider>(doc: &D, theme: &T) -> String {
    let text = doc.content_string();
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::new();
    for (range, attrs) in doc.attributes().runs() {
        let slice: String = chars.get(range.clone()).into_iter().flatten().collect();
        let _ = writeln!(
            out,
            "{:>5}..{:<5} {:<28} {:?}",
            range.start,
            range.end,
            describe(attrs, theme),
            slice
        );
    }
    out
}

fn describe<T: ThemeProvider>(attrs: &Attributes, theme: &T) -> String {
    if attrs.is_hidden() {
        return "hidden".to_string();
    }
    let mut parts = Vec::new();
    if let Some(font) = attrs.font {
        parts.push(font.to_string());
    }
    match attrs.color {
        Some(color) if attrs.hashtag => parts.push(format!("tag {color}")),
        Some(color) if color == theme.marker_color() => parts.push(format!("marker {color}")),
        Some(color) if color == theme.link_color() => parts.push(format!("link {color}")),
        _ => {}
    }
    if attrs.underline {
        parts.push("underline".to_string());
    }
    if let Some(kern) = attrs.kern {
        parts.push(format!("kern {kern:.1}"));
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mono_editor_core::{NoteEditor, Theme};

    #[test]
    fn test_visible_text_drops_syntax() {
        let editor = NoteEditor::open(
            "# Title\nsome **bold** [link](http://x)",
            Theme::default(),
            (),
        );
        assert_eq!(visible_text(editor.document()), "Title\nsome bold link");
    }

    #[test]
    fn test_runs_lists_every_run() {
        let theme = Theme::default();
        let editor = NoteEditor::open("a *b*", theme.clone(), ());
        let listing = runs(editor.document(), &theme);
        assert!(listing.contains("hidden"));
        assert!(listing.contains("italic"));
        assert_eq!(listing.lines().count(), 4);
    }
}
