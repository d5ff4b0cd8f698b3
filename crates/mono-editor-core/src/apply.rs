//! Style rules: turning matched spans into attribute edits.
//!
//! Rules never touch characters. Each one is a pure function of the span,
//! the theme, and (for bold and italic) the font already present where the
//! content starts, so a pass that starts from base attributes always
//! produces the same map.

use crate::attrs::{AttrChange, AttributeEdit, AttributeMap};
use crate::matcher::{Category, SyntaxSpan};
use crate::style::ThemeProvider;

/// Computes and commits the attribute edits for matched spans.
#[derive(Debug, Clone, Default)]
pub struct StyleApplicator<T> {
    theme: T,
}

impl<T: ThemeProvider> StyleApplicator<T> {
    pub fn new(theme: T) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &T {
        &self.theme
    }

    /// The edits `span` calls for. `attrs` is only read, to pick up the
    /// font bold and italic derive from.
    pub fn edits_for(&self, span: &SyntaxSpan, attrs: &AttributeMap) -> Vec<AttributeEdit> {
        match span.category {
            Category::Heading => self.heading(span),
            Category::Bold | Category::Italic => self.emphasis(span, attrs),
            Category::Link => self.link(span),
            Category::Hashtag => vec![
                AttributeEdit::new(
                    span.full_range.clone(),
                    AttrChange::Color(self.theme.hashtag_color()),
                ),
                AttributeEdit::new(span.full_range.clone(), AttrChange::Hashtag),
            ],
        }
    }

    /// Compute and commit the edits for `span`. Returns how many edits were
    /// dropped for falling outside the buffer.
    pub fn apply(&self, span: &SyntaxSpan, attrs: &mut AttributeMap) -> usize {
        let edits = self.edits_for(span, attrs);
        commit(&edits, attrs)
    }

    fn heading(&self, span: &SyntaxSpan) -> Vec<AttributeEdit> {
        let (Some(level), Some(prefix), Some(content)) =
            (span.heading_level(), span.capture(0), span.capture(1))
        else {
            return Vec::new();
        };

        let marker = format!("{} ", "#".repeat(usize::from(level)));
        let width = self.theme.measure(&marker, &self.theme.default_font());

        let mut edits = Vec::with_capacity(5);
        if !content.is_empty() {
            edits.push(AttributeEdit::new(
                content.clone(),
                AttrChange::Font(self.theme.heading_font(level)),
            ));
            edits.push(AttributeEdit::new(
                content,
                AttrChange::Color(self.theme.label_color()),
            ));
        }
        edits.push(AttributeEdit::new(
            span.full_range.clone(),
            AttrChange::Paragraph(self.theme.heading_paragraph(width)),
        ));
        edits.push(AttributeEdit::hide(prefix.clone()));
        edits.push(AttributeEdit::new(prefix, AttrChange::Kern(-width)));
        edits
    }

    fn emphasis(&self, span: &SyntaxSpan, attrs: &AttributeMap) -> Vec<AttributeEdit> {
        let (Some(open), Some(content), Some(close)) =
            (span.capture(0), span.capture(1), span.capture(2))
        else {
            return Vec::new();
        };

        let mut edits = Vec::with_capacity(3);
        if !content.is_empty() {
            let base = attrs
                .font_at(content.start)
                .unwrap_or_else(|| self.theme.default_font());
            let font = if span.category == Category::Bold {
                base.with_bold()
            } else {
                base.with_italic()
            };
            edits.push(AttributeEdit::new(content, AttrChange::Font(font)));
        }
        edits.push(AttributeEdit::hide(open));
        edits.push(AttributeEdit::hide(close));
        edits
    }

    fn link(&self, span: &SyntaxSpan) -> Vec<AttributeEdit> {
        let (Some(label), Some(url)) = (span.capture(0), span.capture(1)) else {
            return Vec::new();
        };
        let full = span.full_range.clone();

        vec![
            AttributeEdit::new(label.clone(), AttrChange::Color(self.theme.link_color())),
            AttributeEdit::new(label.clone(), AttrChange::Underline),
            // "[" before the label
            AttributeEdit::hide(full.start..label.start),
            // "](" between label and url
            AttributeEdit::hide(label.end..url.start),
            AttributeEdit::hide(url.clone()),
            // ")"
            AttributeEdit::hide(url.end..full.end),
        ]
    }
}

/// Commit edits in order, dropping any that fall outside the map.
pub fn commit(edits: &[AttributeEdit], attrs: &mut AttributeMap) -> usize {
    let mut dropped = 0;
    for edit in edits {
        if let Err(err) = attrs.apply(edit) {
            tracing::trace!(target: "mono::format", %err, "dropping attribute edit");
            dropped += 1;
        }
    }
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::Patterns;
    use crate::style::{Font, Theme};

    fn styled(category: Category, text: &str) -> (AttributeMap, Vec<SyntaxSpan>) {
        let theme = Theme::default();
        let applicator = StyleApplicator::new(&theme);
        let mut attrs = AttributeMap::new(text.chars().count(), theme.base_attributes());
        let spans = Patterns::compile().match_spans(category, text).unwrap();
        for span in &spans {
            assert_eq!(applicator.apply(span, &mut attrs), 0);
        }
        (attrs, spans)
    }

    fn hidden(attrs: &AttributeMap, offset: usize) -> bool {
        attrs.at(offset).is_some_and(|a| a.is_hidden())
    }

    #[test]
    fn test_heading_hugs_hidden_prefix() {
        let theme = Theme::default();
        let (attrs, _) = styled(Category::Heading, "# Title");
        let width = theme.measure("# ", &theme.default_font());

        assert!(hidden(&attrs, 0) && hidden(&attrs, 1));
        assert_eq!(attrs.at(0).unwrap().kern, Some(-width));
        let para = attrs.at(3).unwrap().paragraph.unwrap();
        assert_eq!(para.first_line_head_indent, -width);
        assert_eq!(attrs.font_at(2), Some(Font::bold_system(24.0)));
        assert!(!hidden(&attrs, 2));
    }

    #[test]
    fn test_heading_sizes_by_level() {
        let (attrs, _) = styled(Category::Heading, "## Two\n### Three");
        assert_eq!(attrs.font_at(3).unwrap().size, 20.0);
        assert_eq!(attrs.font_at(11).unwrap().size, 18.0);
    }

    #[test]
    fn test_empty_heading_only_prefix_and_paragraph() {
        let theme = Theme::default();
        let (attrs, _) = styled(Category::Heading, "# ");
        assert!(hidden(&attrs, 0));
        assert_eq!(attrs.font_at(0), Some(theme.default_font()));
    }

    #[test]
    fn test_bold_hides_delimiters() {
        let (attrs, _) = styled(Category::Bold, "x **bold** y");
        for offset in [2, 3, 8, 9] {
            assert!(hidden(&attrs, offset), "offset {offset} should be hidden");
        }
        assert!(attrs.font_at(4).unwrap().is_bold());
        assert!(!attrs.font_at(0).unwrap().is_bold());
        assert!(!hidden(&attrs, 4));
    }

    #[test]
    fn test_italic_preserves_size() {
        let theme = Theme::default();
        let applicator = StyleApplicator::new(&theme);
        let text = "# *big*";
        let patterns = Patterns::compile();
        let mut attrs = AttributeMap::new(7, theme.base_attributes());
        for category in [Category::Heading, Category::Italic] {
            for span in patterns.match_spans(category, text).unwrap() {
                applicator.apply(&span, &mut attrs);
            }
        }
        let font = attrs.font_at(3).unwrap();
        assert!(font.italic && font.is_bold());
        assert_eq!(font.size, 24.0);
    }

    #[test]
    fn test_link_shows_only_label() {
        let theme = Theme::default();
        let text = "[Mono](https://mono.app)";
        let (attrs, _) = styled(Category::Link, text);
        for (offset, c) in text.chars().enumerate() {
            let visible = (1..5).contains(&offset);
            assert_eq!(!hidden(&attrs, offset), visible, "char {c:?} at {offset}");
        }
        let label = attrs.at(1).unwrap();
        assert!(label.underline);
        assert_eq!(label.color, Some(theme.link_color()));
    }

    #[test]
    fn test_hashtag_stays_visible() {
        let theme = Theme::default();
        let (attrs, _) = styled(Category::Hashtag, "#todo ");
        for offset in 0..5 {
            let a = attrs.at(offset).unwrap();
            assert!(a.hashtag);
            assert_eq!(a.color, Some(theme.hashtag_color()));
        }
        assert!(!attrs.at(5).unwrap().hashtag);
    }

    #[test]
    fn test_out_of_bounds_edits_are_dropped() {
        let theme = Theme::default();
        let applicator = StyleApplicator::new(&theme);
        let span = Patterns::compile()
            .match_spans(Category::Bold, "**long text**")
            .unwrap()
            .remove(0);
        // A map shorter than the text the span came from.
        let mut attrs = AttributeMap::new(4, theme.base_attributes());
        assert!(applicator.apply(&span, &mut attrs) > 0);
        assert!(attrs.at(0).unwrap().is_hidden());
    }
}
