//! Editor configuration: sizes, spacing and colors the formatting engine
//! styles with.
//!
//! `EditorConfig::default()` is the stock Mono look. Hosts override fields
//! (the CLI reads them from a KDL file) and build a [`Theme`](crate::Theme)
//! from the result.

use crate::style::Color;

/// Tunable values consumed by the default theme and the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Point size of body text.
    pub font_size: f32,
    /// Point sizes of heading levels 1, 2 and 3.
    pub heading_sizes: [f32; 3],
    /// Line spacing of body paragraphs.
    pub line_spacing: f32,
    /// Spacing above a heading paragraph.
    pub heading_spacing_before: f32,
    /// Spacing below a heading paragraph.
    pub heading_spacing_after: f32,
    /// Body text color.
    pub label_color: Color,
    /// List marker glyph color.
    pub marker_color: Color,
    /// Link display text color.
    pub link_color: Color,
    /// Hashtag color.
    pub hashtag_color: Color,
    /// Undo steps kept by the reference host buffer.
    pub undo_depth: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            heading_sizes: [24.0, 20.0, 18.0],
            line_spacing: 6.0,
            heading_spacing_before: 12.0,
            heading_spacing_after: 8.0,
            label_color: Color::rgba(0x1C1C1EFF),
            marker_color: Color::rgba(0xF2991AFF),
            link_color: Color::rgba(0x007AFFFF),
            hashtag_color: Color::rgba(0xF2991AFF),
            undo_depth: 100,
        }
    }
}

impl EditorConfig {
    /// Heading point size for `level` (1-3). Levels outside that range fall
    /// back to the body size.
    pub fn heading_size(&self, level: u8) -> f32 {
        match level {
            1..=3 => self.heading_sizes[usize::from(level - 1)],
            _ => self.font_size,
        }
    }
}
