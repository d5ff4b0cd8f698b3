//! Visual vocabulary of the styled buffer: colors, fonts, paragraph styles,
//! and the host theme that supplies defaults.

use crate::attrs::Attributes;
use crate::config::EditorConfig;

/// RGBA color packed as `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    /// Fully transparent. Hidden markdown delimiters are drawn in this color.
    pub const CLEAR: Color = Color(0x0000_0000);

    pub const fn rgba(packed: u32) -> Self {
        Self(packed)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional). Six-digit
    /// colors are fully opaque.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        match digits.len() {
            6 => Some(Self((value << 8) | 0xFF)),
            8 => Some(Self(value)),
            _ => None,
        }
    }

    pub fn packed(self) -> u32 {
        self.0
    }

    pub fn alpha(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Whether text in this color is invisible.
    pub fn is_clear(self) -> bool {
        self.alpha() == 0
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontFamily {
    #[default]
    System,
    /// System font with fixed-width digits, used for numbered list markers.
    MonospacedDigit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub family: FontFamily,
    pub size: f32,
    pub weight: FontWeight,
    pub italic: bool,
}

impl Font {
    pub fn system(size: f32) -> Self {
        Self {
            family: FontFamily::System,
            size,
            weight: FontWeight::Regular,
            italic: false,
        }
    }

    pub fn bold_system(size: f32) -> Self {
        Self::system(size).with_bold()
    }

    pub fn monospaced_digit(size: f32) -> Self {
        Self {
            family: FontFamily::MonospacedDigit,
            ..Self::system(size)
        }
    }

    /// Bold variant at the same point size.
    pub fn with_bold(self) -> Self {
        Self {
            weight: FontWeight::Bold,
            ..self
        }
    }

    /// Italic variant at the same point size.
    pub fn with_italic(self) -> Self {
        Self {
            italic: true,
            ..self
        }
    }

    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }
}

impl std::fmt::Display for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let family = match self.family {
            FontFamily::System => "system",
            FontFamily::MonospacedDigit => "mono-digit",
        };
        write!(f, "{family} {}", self.size)?;
        if self.is_bold() {
            write!(f, " bold")?;
        }
        if self.italic {
            write!(f, " italic")?;
        }
        Ok(())
    }
}

/// Paragraph layout applied to a whole line.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParagraphStyle {
    pub first_line_head_indent: f32,
    pub head_indent: f32,
    pub spacing_before: f32,
    pub spacing_after: f32,
    pub line_spacing: f32,
}

/// Host theme: fallback font and colors, plus text measurement.
///
/// The engine never hardcodes styling; every value comes through here.
pub trait ThemeProvider {
    /// Font used where no explicit font attribute exists.
    fn default_font(&self) -> Font;

    /// Font for numbered list markers.
    fn digit_font(&self) -> Font;

    /// Bold font for heading content of `level` (1-3).
    fn heading_font(&self, level: u8) -> Font;

    fn label_color(&self) -> Color;

    fn marker_color(&self) -> Color;

    fn link_color(&self) -> Color;

    fn hashtag_color(&self) -> Color;

    /// Paragraph style of ordinary lines.
    fn body_paragraph(&self) -> ParagraphStyle;

    /// Paragraph style of a heading line whose hidden prefix is `prefix_width` wide.
    fn heading_paragraph(&self, prefix_width: f32) -> ParagraphStyle;

    /// Rendered width of `text` in `font`.
    fn measure(&self, text: &str, font: &Font) -> f32;

    /// Attributes every character starts a reconciliation pass with.
    fn base_attributes(&self) -> Attributes {
        Attributes {
            font: Some(self.default_font()),
            color: Some(self.label_color()),
            paragraph: Some(self.body_paragraph()),
            ..Attributes::default()
        }
    }
}

impl<T: ThemeProvider> ThemeProvider for &T {
    fn default_font(&self) -> Font {
        (*self).default_font()
    }
    fn digit_font(&self) -> Font {
        (*self).digit_font()
    }
    fn heading_font(&self, level: u8) -> Font {
        (*self).heading_font(level)
    }
    fn label_color(&self) -> Color {
        (*self).label_color()
    }
    fn marker_color(&self) -> Color {
        (*self).marker_color()
    }
    fn link_color(&self) -> Color {
        (*self).link_color()
    }
    fn hashtag_color(&self) -> Color {
        (*self).hashtag_color()
    }
    fn body_paragraph(&self) -> ParagraphStyle {
        (*self).body_paragraph()
    }
    fn heading_paragraph(&self, prefix_width: f32) -> ParagraphStyle {
        (*self).heading_paragraph(prefix_width)
    }
    fn measure(&self, text: &str, font: &Font) -> f32 {
        (*self).measure(text, font)
    }
}

/// Config-driven theme with approximate glyph metrics.
///
/// Real hosts measure with their text system; this is good enough for
/// headless use and keeps measurement deterministic in tests.
#[derive(Debug, Clone, Default)]
pub struct Theme {
    config: EditorConfig,
}

impl Theme {
    pub fn from_config(config: EditorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    fn advance(c: char, font: &Font) -> f32 {
        let em = match c {
            ' ' => 0.28,
            '0'..='9' if font.family == FontFamily::MonospacedDigit => 0.6,
            '0'..='9' => 0.55,
            '#' => 0.62,
            'i' | 'l' | 'j' | '.' | ',' | '\'' | '|' | '!' => 0.26,
            'm' | 'w' | 'M' | 'W' => 0.85,
            c if c.is_uppercase() => 0.68,
            _ => 0.52,
        };
        let weight = if font.is_bold() { 1.05 } else { 1.0 };
        em * font.size * weight
    }
}

impl ThemeProvider for Theme {
    fn default_font(&self) -> Font {
        Font::system(self.config.font_size)
    }

    fn digit_font(&self) -> Font {
        Font::monospaced_digit(self.config.font_size)
    }

    fn heading_font(&self, level: u8) -> Font {
        Font::bold_system(self.config.heading_size(level))
    }

    fn label_color(&self) -> Color {
        self.config.label_color
    }

    fn marker_color(&self) -> Color {
        self.config.marker_color
    }

    fn link_color(&self) -> Color {
        self.config.link_color
    }

    fn hashtag_color(&self) -> Color {
        self.config.hashtag_color
    }

    fn body_paragraph(&self) -> ParagraphStyle {
        ParagraphStyle {
            line_spacing: self.config.line_spacing,
            ..ParagraphStyle::default()
        }
    }

    fn heading_paragraph(&self, prefix_width: f32) -> ParagraphStyle {
        ParagraphStyle {
            first_line_head_indent: -prefix_width,
            head_indent: 0.0,
            spacing_before: self.config.heading_spacing_before,
            spacing_after: self.config.heading_spacing_after,
            line_spacing: self.config.line_spacing,
        }
    }

    fn measure(&self, text: &str, font: &Font) -> f32 {
        text.chars().map(|c| Self::advance(c, font)).sum()
    }
}
