//! Attribute runs parallel to the text buffer.
//!
//! `AttributeMap` covers the buffer exactly with non-overlapping runs and
//! keeps adjacent equal runs merged, so two maps describing the same styling
//! always compare equal. That structural equality is what idempotence of a
//! reconciliation pass is checked against.

use std::ops::Range;

use crate::error::FormatError;
use crate::style::{Color, Font, ParagraphStyle};

/// Visual attributes of a run of characters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes {
    pub font: Option<Font>,
    pub color: Option<Color>,
    /// Extra spacing after each glyph; negative values pull text together.
    pub kern: Option<f32>,
    pub underline: bool,
    pub paragraph: Option<ParagraphStyle>,
    /// Marks characters belonging to a detected hashtag.
    pub hashtag: bool,
}

impl Attributes {
    /// Whether the characters render invisibly.
    pub fn is_hidden(&self) -> bool {
        self.color.map(Color::is_clear).unwrap_or(false)
    }
}

/// A single attribute override.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrChange {
    Font(Font),
    Color(Color),
    Kern(f32),
    Underline,
    Paragraph(ParagraphStyle),
    Hashtag,
}

impl AttrChange {
    /// Apply the change. Hidden characters stay hidden: a color change only
    /// takes effect on visible text, so a later category can't reveal the
    /// delimiters of an earlier one (`[*a*](u)`).
    pub fn apply_to(&self, attrs: &mut Attributes) {
        match self {
            AttrChange::Font(font) => attrs.font = Some(*font),
            AttrChange::Color(color) => {
                if !attrs.is_hidden() {
                    attrs.color = Some(*color);
                }
            }
            AttrChange::Kern(kern) => attrs.kern = Some(*kern),
            AttrChange::Underline => attrs.underline = true,
            AttrChange::Paragraph(style) => attrs.paragraph = Some(*style),
            AttrChange::Hashtag => attrs.hashtag = true,
        }
    }
}

/// An override to apply over a char range.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeEdit {
    pub range: Range<usize>,
    pub change: AttrChange,
}

impl AttributeEdit {
    pub fn new(range: Range<usize>, change: AttrChange) -> Self {
        Self { range, change }
    }

    /// Shorthand for hiding a range.
    pub fn hide(range: Range<usize>) -> Self {
        Self::new(range, AttrChange::Color(Color::CLEAR))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Run {
    len: usize,
    attrs: Attributes,
}

/// Run-length attribute storage keyed by char offset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeMap {
    runs: Vec<Run>,
}

impl AttributeMap {
    /// A map of `len` chars all carrying `attrs`.
    pub fn new(len: usize, attrs: Attributes) -> Self {
        let mut map = Self::default();
        map.reset(len, attrs);
        map
    }

    /// Total covered length in chars.
    pub fn len(&self) -> usize {
        self.runs.iter().map(|r| r.len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Replace everything with a single run.
    pub fn reset(&mut self, len: usize, attrs: Attributes) {
        self.runs.clear();
        if len > 0 {
            self.runs.push(Run { len, attrs });
        }
    }

    /// Attributes of the char at `offset`.
    pub fn at(&self, offset: usize) -> Option<&Attributes> {
        let mut start = 0;
        for run in &self.runs {
            if offset < start + run.len {
                return Some(&run.attrs);
            }
            start += run.len;
        }
        None
    }

    /// Explicit font of the char at `offset`, if any.
    pub fn font_at(&self, offset: usize) -> Option<Font> {
        self.at(offset).and_then(|a| a.font)
    }

    /// Iterate runs as `(range, attributes)`.
    pub fn runs(&self) -> impl Iterator<Item = (Range<usize>, &Attributes)> + '_ {
        let mut start = 0;
        self.runs.iter().map(move |run| {
            let range = start..start + run.len;
            start += run.len;
            (range, &run.attrs)
        })
    }

    /// Mutate the attributes of every char in `range`.
    pub fn update(
        &mut self,
        range: Range<usize>,
        mut f: impl FnMut(&mut Attributes),
    ) -> Result<(), FormatError> {
        self.check(&range)?;
        if range.is_empty() {
            return Ok(());
        }
        let first = self.split_at(range.start);
        let last = self.split_at(range.end);
        for run in &mut self.runs[first..last] {
            f(&mut run.attrs);
        }
        self.normalize();
        Ok(())
    }

    /// Apply one edit.
    pub fn apply(&mut self, edit: &AttributeEdit) -> Result<(), FormatError> {
        self.update(edit.range.clone(), |attrs| edit.change.apply_to(attrs))
    }

    /// Track a text mutation: `range` was replaced by `inserted` chars that
    /// carry `attrs`.
    pub fn splice(
        &mut self,
        range: Range<usize>,
        inserted: usize,
        attrs: Attributes,
    ) -> Result<(), FormatError> {
        self.check(&range)?;
        let first = self.split_at(range.start);
        let last = self.split_at(range.end);
        self.runs.drain(first..last);
        if inserted > 0 {
            self.runs.insert(
                first,
                Run {
                    len: inserted,
                    attrs,
                },
            );
        }
        self.normalize();
        Ok(())
    }

    fn check(&self, range: &Range<usize>) -> Result<(), FormatError> {
        let len = self.len();
        if range.start > range.end || range.end > len {
            return Err(FormatError::OutOfBounds {
                range: range.clone(),
                len,
            });
        }
        Ok(())
    }

    /// Index of the run starting exactly at `offset`, splitting a run if needed.
    fn split_at(&mut self, offset: usize) -> usize {
        let mut start = 0;
        for i in 0..self.runs.len() {
            let len = self.runs[i].len;
            if offset == start {
                return i;
            }
            if offset < start + len {
                let head = offset - start;
                let tail = Run {
                    len: len - head,
                    attrs: self.runs[i].attrs.clone(),
                };
                self.runs[i].len = head;
                self.runs.insert(i + 1, tail);
                return i + 1;
            }
            start += len;
        }
        self.runs.len()
    }

    fn normalize(&mut self) {
        let mut merged: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.len == 0 {
                continue;
            }
            match merged.last_mut() {
                Some(prev) if prev.attrs == run.attrs => prev.len += run.len,
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }
}
