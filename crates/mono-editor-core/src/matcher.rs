//! Pattern matching over the raw note text.
//!
//! Every category is matched against the *whole* text on every pass; there
//! is no incremental diffing. Matching is pure: the same text always yields
//! the same spans, which is what makes a reconciliation pass idempotent.
//!
//! Italic needs lookaround to stay off bold delimiters, so patterns run on
//! `fancy-regex` (a backtracking engine layered over `regex`). It reports
//! byte offsets; spans are converted to char offsets before leaving here.

use std::fmt;
use std::ops::Range;

use fancy_regex::{Captures, Regex};
use smol_str::SmolStr;

use crate::error::FormatError;

pub use crate::text_helpers::{ListMarker, detect_list_context, detect_list_trigger};

/// Inline syntax categories, in the order a pass applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Heading,
    Bold,
    Italic,
    Link,
    Hashtag,
}

impl Category {
    /// Fixed application order of a reconciliation pass.
    pub const ORDER: [Category; 5] = [
        Category::Heading,
        Category::Bold,
        Category::Italic,
        Category::Link,
        Category::Hashtag,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Heading => "heading",
            Category::Bold => "bold",
            Category::Italic => "italic",
            Category::Link => "link",
            Category::Hashtag => "hashtag",
        }
    }

    /// Source patterns, tried in order. Spans from every pattern are kept.
    pub fn default_sources(self) -> &'static [&'static str] {
        match self {
            Category::Heading => &[r"(?m)^(#{1,3} )([^\r\n]*)"],
            Category::Bold => &[r"\*\*(.*?)\*\*", r"__(.*?)__"],
            Category::Italic => &[
                r"(?<![\*])(\*)((?!\*).+?)(\*)(?![\*])",
                r"(?<![_])(_)((?!_).+?)(_)(?![_])",
            ],
            Category::Link => &[r"\[(.*?)\]\((.*?)\)"],
            Category::Hashtag => &[r"#[a-zA-Z0-9_]+(?=\s|$)"],
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Category::Heading => 0,
            Category::Bold => 1,
            Category::Italic => 2,
            Category::Link => 3,
            Category::Hashtag => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One match of a category pattern, in char offsets.
///
/// Capture layout per category:
/// - heading: `[prefix, content]`
/// - bold, italic: `[open delimiter, content, close delimiter]`
/// - link: `[display text, url]`
/// - hashtag: `[name]` (without `#`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxSpan {
    pub category: Category,
    pub full_range: Range<usize>,
    pub captures: Vec<Range<usize>>,
    /// Text of the semantic part: heading content, emphasized text, link
    /// display text, or hashtag name.
    pub content: SmolStr,
}

impl SyntaxSpan {
    pub fn capture(&self, index: usize) -> Option<Range<usize>> {
        self.captures.get(index).cloned()
    }

    /// Heading level (1-3), from the length of the `#` run.
    pub fn heading_level(&self) -> Option<u8> {
        if self.category != Category::Heading {
            return None;
        }
        let prefix = self.capture(0)?;
        u8::try_from(prefix.len().checked_sub(1)?).ok()
    }
}

/// Result of scanning one category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scan {
    pub spans: Vec<SyntaxSpan>,
    /// Matches dropped for missing captures or runtime errors.
    pub skipped: usize,
}

/// Maps byte offsets of a string to char offsets.
struct CharIndex {
    starts: Vec<usize>,
}

impl CharIndex {
    fn new(text: &str) -> Self {
        Self {
            starts: text.char_indices().map(|(b, _)| b).collect(),
        }
    }

    fn char_of(&self, byte: usize) -> usize {
        self.starts.partition_point(|&start| start < byte)
    }

    fn range(&self, bytes: Range<usize>) -> Range<usize> {
        self.char_of(bytes.start)..self.char_of(bytes.end)
    }
}

/// The engine-owned patterns, compiled once.
///
/// A category whose pattern fails to compile keeps the error instead; only
/// that category is skipped, everything else still matches.
pub struct Patterns {
    compiled: [Result<Vec<Regex>, FormatError>; 5],
}

impl Default for Patterns {
    fn default() -> Self {
        Self::compile()
    }
}

impl fmt::Debug for Patterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_map();
        for category in Category::ORDER {
            list.entry(&category.name(), &self.is_available(category));
        }
        list.finish()
    }
}

impl Patterns {
    /// Compile the default pattern set.
    pub fn compile() -> Self {
        Self {
            compiled: Category::ORDER
                .map(|category| Self::build(category, category.default_sources())),
        }
    }

    /// Replace one category's patterns. Hosts use this to tune matching;
    /// tests use it to exercise compile failures.
    pub fn with_sources(mut self, category: Category, sources: &[&str]) -> Self {
        self.compiled[category.index()] = Self::build(category, sources);
        self
    }

    fn build(category: Category, sources: &[&str]) -> Result<Vec<Regex>, FormatError> {
        let compiled = sources
            .iter()
            .map(|source| Regex::new(source))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| FormatError::compile(category, err));
        if let Err(err) = &compiled {
            tracing::warn!(
                target: "mono::format",
                %err,
                "pattern compile failed; category disabled"
            );
        }
        compiled
    }

    /// Whether `category` compiled and will be matched.
    pub fn is_available(&self, category: Category) -> bool {
        self.compiled[category.index()].is_ok()
    }

    /// All spans of `category` in `text`, in pattern order then text order.
    pub fn match_spans(
        &self,
        category: Category,
        text: &str,
    ) -> Result<Vec<SyntaxSpan>, FormatError> {
        self.scan(category, text).map(|scan| scan.spans)
    }

    /// Like [`match_spans`](Self::match_spans), also counting dropped matches.
    pub fn scan(&self, category: Category, text: &str) -> Result<Scan, FormatError> {
        let regexes = self.compiled[category.index()].as_ref().map_err(Clone::clone)?;
        let index = CharIndex::new(text);
        let mut scan = Scan::default();

        for regex in regexes {
            for caps in regex.captures_iter(text) {
                let caps = match caps {
                    Ok(caps) => caps,
                    Err(err) => {
                        // The iterator does not advance past an engine error.
                        let err = FormatError::runtime(category, err);
                        tracing::debug!(target: "mono::format", %err, "abandoning pattern");
                        scan.skipped += 1;
                        break;
                    }
                };
                match build_span(category, &caps, text, &index) {
                    Ok(span) => scan.spans.push(span),
                    Err(err) => {
                        tracing::trace!(target: "mono::format", %err, "skipping match");
                        scan.skipped += 1;
                    }
                }
            }
        }

        Ok(scan)
    }
}

fn group(
    category: Category,
    caps: &Captures<'_>,
    at: usize,
    group: usize,
) -> Result<Range<usize>, FormatError> {
    caps.get(group)
        .map(|m| m.start()..m.end())
        .ok_or(FormatError::InvalidCapture {
            category,
            at,
            group,
        })
}

fn build_span(
    category: Category,
    caps: &Captures<'_>,
    text: &str,
    index: &CharIndex,
) -> Result<SyntaxSpan, FormatError> {
    let full = group(category, caps, 0, 0)?;
    let at = index.char_of(full.start);

    // Byte ranges of the captures, and of the semantic content among them.
    let (bytes, content) = match category {
        Category::Heading => {
            let prefix = group(category, caps, at, 1)?;
            let content = group(category, caps, at, 2)?;
            (vec![prefix, content.clone()], content)
        }
        Category::Bold => {
            let content = group(category, caps, at, 1)?;
            let open = full.start..content.start;
            let close = content.end..full.end;
            if open.len() != 2 || close.len() != 2 {
                return Err(FormatError::InvalidCapture {
                    category,
                    at,
                    group: 1,
                });
            }
            (vec![open, content.clone(), close], content)
        }
        Category::Italic => {
            let open = group(category, caps, at, 1)?;
            let content = group(category, caps, at, 2)?;
            let close = group(category, caps, at, 3)?;
            (vec![open, content.clone(), close], content)
        }
        Category::Link => {
            let label = group(category, caps, at, 1)?;
            let url = group(category, caps, at, 2)?;
            (vec![label.clone(), url], label)
        }
        Category::Hashtag => {
            // Skip the leading '#'.
            let name = full.start + 1..full.end;
            (vec![name.clone()], name)
        }
    };

    let content = text.get(content).ok_or(FormatError::InvalidCapture {
        category,
        at,
        group: 0,
    })?;

    Ok(SyntaxSpan {
        category,
        full_range: index.range(full),
        captures: bytes.into_iter().map(|r| index.range(r)).collect(),
        content: SmolStr::new(content),
    })
}
