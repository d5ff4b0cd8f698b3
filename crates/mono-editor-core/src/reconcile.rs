//! The reconciliation driver.
//!
//! After every text change the whole note is re-derived: attributes reset to
//! the theme's base, list markers are colored, then each category is matched
//! and styled in [`Category::ORDER`]. Because a pass starts from base
//! attributes and matching is pure, running it twice changes nothing.
//!
//! The driver moves `Idle -> Scanning -> Applying -> Idle`. A pass that
//! starts while another one is running is rejected.

use smol_str::SmolStr;

use crate::apply::StyleApplicator;
use crate::attrs::{AttrChange, AttributeEdit, AttributeMap};
use crate::document::EditorDocument;
use crate::error::FormatError;
use crate::matcher::{Category, Patterns, Scan};
use crate::sink::HashtagSink;
use crate::style::ThemeProvider;
use crate::text_helpers::parse_marker_prefix;

/// Where the driver is in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    #[default]
    Idle,
    Scanning,
    Applying,
}

/// What one pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    spans: [usize; 5],
    /// List marker glyphs colored.
    pub markers: usize,
    /// Matches dropped for missing captures or engine errors.
    pub skipped_matches: usize,
    /// Categories not matched at all this pass.
    pub skipped_categories: Vec<Category>,
    /// Attribute edits that fell outside the text.
    pub dropped_edits: usize,
    /// Distinct hashtag names, in order of first appearance.
    pub tags: Vec<SmolStr>,
    /// Whether the attribute map differs from before the pass.
    pub changed: bool,
    /// Whether the saved cursor or selection had to be clamped.
    pub selection_clamped: bool,
}

impl PassReport {
    /// Spans of `category` that were styled.
    pub fn spans(&self, category: Category) -> usize {
        self.spans[category.index()]
    }

    pub fn total_spans(&self) -> usize {
        self.spans.iter().sum()
    }
}

/// Resets the state to `Idle` when a pass ends, including by unwinding.
struct PassGuard<'a> {
    state: &'a mut DriverState,
}

impl<'a> PassGuard<'a> {
    fn enter(state: &'a mut DriverState) -> Result<Self, FormatError> {
        if *state != DriverState::Idle {
            return Err(FormatError::Reentrant);
        }
        *state = DriverState::Scanning;
        Ok(Self { state })
    }

    fn advance(&mut self, next: DriverState) {
        *self.state = next;
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        *self.state = DriverState::Idle;
    }
}

/// Runs full-document formatting passes.
#[derive(Debug)]
pub struct Reconciler<T> {
    patterns: Patterns,
    applicator: StyleApplicator<T>,
    state: DriverState,
}

impl<T: ThemeProvider> Reconciler<T> {
    pub fn new(theme: T) -> Self {
        Self::with_patterns(theme, Patterns::compile())
    }

    pub fn with_patterns(theme: T, patterns: Patterns) -> Self {
        Self {
            patterns,
            applicator: StyleApplicator::new(theme),
            state: DriverState::Idle,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn theme(&self) -> &T {
        self.applicator.theme()
    }

    pub fn patterns(&self) -> &Patterns {
        &self.patterns
    }

    /// Re-derive every attribute of `doc` from its text.
    ///
    /// Cursor and selection survive the pass, clamped if they no longer fit.
    /// Hashtags go to `sink` once each. The only error is a rejected
    /// re-entrant pass; pattern failures are logged and reported instead.
    pub fn reconcile<D, S>(&mut self, doc: &mut D, sink: &mut S) -> Result<PassReport, FormatError>
    where
        D: EditorDocument,
        S: HashtagSink,
    {
        let Self {
            patterns,
            applicator,
            state,
        } = self;
        let mut guard = match PassGuard::enter(state) {
            Ok(guard) => guard,
            Err(err) => {
                tracing::warn!(target: "mono::format", %err, "pass rejected");
                return Err(err);
            }
        };

        let snapshot = doc.snapshot();
        let text = doc.content_string();
        let len = text.chars().count();
        let mut report = PassReport::default();

        let scans: Vec<(Category, Result<Scan, FormatError>)> = Category::ORDER
            .into_iter()
            .map(|category| (category, patterns.scan(category, &text)))
            .collect();

        guard.advance(DriverState::Applying);
        let theme = applicator.theme();
        let mut attrs = AttributeMap::new(len, theme.base_attributes());

        for edit in marker_edits(theme, &text) {
            report.markers += usize::from(matches!(edit.change, AttrChange::Color(_)));
            if attrs.apply(&edit).is_err() {
                report.dropped_edits += 1;
            }
        }

        for (category, scan) in scans {
            let scan = match scan {
                Ok(scan) => scan,
                Err(err) => {
                    tracing::debug!(target: "mono::format", %err, %category, "category skipped");
                    report.skipped_categories.push(category);
                    continue;
                }
            };
            report.skipped_matches += scan.skipped;
            for span in &scan.spans {
                report.dropped_edits += applicator.apply(span, &mut attrs);
                report.spans[category.index()] += 1;
                if category == Category::Hashtag && !report.tags.contains(&span.content) {
                    report.tags.push(span.content.clone());
                }
            }
        }

        report.changed = *doc.attributes() != attrs;
        *doc.attributes_mut() = attrs;

        if snapshot.fits(len) {
            doc.restore(snapshot);
        } else {
            report.selection_clamped = true;
            doc.restore(snapshot.clamped(len));
        }

        for tag in &report.tags {
            sink.on_hashtag_detected(tag);
        }

        tracing::debug!(
            target: "mono::format",
            len,
            spans = report.total_spans(),
            markers = report.markers,
            skipped = report.skipped_matches,
            dropped = report.dropped_edits,
            tags = report.tags.len(),
            changed = report.changed,
            "pass complete"
        );
        Ok(report)
    }
}

/// Color every live list marker glyph; numbered markers also get digit font.
fn marker_edits<T: ThemeProvider>(theme: &T, text: &str) -> Vec<AttributeEdit> {
    let mut edits = Vec::new();
    let mut line_start = 0;
    for line in text.split('\n') {
        if let Some(prefix) = parse_marker_prefix(line) {
            let glyph = line_start + prefix.glyph.start..line_start + prefix.glyph.end;
            edits.push(AttributeEdit::new(
                glyph.clone(),
                AttrChange::Color(theme.marker_color()),
            ));
            if prefix.marker.is_numbered() {
                edits.push(AttributeEdit::new(
                    glyph,
                    AttrChange::Font(theme.digit_font()),
                ));
            }
        }
        line_start += line.chars().count() + 1;
    }
    edits
}
