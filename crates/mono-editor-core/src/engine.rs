//! The formatting engine: one entry point per host callback.
//!
//! Keystrokes go to the continuation engine first; whatever it declines is
//! executed as a plain edit. Any edit that changes the text is reported to
//! the mutation observer and followed by a full reconciliation pass.

use crate::actions::{EditEvent, FormatCommand};
use crate::continuation::{self, Continuation};
use crate::document::EditorDocument;
use crate::execute::{execute_command, execute_event};
use crate::matcher::Patterns;
use crate::reconcile::{DriverState, PassReport, Reconciler};
use crate::sink::{HashtagSink, MutationObserver};
use crate::style::ThemeProvider;
use crate::types::EditInfo;

/// Result of feeding one event or command to the engine.
#[derive(Debug, Clone, Default)]
pub struct InputOutcome {
    /// Whether the event was consumed (including refused edits).
    pub handled: bool,
    /// What the continuation engine did, if it took the event.
    pub continuation: Option<Continuation>,
    /// The buffer mutation the event caused, if any.
    pub edit: Option<EditInfo>,
    /// The pass that followed the mutation.
    pub report: Option<PassReport>,
}

impl InputOutcome {
    pub fn changed_text(&self) -> bool {
        self.edit.is_some()
    }
}

/// Owns the patterns, the theme, and the host callbacks.
///
/// Generic over the hashtag sink `S`, the theme `T` and the mutation
/// observer `O`, so hosts pay nothing for callbacks they don't use.
#[derive(Debug)]
pub struct FormattingEngine<S, T, O = ()> {
    reconciler: Reconciler<T>,
    sink: S,
    observer: O,
}

impl<S: HashtagSink, T: ThemeProvider> FormattingEngine<S, T, ()> {
    pub fn new(theme: T, sink: S) -> Self {
        Self::with_patterns(theme, sink, Patterns::compile())
    }

    pub fn with_patterns(theme: T, sink: S, patterns: Patterns) -> Self {
        Self {
            reconciler: Reconciler::with_patterns(theme, patterns),
            sink,
            observer: (),
        }
    }
}

impl<S, T, O> FormattingEngine<S, T, O>
where
    S: HashtagSink,
    T: ThemeProvider,
    O: MutationObserver,
{
    /// Swap in a mutation observer.
    pub fn with_observer<O2: MutationObserver>(self, observer: O2) -> FormattingEngine<S, T, O2> {
        FormattingEngine {
            reconciler: self.reconciler,
            sink: self.sink,
            observer,
        }
    }

    pub fn theme(&self) -> &T {
        self.reconciler.theme()
    }

    pub fn patterns(&self) -> &Patterns {
        self.reconciler.patterns()
    }

    pub fn state(&self) -> DriverState {
        self.reconciler.state()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Handle one host input event.
    pub fn handle_input<D: EditorDocument>(
        &mut self,
        doc: &mut D,
        event: &EditEvent,
    ) -> InputOutcome {
        let reconciler = &self.reconciler;
        let (outcome, edit) = track_edit(doc, |doc| {
            let taken = continuation::handle_event(doc, event, reconciler.theme());
            if taken.is_consumed() {
                InputOutcome {
                    handled: true,
                    continuation: Some(taken),
                    ..InputOutcome::default()
                }
            } else {
                InputOutcome {
                    handled: execute_event(doc, event),
                    ..InputOutcome::default()
                }
            }
        });
        tracing::trace!(target: "mono::format", ?event, handled = outcome.handled, "input");
        self.finish(doc, outcome, edit)
    }

    /// Apply a menu or toolbar formatting command.
    pub fn apply<D: EditorDocument>(
        &mut self,
        doc: &mut D,
        command: FormatCommand,
    ) -> InputOutcome {
        let (handled, edit) = track_edit(doc, |doc| execute_command(doc, command));
        tracing::trace!(target: "mono::format", ?command, handled, "command");
        let outcome = InputOutcome {
            handled,
            ..InputOutcome::default()
        };
        self.finish(doc, outcome, edit)
    }

    /// Replace the whole note (opening a note, external sync) and restyle it.
    pub fn load<D: EditorDocument>(&mut self, doc: &mut D, text: &str) -> PassReport {
        let edit = doc.load(text);
        self.observer.on_mutation(&edit);
        self.reconcile(doc)
    }

    /// Run a reconciliation pass now.
    ///
    /// A rejected pass is logged by the driver and yields an empty report.
    pub fn reconcile<D: EditorDocument>(&mut self, doc: &mut D) -> PassReport {
        self.reconciler
            .reconcile(doc, &mut self.sink)
            .unwrap_or_default()
    }

    fn finish<D: EditorDocument>(
        &mut self,
        doc: &mut D,
        mut outcome: InputOutcome,
        edit: Option<EditInfo>,
    ) -> InputOutcome {
        if let Some(edit) = &edit {
            self.observer.on_mutation(edit);
            outcome.report = Some(self.reconcile(doc));
        }
        outcome.edit = edit;
        outcome
    }
}

/// Run `f` and return the edit it recorded, leaving the previous one in
/// place when it recorded none.
fn track_edit<D, R>(doc: &mut D, f: impl FnOnce(&mut D) -> R) -> (R, Option<EditInfo>)
where
    D: EditorDocument,
{
    let previous = doc.last_edit();
    doc.set_last_edit(None);
    let result = f(doc);
    let edit = doc.last_edit();
    if edit.is_none() {
        doc.set_last_edit(previous);
    }
    (result, edit)
}

#[cfg(test)]
mod tests {
    use smol_str::SmolStr;

    use super::*;
    use crate::actions::Range;
    use crate::document::RopeEditor;
    use crate::matcher::Category;
    use crate::style::Theme;

    type TestEngine = FormattingEngine<Vec<SmolStr>, Theme, Vec<EditInfo>>;

    fn setup(text: &str) -> (TestEngine, RopeEditor) {
        let mut engine = FormattingEngine::new(Theme::default(), Vec::new())
            .with_observer(Vec::new());
        let mut doc = RopeEditor::default();
        engine.load(&mut doc, text);
        (engine, doc)
    }

    #[test]
    fn test_typing_triggers_pass() {
        let (mut engine, mut doc) = setup("");
        let outcome = engine.handle_input(
            &mut doc,
            &EditEvent::InsertText {
                text: "#idea ".into(),
                range: Range::caret(0),
            },
        );
        assert!(outcome.handled);
        assert!(outcome.changed_text());
        let report = outcome.report.unwrap();
        assert_eq!(report.tags, vec!["idea"]);
        assert_eq!(engine.sink(), &vec![SmolStr::new("idea")]);
        // load plus one insert
        assert_eq!(engine.observer().len(), 2);
    }

    #[test]
    fn test_cursor_move_runs_no_pass() {
        let (mut engine, mut doc) = setup("hello");
        let outcome = engine.handle_input(&mut doc, &EditEvent::MoveCursor { offset: 2 });
        assert!(outcome.handled);
        assert!(outcome.edit.is_none());
        assert!(outcome.report.is_none());
        assert_eq!(doc.cursor_offset(), 2);
        assert_eq!(engine.observer().len(), 1);
    }

    #[test]
    fn test_continuation_runs_first() {
        let (mut engine, mut doc) = setup("*");
        let outcome = engine.handle_input(
            &mut doc,
            &EditEvent::InsertText {
                text: " ".into(),
                range: Range::caret(1),
            },
        );
        assert!(matches!(
            outcome.continuation,
            Some(Continuation::Converted(_))
        ));
        assert_eq!(doc.content_string(), "  • ");
        assert_eq!(outcome.report.map(|r| r.markers), Some(1));
    }

    #[test]
    fn test_refused_edit_is_handled_without_change() {
        let (mut engine, mut doc) = setup("  • item");
        let outcome = engine.handle_input(
            &mut doc,
            &EditEvent::DeleteBackward {
                range: Range::caret(3),
            },
        );
        assert!(outcome.handled);
        assert_eq!(outcome.continuation, Some(Continuation::Refused));
        assert!(outcome.edit.is_none());
        assert_eq!(doc.content_string(), "  • item");
    }

    #[test]
    fn test_command_restyles() {
        let (mut engine, mut doc) = setup("word");
        doc.set_selection(Some(crate::types::Selection::new(0, 4)));
        let outcome = engine.apply(&mut doc, FormatCommand::Bold);
        assert!(outcome.handled);
        assert_eq!(doc.content_string(), "**word**");
        assert_eq!(outcome.report.map(|r| r.spans(Category::Bold)), Some(1));
    }

    #[test]
    fn test_undo_restyles() {
        let (mut engine, mut doc) = setup("");
        engine.handle_input(
            &mut doc,
            &EditEvent::InsertText {
                text: "**b**".into(),
                range: Range::caret(0),
            },
        );
        let outcome = engine.handle_input(&mut doc, &EditEvent::Undo);
        assert!(outcome.handled);
        assert_eq!(doc.content_string(), "");
        assert_eq!(outcome.report.map(|r| r.total_spans()), Some(0));
    }
}
