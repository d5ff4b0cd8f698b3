//! A note open in an editor: document plus engine.

use crate::actions::{EditEvent, FormatCommand};
use crate::document::{EditorDocument, RopeEditor};
use crate::engine::{FormattingEngine, InputOutcome};
use crate::reconcile::PassReport;
use crate::sink::{HashtagSink, MutationObserver};
use crate::style::ThemeProvider;

/// Binds one document to a formatting engine.
///
/// Hosts with their own text storage implement [`EditorDocument`] and pass
/// it in; headless users get a [`RopeEditor`].
#[derive(Debug)]
pub struct NoteEditor<D, S, T, O = ()> {
    doc: D,
    engine: FormattingEngine<S, T, O>,
}

impl<S: HashtagSink, T: ThemeProvider> NoteEditor<RopeEditor, S, T, ()> {
    /// Open `text` in a fresh rope-backed editor.
    pub fn open(text: &str, theme: T, sink: S) -> Self {
        let mut editor = Self::new(RopeEditor::default(), FormattingEngine::new(theme, sink));
        editor.load(text);
        editor
    }
}

impl<D, S, T, O> NoteEditor<D, S, T, O>
where
    D: EditorDocument,
    S: HashtagSink,
    T: ThemeProvider,
    O: MutationObserver,
{
    pub fn new(doc: D, engine: FormattingEngine<S, T, O>) -> Self {
        Self { doc, engine }
    }

    pub fn with_observer<O2: MutationObserver>(self, observer: O2) -> NoteEditor<D, S, T, O2> {
        NoteEditor {
            doc: self.doc,
            engine: self.engine.with_observer(observer),
        }
    }

    pub fn handle_input(&mut self, event: EditEvent) -> InputOutcome {
        self.engine.handle_input(&mut self.doc, &event)
    }

    pub fn apply(&mut self, command: FormatCommand) -> InputOutcome {
        self.engine.apply(&mut self.doc, command)
    }

    /// Type `text` at the cursor, replacing any selection, one event per
    /// char so list continuation sees every keystroke.
    pub fn type_text(&mut self, text: &str) {
        let mut buf = [0u8; 4];
        for c in text.chars() {
            let range = crate::execute::selection_range(&self.doc);
            let event = match c {
                '\n' => EditEvent::InsertNewline { range },
                c => EditEvent::InsertText {
                    text: c.encode_utf8(&mut buf).to_owned(),
                    range,
                },
            };
            self.handle_input(event);
        }
    }

    /// Replace the whole note.
    pub fn load(&mut self, text: &str) -> PassReport {
        self.engine.load(&mut self.doc, text)
    }

    pub fn reconcile(&mut self) -> PassReport {
        self.engine.reconcile(&mut self.doc)
    }

    /// The raw markdown, exactly as stored.
    pub fn plain_text(&self) -> String {
        self.doc.content_string()
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    /// Direct document access. Changes made here are not restyled until
    /// the next pass.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn engine(&self) -> &FormattingEngine<S, T, O> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut FormattingEngine<S, T, O> {
        &mut self.engine
    }

    pub fn into_parts(self) -> (D, FormattingEngine<S, T, O>) {
        (self.doc, self.engine)
    }
}
