use mono_editor_core::{
    Category, EditorDocument, NoteEditor, Patterns, SmolStr, SyntaxSpan, Theme,
};
use proptest::prelude::*;

// Notes built from markdown fragments, so delimiters collide often.
fn note_strategy() -> impl Strategy<Value = String> {
    let token = prop_oneof![
        Just("# ".to_string()),
        Just("## ".to_string()),
        Just("**".to_string()),
        Just("*".to_string()),
        Just("_".to_string()),
        Just("__".to_string()),
        Just("[".to_string()),
        Just("](".to_string()),
        Just(")".to_string()),
        Just("#tag".to_string()),
        Just("#".to_string()),
        Just(" ".to_string()),
        Just("\n".to_string()),
        Just("  • ".to_string()),
        Just("  – ".to_string()),
        Just("  12. ".to_string()),
        Just("é".to_string()),
        Just("🙂".to_string()),
        "[a-z]{1,6}",
    ];
    prop::collection::vec(token, 0..40).prop_map(|tokens| tokens.concat())
}

fn hidden_range<D: EditorDocument>(doc: &D, mut range: std::ops::Range<usize>) -> bool {
    let attrs = doc.attributes();
    range.all(|offset| attrs.at(offset).is_some_and(|a| a.is_hidden()))
}

fn delimiters(span: &SyntaxSpan) -> Vec<std::ops::Range<usize>> {
    match span.category {
        Category::Bold | Category::Italic => vec![
            span.capture(0).unwrap_or_default(),
            span.capture(2).unwrap_or_default(),
        ],
        Category::Link => {
            let label = span.capture(0).unwrap_or_default();
            let url = span.capture(1).unwrap_or_default();
            vec![
                span.full_range.start..label.start,
                label.end..url.start,
                url.clone(),
                url.end..span.full_range.end,
            ]
        }
        _ => Vec::new(),
    }
}

proptest! {
    #[test]
    fn prop_pass_is_idempotent(note in note_strategy()) {
        let mut editor = NoteEditor::open(&note, Theme::default(), ());
        let first = editor.document().attributes().clone();
        let report = editor.reconcile();
        prop_assert!(!report.changed);
        prop_assert_eq!(editor.document().attributes(), &first);
    }

    #[test]
    fn prop_pass_preserves_text(note in note_strategy()) {
        let mut editor = NoteEditor::open(&note, Theme::default(), ());
        prop_assert_eq!(editor.plain_text(), note.clone());
        editor.reconcile();
        prop_assert_eq!(editor.plain_text(), note.clone());
        prop_assert_eq!(editor.document().attributes().len(), note.chars().count());
    }

    #[test]
    fn prop_delimiters_are_invisible(note in note_strategy()) {
        let editor = NoteEditor::open(&note, Theme::default(), ());
        let patterns = Patterns::compile();
        for category in [Category::Bold, Category::Italic, Category::Link] {
            for span in patterns.match_spans(category, &note).unwrap() {
                for range in delimiters(&span) {
                    prop_assert!(
                        hidden_range(editor.document(), range.clone()),
                        "{} delimiter {:?} visible in {:?}", category, range, note
                    );
                }
            }
        }
    }

    #[test]
    fn prop_tags_reported_once(
        words in prop::collection::vec("[a-z]{1,4}", 1..6),
        repeat in 1usize..4,
    ) {
        let line = words.iter().map(|w| format!("#{w}")).collect::<Vec<_>>().join(" ");
        let note = vec![line; repeat].join("\n");
        let mut tags: Vec<SmolStr> = Vec::new();
        {
            let _editor = NoteEditor::open(&note, Theme::default(), &mut tags);
        }
        let mut expected: Vec<&str> = Vec::new();
        for word in &words {
            if !expected.contains(&word.as_str()) {
                expected.push(word);
            }
        }
        prop_assert_eq!(tags, expected);
    }

    #[test]
    fn prop_plain_typing_is_verbatim(text in "[a-z ]{0,40}") {
        let mut editor = NoteEditor::open("", Theme::default(), ());
        editor.type_text(&text);
        prop_assert_eq!(editor.plain_text(), text.clone());
        prop_assert_eq!(editor.document().cursor_offset(), text.chars().count());
    }
}
