use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use mono_editor_core::execute::selection_range;
use mono_editor_core::{
    EditEvent, EditorDocument, EditorRope, FnSink, FormattingEngine, HashtagSink, NoteEditor,
    PlainEditor, Range, Theme, UndoableBuffer,
};

mod config;
mod render;

#[derive(Parser)]
#[command(version, about = "Live markdown formatting for plain-text notes", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to editor.kdl (defaults to the user config directory)
    #[arg(long, global = true, env = "MONO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format a note and print what the reader sees
    Format {
        /// Note file, or `-` for stdin
        note: PathBuf,

        /// List every attribute run instead
        #[arg(long)]
        runs: bool,
    },
    /// Print the hashtags of a note, one per line
    Tags {
        /// Note file, or `-` for stdin
        note: PathBuf,
    },
    /// Replay keystrokes at the end of a note (`\n` newline, `\b` backspace)
    Type {
        keys: String,

        /// Note to start from instead of an empty one
        #[arg(long)]
        note: Option<PathBuf>,

        /// List every attribute run afterwards
        #[arg(long)]
        runs: bool,
    },
}

fn main() -> Result<()> {
    init_miette();
    init_tracing();

    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    let undo_depth = config.undo_depth;
    let theme = Theme::from_config(config);

    match cli.command {
        Commands::Format { note, runs } => {
            let text = read_note(&note)?;
            let mut editor = new_editor(&theme, undo_depth, ());
            let report = editor.load(&text);
            print_note(&editor, &theme, runs);
            if !report.tags.is_empty() {
                let tags: Vec<String> = report.tags.iter().map(|t| format!("#{t}")).collect();
                println!("tags: {}", tags.join(" "));
            }
        }
        Commands::Tags { note } => {
            let text = read_note(&note)?;
            let sink = FnSink(|tag: &str| println!("#{tag}"));
            let mut editor = new_editor(&theme, undo_depth, sink);
            editor.load(&text);
        }
        Commands::Type { keys, note, runs } => {
            let mut editor = new_editor(&theme, undo_depth, ());
            if let Some(note) = note {
                editor.load(&read_note(&note)?);
            }
            for key in parse_keys(&keys) {
                let event = key.event(selection_range(editor.document()));
                let outcome = editor.handle_input(event);
                if let Some(continuation) = outcome.continuation {
                    tracing::info!(?key, ?continuation, "structural edit");
                }
            }
            println!("{}", editor.plain_text());
            println!("---");
            print_note(&editor, &theme, runs);
        }
    }

    Ok(())
}

type CliEditor<S> = NoteEditor<PlainEditor<UndoableBuffer<EditorRope>>, S, Theme>;

fn new_editor<S: HashtagSink>(theme: &Theme, undo_depth: usize, sink: S) -> CliEditor<S> {
    let doc = PlainEditor::new(UndoableBuffer::new(EditorRope::default(), undo_depth));
    NoteEditor::new(doc, FormattingEngine::new(theme.clone(), sink))
}

fn print_note<S: HashtagSink>(editor: &CliEditor<S>, theme: &Theme, runs: bool) {
    if runs {
        print!("{}", render::runs(editor.document(), theme));
    } else {
        println!("{}", render::visible_text(editor.document()));
    }
    tracing::debug!(chars = editor.document().len_chars(), "printed note");
}

fn read_note(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        return std::io::read_to_string(std::io::stdin()).into_diagnostic();
    }
    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("couldn't read note {}", path.display()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Char(char),
    Newline,
    Backspace,
}

impl Key {
    fn event(self, range: Range) -> EditEvent {
        match self {
            Key::Char(c) => EditEvent::InsertText {
                text: c.to_string(),
                range,
            },
            Key::Newline => EditEvent::InsertNewline { range },
            Key::Backspace => EditEvent::DeleteBackward { range },
        }
    }
}

/// Decode `\n`, `\b` and `\\`; any other char is typed as is.
fn parse_keys(keys: &str) -> Vec<Key> {
    let mut out = Vec::new();
    let mut chars = keys.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push(Key::Newline),
                Some('b') => out.push(Key::Backspace),
                Some(other) => out.push(Key::Char(other)),
                None => out.push(Key::Char('\\')),
            },
            '\n' => out.push(Key::Newline),
            c => out.push(Key::Char(c)),
        }
    }
    out
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
