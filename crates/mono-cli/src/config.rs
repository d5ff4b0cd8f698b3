//! Editor configuration from `editor.kdl`.
//!
//! ```kdl
//! font-size 16
//! heading-sizes 24 20 18
//! line-spacing 6
//! heading-spacing-before 12
//! heading-spacing-after 8
//! marker-color "#F2991A"
//! undo-depth 100
//! ```
//!
//! Missing nodes keep their defaults. Unknown nodes are logged and ignored.

use std::path::{Path, PathBuf};

use kdl::{KdlDocument, KdlNode, KdlValue};
use miette::Diagnostic;
use mono_editor_core::{Color, EditorConfig};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("couldn't read config file {}", path.display())]
    #[diagnostic(code(mono::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't parse config file {}", path.display())]
    #[diagnostic(
        code(mono::config::parse),
        help("the file must be a valid KDL document")
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: kdl::KdlError,
    },

    #[error("`{node}` {problem}")]
    #[diagnostic(code(mono::config::value), help("expected {expected}"))]
    Value {
        node: String,
        problem: &'static str,
        expected: &'static str,
    },
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mono").join("editor.kdl"))
}

/// Load the config at `path`, or the default location.
///
/// An explicit path must exist; a missing default file means stock settings.
pub fn load(path: Option<&Path>) -> Result<EditorConfig, ConfigError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(EditorConfig::default()),
        },
    };

    if !required && !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(EditorConfig::default());
    }

    let source = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let doc: KdlDocument = source.parse().map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded config");
    from_kdl(&doc)
}

pub fn from_kdl(doc: &KdlDocument) -> Result<EditorConfig, ConfigError> {
    let mut config = EditorConfig::default();
    for node in doc.nodes() {
        match node.name().value() {
            "font-size" => config.font_size = size(node, 0)?,
            "heading-sizes" => {
                config.heading_sizes = [size(node, 0)?, size(node, 1)?, size(node, 2)?];
            }
            "line-spacing" => config.line_spacing = spacing(node)?,
            "heading-spacing-before" => config.heading_spacing_before = spacing(node)?,
            "heading-spacing-after" => config.heading_spacing_after = spacing(node)?,
            "label-color" => config.label_color = color(node)?,
            "marker-color" => config.marker_color = color(node)?,
            "link-color" => config.link_color = color(node)?,
            "hashtag-color" => config.hashtag_color = color(node)?,
            "undo-depth" => config.undo_depth = undo_depth(node)?,
            other => tracing::warn!(node = other, "unknown config node, ignoring"),
        }
    }
    Ok(config)
}

fn arg(node: &KdlNode, index: usize) -> Option<&KdlValue> {
    node.entries()
        .iter()
        .filter(|entry| entry.name().is_none())
        .nth(index)
        .map(|entry| entry.value())
}

fn number(node: &KdlNode, index: usize) -> Option<f64> {
    let value = arg(node, index)?;
    value.as_f64().or_else(|| value.as_i64().map(|n| n as f64))
}

fn invalid(node: &KdlNode, problem: &'static str, expected: &'static str) -> ConfigError {
    ConfigError::Value {
        node: node.name().value().to_string(),
        problem,
        expected,
    }
}

fn size(node: &KdlNode, index: usize) -> Result<f32, ConfigError> {
    const EXPECTED: &str = "a point size such as 16";
    match number(node, index) {
        Some(n) if n > 0.0 => Ok(n as f32),
        Some(_) => Err(invalid(node, "must be positive", EXPECTED)),
        None => Err(invalid(node, "is missing a size", EXPECTED)),
    }
}

fn spacing(node: &KdlNode) -> Result<f32, ConfigError> {
    const EXPECTED: &str = "a spacing in points such as 6";
    match number(node, 0) {
        Some(n) if n >= 0.0 => Ok(n as f32),
        Some(_) => Err(invalid(node, "can't be negative", EXPECTED)),
        None => Err(invalid(node, "is missing a value", EXPECTED)),
    }
}

fn color(node: &KdlNode) -> Result<Color, ConfigError> {
    const EXPECTED: &str = "a hex string like \"#RRGGBB\" or \"#RRGGBBAA\"";
    arg(node, 0)
        .and_then(KdlValue::as_string)
        .and_then(Color::from_hex)
        .ok_or_else(|| invalid(node, "is not a color", EXPECTED))
}

fn undo_depth(node: &KdlNode) -> Result<usize, ConfigError> {
    arg(node, 0)
        .and_then(KdlValue::as_i64)
        .and_then(|n| usize::try_from(n).ok())
        .filter(|&n| n > 0)
        .ok_or_else(|| invalid(node, "is not a step count", "a number above 0"))
}
