// src/polyglot/source.rs

//! Polyglot source extraction.
//!
//! A command carrying a language hint either embeds its source inline, or
//! references a file with a leading `@path` / `file:path` token. File
//! references may be followed by `--` and a trailing argument list.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{PfError, Result};

/// Resolved polyglot source: the snippet, its trailing arguments, and the
/// file it came from (None for inline source).
#[derive(Debug, Clone)]
pub struct PolyglotSource {
    pub code: String,
    pub args: Vec<String>,
    pub file: Option<PathBuf>,
}

/// Extract the snippet and trailing arguments from a command string.
///
/// If the first token is prefixed `@` or `file:`, the referenced path is
/// resolved (relative to `base_dir` unless absolute) and read in full;
/// everything after an optional `--` separator becomes the argument list.
/// Otherwise the raw command string itself is the inline source, with no
/// trailing arguments.
pub fn extract_source(cmd: &str, base_dir: Option<&Path>) -> Result<PolyglotSource> {
    let tokens = shell_words::split(cmd).unwrap_or_default();

    let Some(first) = tokens.first() else {
        return Ok(inline(cmd));
    };

    let rel_path = if let Some(stripped) = first.strip_prefix('@') {
        stripped
    } else if let Some(stripped) = first.strip_prefix("file:") {
        stripped
    } else {
        return Ok(inline(cmd));
    };

    let rel_path = Path::new(rel_path);
    let full_path = if rel_path.is_absolute() {
        rel_path.to_path_buf()
    } else {
        let Some(base) = base_dir else {
            return Err(PfError::Syntax {
                message: "Cannot resolve polyglot source file: no base directory available"
                    .to_string(),
                file_path: None,
                suggestion: Some("Ensure the task file is in a valid directory".to_string()),
            });
        };
        base.join(rel_path)
    };

    if !full_path.exists() {
        return Err(PfError::Syntax {
            message: format!("Polyglot source file not found: {}", full_path.display()),
            file_path: Some(full_path),
            suggestion: Some(
                "Check that the file path is correct and the file exists".to_string(),
            ),
        });
    }

    let code = fs::read_to_string(&full_path)?;

    let mut rest = &tokens[1..];
    if rest.first().map(String::as_str) == Some("--") {
        rest = &rest[1..];
    }

    Ok(PolyglotSource {
        code,
        args: rest.to_vec(),
        file: Some(full_path),
    })
}

fn inline(cmd: &str) -> PolyglotSource {
    PolyglotSource {
        code: cmd.to_string(),
        args: Vec::new(),
        file: None,
    }
}
