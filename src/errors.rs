// src/errors.rs

//! Crate-wide error types and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PfError {
    /// Malformed task-file content or an unresolvable polyglot source
    /// reference.
    #[error("Syntax error: {message}")]
    Syntax {
        message: String,
        file_path: Option<PathBuf>,
        suggestion: Option<String>,
    },

    /// A command could not be safely built, or the spawned process / remote
    /// connection failed.
    #[error("Execution error: {message}")]
    Execution {
        message: String,
        command: Option<String>,
        environment: Vec<(String, String)>,
        suggestion: Option<String>,
    },

    /// Remote execution environment problems.
    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PfError {
    /// Shorthand for a syntax error with no file path attached.
    pub fn syntax(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        PfError::Syntax {
            message: message.into(),
            file_path: None,
            suggestion: Some(suggestion.into()),
        }
    }

    /// Shorthand for an execution error carrying the attempted command.
    pub fn execution(
        message: impl Into<String>,
        command: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        PfError::Execution {
            message: message.into(),
            command: Some(command.into()),
            environment: Vec::new(),
            suggestion: Some(suggestion.into()),
        }
    }
}

/// Render an error for the user: a one-line message, then the attempted
/// command / environment when present, then an actionable suggestion.
pub fn format_for_user(err: &PfError) -> String {
    let mut out = err.to_string();

    match err {
        PfError::Syntax {
            file_path,
            suggestion,
            ..
        } => {
            if let Some(path) = file_path {
                out.push_str(&format!("\n  file: {}", path.display()));
            }
            if let Some(s) = suggestion {
                out.push_str(&format!("\n  suggestion: {s}"));
            }
        }
        PfError::Execution {
            command,
            environment,
            suggestion,
            ..
        } => {
            if let Some(cmd) = command {
                out.push_str(&format!("\n  command: {cmd}"));
            }
            if !environment.is_empty() {
                let env = environment
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                out.push_str(&format!("\n  environment: {env}"));
            }
            if let Some(s) = suggestion {
                out.push_str(&format!("\n  suggestion: {s}"));
            }
        }
        _ => {}
    }

    out
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PfError>;
