// src/shell/parse.rs

//! Command-line parsing: split leading `KEY=VALUE` environment assignments
//! from the executable command.
//!
//! Handles syntax like: `ENV_VAR=value ENV2=value2 bash -lc "script.sh"`.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::errors::{PfError, Result};

/// Pattern an environment variable name must match to count as an
/// assignment token.
fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"))
}

/// Whether `key` is a valid environment variable identifier.
pub fn is_valid_env_key(key: &str) -> bool {
    identifier_pattern().is_match(key)
}

/// Split a raw command line into leading environment assignments and the
/// remaining command.
///
/// Tokenization respects shell quoting, so quoted strings containing `=` or
/// spaces stay intact. A token counts as an assignment iff it contains `=`,
/// does not begin with `-`, and its left-hand side is a valid identifier.
/// The first token that fails the test, and everything after it, is
/// re-joined (each token individually re-quoted) into the remaining command.
pub fn parse_command_line(cmd_line: &str) -> Result<(IndexMap<String, String>, String)> {
    let tokens = shell_words::split(cmd_line).map_err(|e| PfError::Execution {
        message: format!("Failed to parse shell command: {e}"),
        command: Some(cmd_line.to_string()),
        environment: Vec::new(),
        suggestion: Some("Check for unclosed quotes or invalid escape sequences".to_string()),
    })?;

    let mut env_vars = IndexMap::new();
    let mut remaining_tokens: &[String] = &[];

    for (i, token) in tokens.iter().enumerate() {
        if let Some(eq) = token.find('=') {
            if !token.starts_with('-') && is_valid_env_key(&token[..eq]) {
                env_vars.insert(token[..eq].to_string(), token[eq + 1..].to_string());
                continue;
            }
        }

        // Not an env var assignment; the rest is the command.
        remaining_tokens = &tokens[i..];
        break;
    }

    let remaining_cmd = shell_words::join(remaining_tokens.iter().map(String::as_str));

    Ok((env_vars, remaining_cmd))
}
