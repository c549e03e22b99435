// src/taskfile/include.rs

//! Include-directive handling and subcommand discovery.
//!
//! `include <path>` lines in the root task file pull in further task-file
//! fragments; the tasks they define are exposed as top-level subcommands.
//! Missing or unreadable include targets degrade to a warning, never a
//! fatal error, so the root task set stays usable standalone.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::warn;

use crate::errors::Result;
use crate::taskfile::model::TaskFile;
use crate::taskfile::parse::parse_taskfile_text;

/// Strip one layer of surrounding single or double quotes.
pub fn strip_quotes(path: &str) -> &str {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &path[1..path.len() - 1];
        }
    }
    path
}

/// Extract `include` directive paths from task-file text.
///
/// A directive is recognized by an exact-prefix match on `include ` after
/// trimming whitespace; surrounding quotes are stripped.
pub fn extract_includes(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| line.trim().strip_prefix("include "))
        .map(|rest| strip_quotes(rest.trim()).to_string())
        .collect()
}

/// Mapping from an included file path to the ordered list of task names it
/// defines.
#[derive(Debug, Clone, Default)]
pub struct SubcommandRegistry {
    entries: IndexMap<String, Vec<String>>,
}

impl SubcommandRegistry {
    /// Discover subcommands from the include directives of a root task
    /// file. Each included file is parsed independently; failures are
    /// logged and skipped.
    pub fn discover(root_path: &Path, root_text: &str) -> Self {
        let mut registry = SubcommandRegistry::default();

        for include_path in extract_includes(root_text) {
            match load_include(root_path, &include_path) {
                Ok((_, fragment)) => {
                    let names = fragment.tasks.keys().cloned().collect();
                    registry.entries.insert(include_path, names);
                }
                Err(err) => {
                    warn!(
                        include = %include_path,
                        error = %err,
                        "could not process include file; skipping"
                    );
                }
            }
        }

        registry
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(include path, task names)` in directive order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(p, names)| (p.as_str(), names.as_slice()))
    }

    /// All discovered task names, in directive then definition order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().flatten().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.task_names().any(|n| n == name)
    }
}

/// Resolve an include path and parse the fragment it points at.
///
/// Relative paths resolve against the root file's directory first, falling
/// back to the current working directory when that resolution does not
/// exist.
pub fn load_include(root_path: &Path, include_path: &str) -> Result<(PathBuf, TaskFile)> {
    let full_path = resolve_include_path(root_path, include_path);
    let text = fs::read_to_string(&full_path)?;
    let fragment = parse_taskfile_text(&text)?;
    Ok((full_path, fragment))
}

fn resolve_include_path(root_path: &Path, include_path: &str) -> PathBuf {
    let include = Path::new(include_path);
    if include.is_absolute() {
        return include.to_path_buf();
    }

    let root_dir = root_path.parent().unwrap_or_else(|| Path::new("."));
    let candidate = root_dir.join(include);
    if candidate.exists() {
        return candidate;
    }

    // Fall back to the current working directory.
    include.to_path_buf()
}
