// src/taskfile/model.rs

//! Data model for parsed task files.

use indexmap::IndexMap;

/// Mapping from alias string to task name. Many-to-one: one task may have
/// several aliases. Loaded fresh per invocation, never persisted.
pub type AliasMap = IndexMap<String, String>;

/// One command line of a task, with its optional language hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub line: String,
    pub lang: Option<String>,
}

impl CommandLine {
    pub fn plain(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            lang: None,
        }
    }

    pub fn polyglot(line: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            lang: Some(lang.into()),
        }
    }
}

/// A named, ordered sequence of commands plus associated environment/host
/// metadata. Immutable once returned to the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct Task {
    pub name: String,
    pub description: Option<String>,
    pub commands: Vec<CommandLine>,
    /// Keys unique, insertion order preserved for deterministic export.
    pub env: IndexMap<String, String>,
    /// Target host identifiers; empty means local execution only.
    pub hosts: Vec<String>,
    pub sudo: bool,
    pub sudo_user: Option<String>,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// The parsed content of one task-file fragment.
#[derive(Debug, Clone, Default)]
pub struct TaskFile {
    pub tasks: IndexMap<String, Task>,
    pub aliases: AliasMap,
    /// Raw `include` directive paths, in file order.
    pub includes: Vec<String>,
}
