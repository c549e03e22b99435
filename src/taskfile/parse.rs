// src/taskfile/parse.rs

//! Line-oriented task-file parser.
//!
//! Implements the stable contract the orchestrator consumes:
//! `task name -> {commands, env, hosts, description}` plus `alias` and
//! `include` directives.
//!
//! ```text
//! include "tasks/deploy.pf"
//!
//! alias b = build
//!
//! task build: Compile the project
//!     env CC=clang
//!     hosts user@web1,user@web2
//!     cargo build --release
//!
//! task hello:
//!     lang python
//!     print("hello")
//! ```

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::errors::{PfError, Result};
use crate::shell::parse::is_valid_env_key;
use crate::taskfile::include::strip_quotes;
use crate::taskfile::model::{CommandLine, Task, TaskFile};

/// `lang`/`language`/`polyglot` hint lines, with `:`/`=`/space separators.
fn lang_template_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(?:lang|language|polyglot)\s*(?:[:=]|\s+)\s*(.+)$").expect("valid regex")
    })
}

/// An open `task ...:` block while its indented body is being consumed.
struct TaskBlock {
    task: Task,
    /// Language hint applied to subsequent command lines.
    lang: Option<String>,
}

/// Parse task-file text into its tasks, aliases, and include directives.
///
/// Malformed `alias` lines are skipped (alias loading is best-effort);
/// everything else that is not recognized fails with a `Syntax` error
/// naming the offending line.
pub fn parse_taskfile_text(text: &str) -> Result<TaskFile> {
    let mut file = TaskFile::default();
    let mut current: Option<TaskBlock> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw_line.trim_end();
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let indented = line.starts_with(' ') || line.starts_with('\t');

        if !indented {
            // A new top-level statement closes the current task block.
            if let Some(block) = current.take() {
                insert_task(&mut file, block.task)?;
            }

            if let Some(rest) = trimmed.strip_prefix("include ") {
                file.includes.push(strip_quotes(rest.trim()).to_string());
            } else if let Some(rest) = trimmed.strip_prefix("alias ") {
                parse_alias_line(&mut file, rest);
            } else if let Some(rest) = trimmed.strip_prefix("task ") {
                current = Some(TaskBlock {
                    task: parse_task_header(rest, lineno)?,
                    lang: None,
                });
            } else {
                return Err(PfError::Syntax {
                    message: format!("Unrecognized statement on line {lineno}: {trimmed}"),
                    file_path: None,
                    suggestion: Some(
                        "Expected `task <name>:`, `alias <name> = <task>`, or `include <path>`"
                            .to_string(),
                    ),
                });
            }
            continue;
        }

        let Some(block) = current.as_mut() else {
            return Err(PfError::Syntax {
                message: format!("Indented line outside of a task block on line {lineno}: {trimmed}"),
                file_path: None,
                suggestion: Some("Indented lines must follow a `task <name>:` header".to_string()),
            });
        };

        parse_task_body_line(block, trimmed, lineno)?;
    }

    if let Some(block) = current.take() {
        insert_task(&mut file, block.task)?;
    }

    Ok(file)
}

fn insert_task(file: &mut TaskFile, task: Task) -> Result<()> {
    if file.tasks.contains_key(&task.name) {
        return Err(PfError::Syntax {
            message: format!("Duplicate task name: {}", task.name),
            file_path: None,
            suggestion: Some("Task names must be unique within a task file".to_string()),
        });
    }
    file.tasks.insert(task.name.clone(), task);
    Ok(())
}

fn parse_task_header(rest: &str, lineno: usize) -> Result<Task> {
    let Some((name, description)) = rest.split_once(':') else {
        return Err(PfError::Syntax {
            message: format!("Task header missing ':' on line {lineno}: task {rest}"),
            file_path: None,
            suggestion: Some("Write `task <name>: [description]`".to_string()),
        });
    };

    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(PfError::Syntax {
            message: format!("Invalid task name on line {lineno}: '{name}'"),
            file_path: None,
            suggestion: Some("Task names must be a single word".to_string()),
        });
    }

    let mut task = Task::new(name);
    let description = description.trim();
    if !description.is_empty() {
        task.description = Some(description.to_string());
    }
    Ok(task)
}

fn parse_alias_line(file: &mut TaskFile, rest: &str) {
    match rest.split_once('=') {
        Some((alias, target)) => {
            let alias = alias.trim();
            let target = target.trim();
            if alias.is_empty() || target.is_empty() {
                debug!(line = rest, "skipping malformed alias line");
                return;
            }
            file.aliases.insert(alias.to_string(), target.to_string());
        }
        None => debug!(line = rest, "skipping malformed alias line"),
    }
}

fn parse_task_body_line(block: &mut TaskBlock, line: &str, lineno: usize) -> Result<()> {
    let task = &mut block.task;

    if let Some(rest) = line.strip_prefix("env ") {
        let Some((key, value)) = rest.trim().split_once('=') else {
            return Err(PfError::Syntax {
                message: format!("Malformed env line {lineno}: {line}"),
                file_path: None,
                suggestion: Some("Write `env KEY=VALUE`".to_string()),
            });
        };
        let key = key.trim();
        if !is_valid_env_key(key) {
            return Err(PfError::Syntax {
                message: format!("Invalid environment variable name on line {lineno}: {key}"),
                file_path: None,
                suggestion: Some(
                    "Names must start with a letter or underscore, followed by letters, digits, or underscores"
                        .to_string(),
                ),
            });
        }
        task.env.insert(key.to_string(), value.trim().to_string());
        return Ok(());
    }

    if let Some(rest) = line.strip_prefix("hosts ") {
        task.hosts = rest
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect();
        return Ok(());
    }

    if line == "sudo" {
        task.sudo = true;
        return Ok(());
    }
    if let Some(user) = line.strip_prefix("sudo ") {
        task.sudo = true;
        task.sudo_user = Some(user.trim().to_string());
        return Ok(());
    }

    // A `lang` template line switches the hint for subsequent commands.
    if let Some(captures) = lang_template_pattern().captures(line) {
        block.lang = Some(captures[1].trim().to_lowercase());
        return Ok(());
    }

    task.commands.push(CommandLine {
        line: line.to_string(),
        lang: block.lang.clone(),
    });
    Ok(())
}
