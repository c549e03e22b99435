// src/orchestrator/builtin.rs

//! Builtin command handlers: `list`, `help`, `prune`.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use tracing::warn;

use crate::errors::Result;
use crate::shell::secure::{ExecOptions, execute_command_line};
use crate::taskfile::loader::{find_taskfile, load_taskfile};
use crate::taskfile::model::Task;

/// `pf list`: print every available task, sorted by name, with aliases and
/// a short description.
pub fn list(file_arg: Option<&str>) -> Result<i32> {
    if find_taskfile(file_arg).is_none() {
        eprintln!("No task file found. Create a Pfyfile.pf to define tasks.");
        return Ok(1);
    }

    let loaded = load_taskfile(file_arg)?;
    let tasks = &loaded.taskfile.tasks;

    if tasks.is_empty() {
        println!("No tasks found in task file.");
        return Ok(0);
    }

    // Reverse alias map for display: task name -> [aliases].
    let mut reverse_aliases: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (alias, target) in &loaded.taskfile.aliases {
        reverse_aliases
            .entry(target.as_str())
            .or_default()
            .push(alias.as_str());
    }

    let mut names: Vec<&String> = tasks.keys().collect();
    names.sort();

    println!("Available tasks:");
    for name in names {
        let task = &tasks[name.as_str()];
        let mut line = format!("  {name}");

        if let Some(aliases) = reverse_aliases.get(name.as_str()) {
            line.push_str(&format!(" (aliases: {})", aliases.join(", ")));
        }

        if let Some(description) = task_description(task) {
            line.push_str(&format!(" - {description}"));
        }

        println!("{line}");
    }

    Ok(0)
}

/// Explicit description, or the first command truncated to 50 chars.
fn task_description(task: &Task) -> Option<String> {
    if let Some(desc) = &task.description {
        return Some(desc.clone());
    }

    let first_cmd = &task.commands.first()?.line;
    if first_cmd.chars().count() > 50 {
        let truncated: String = first_cmd.chars().take(47).collect();
        Some(format!("{truncated}..."))
    } else {
        Some(first_cmd.clone())
    }
}

/// `pf help [task]`.
pub fn help(task: Option<&str>, file_arg: Option<&str>) -> Result<i32> {
    match task {
        Some(name) => show_task_help(name, file_arg),
        None => {
            println!("{}", GENERAL_HELP.trim());
            Ok(0)
        }
    }
}

fn show_task_help(task_name: &str, file_arg: Option<&str>) -> Result<i32> {
    if find_taskfile(file_arg).is_none() {
        eprintln!("No task file found.");
        return Ok(1);
    }

    let loaded = load_taskfile(file_arg)?;

    let Some(task) = loaded.taskfile.tasks.get(task_name) else {
        eprintln!("Task '{task_name}' not found.");
        return Ok(1);
    };

    println!("Task: {task_name}");

    if let Some(description) = &task.description {
        println!("Description: {description}");
    }

    if !task.commands.is_empty() {
        println!("Commands:");
        for (i, command) in task.commands.iter().enumerate() {
            match &command.lang {
                Some(lang) => println!("  {}. [{lang}] {}", i + 1, command.line),
                None => println!("  {}. {}", i + 1, command.line),
            }
        }
    }

    if !task.env.is_empty() {
        println!("Environment variables:");
        for (key, value) in &task.env {
            println!("  {key}={value}");
        }
    }

    if !task.hosts.is_empty() {
        println!("Hosts: {}", task.hosts.join(", "));
    }

    Ok(0)
}

/// `pf prune`: best-effort cleanup of leftover containers. A missing or
/// failing container runtime degrades to a warning.
pub async fn prune() -> Result<i32> {
    let env = IndexMap::new();
    let opts = ExecOptions::default();

    match execute_command_line("docker container prune -f", &env, &opts, None).await {
        Ok(rc) => Ok(rc),
        Err(err) => {
            warn!(error = %err, "prune skipped; container runtime unavailable");
            Ok(0)
        }
    }
}

const GENERAL_HELP: &str = r#"
pf - A polyglot task runner and automation tool

Usage:
  pf [options] <command> [args...]
  pf [options] run <task> [task_args...]

Commands:
  list                    List all available tasks
  run <task>              Run a specific task
  help [task]             Show help (optionally for a specific task)
  prune                   Clean up containers and resources
  debug-on                Enable debug mode
  debug-off               Disable debug mode

Discovered subcommands:
  Task names defined in included files can be invoked directly,
  e.g. `pf deploy` for a task defined via `include "tasks/deploy.pf"`.

Options:
  -f, --file PATH         Use a specific task file (default: Pfyfile.pf)
  -h, --hosts HOSTS       Override target hosts (comma-separated)
  -e, --env KEY=VALUE     Set environment variables (repeatable)
  --debug                 Enable debug output
  --dry-run               Show what would be executed without running
  --parallel              Run independent executions in parallel
  --log-level LEVEL       Logging level (error, warn, info, debug, trace)

Examples:
  pf list                 List all tasks
  pf run build            Run the 'build' task
  pf run deploy -h prod1,prod2
  pf help deploy          Show help for the 'deploy' task
"#;
