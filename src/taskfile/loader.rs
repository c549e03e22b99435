// src/taskfile/loader.rs

//! Task-file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{PfError, Result};
use crate::taskfile::include::{SubcommandRegistry, load_include};
use crate::taskfile::model::{AliasMap, TaskFile};
use crate::taskfile::parse::parse_taskfile_text;

/// A fully loaded root task file: its own tasks and aliases, the merged
/// tasks of every resolvable include, and the subcommand registry.
#[derive(Debug, Default)]
pub struct LoadedTaskFile {
    pub root_path: PathBuf,
    pub taskfile: TaskFile,
    pub subcommands: SubcommandRegistry,
}

/// Default task-file name looked up in the current working directory.
pub fn default_taskfile_path() -> PathBuf {
    PathBuf::from("Pfyfile.pf")
}

/// Resolve the task-file path: an explicit override is used verbatim,
/// otherwise the default name in the current directory.
pub fn find_taskfile(file_arg: Option<&str>) -> Option<PathBuf> {
    let candidate = match file_arg {
        Some(path) => PathBuf::from(path),
        None => default_taskfile_path(),
    };
    candidate.exists().then_some(candidate)
}

/// Load and parse the root task file plus its includes.
///
/// Include fragments merge into the root task set; a name collision keeps
/// the root's definition and warns. Missing includes warn and are skipped.
pub fn load_taskfile(file_arg: Option<&str>) -> Result<LoadedTaskFile> {
    let root_path = find_taskfile(file_arg).ok_or_else(|| PfError::Syntax {
        message: "No task file found".to_string(),
        file_path: Some(file_arg.map(PathBuf::from).unwrap_or_else(default_taskfile_path)),
        suggestion: Some("Create a Pfyfile.pf to define tasks, or pass -f/--file".to_string()),
    })?;

    let text = fs::read_to_string(&root_path)?;
    let mut taskfile = parse_taskfile_text(&text).map_err(|e| attach_path(e, &root_path))?;
    let subcommands = SubcommandRegistry::discover(&root_path, &text);

    for include_path in taskfile.includes.clone() {
        match load_include(&root_path, &include_path) {
            Ok((full_path, fragment)) => {
                merge_fragment(&mut taskfile, fragment, &full_path);
            }
            Err(err) => {
                warn!(include = %include_path, error = %err, "include file not usable; skipping");
            }
        }
    }

    debug!(
        path = %root_path.display(),
        tasks = taskfile.tasks.len(),
        aliases = taskfile.aliases.len(),
        "loaded task file"
    );

    Ok(LoadedTaskFile {
        root_path,
        taskfile,
        subcommands,
    })
}

/// Load the alias map, best-effort: a malformed or missing source yields an
/// empty map rather than failure.
pub fn alias_map(file_arg: Option<&str>) -> AliasMap {
    match load_taskfile(file_arg) {
        Ok(loaded) => loaded.taskfile.aliases,
        Err(err) => {
            debug!(error = %err, "alias map unavailable; treating as empty");
            AliasMap::default()
        }
    }
}

fn merge_fragment(taskfile: &mut TaskFile, fragment: TaskFile, path: &Path) {
    for (name, task) in fragment.tasks {
        if taskfile.tasks.contains_key(&name) {
            warn!(
                task = %name,
                include = %path.display(),
                "task already defined in root file; keeping root definition"
            );
            continue;
        }
        taskfile.tasks.insert(name, task);
    }

    for (alias, target) in fragment.aliases {
        taskfile.aliases.entry(alias).or_insert(target);
    }
}

fn attach_path(err: PfError, path: &Path) -> PfError {
    match err {
        PfError::Syntax {
            message,
            file_path: None,
            suggestion,
        } => PfError::Syntax {
            message,
            file_path: Some(path.to_path_buf()),
            suggestion,
        },
        other => other,
    }
}
