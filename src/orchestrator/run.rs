// src/orchestrator/run.rs

//! The single task-execution funnel.
//!
//! All terminal task execution flows through [`run_task`]: task lookup,
//! env/host overrides, dry-run printing, per-command execution (polyglot
//! rendering included), and per-host fan-out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::errors::{PfError, Result};
use crate::orchestrator::parallel::{DEFAULT_MAX_WORKERS, Unit, run_bounded};
use crate::polyglot::render_polyglot_command;
use crate::shell::parse::is_valid_env_key;
use crate::shell::remote::{RemoteConnection, SshConnection};
use crate::shell::secure::{ExecOptions, execute_command_line, execute_prepared_script};
use crate::taskfile::loader::load_taskfile;
use crate::taskfile::model::Task;

/// One task invocation as handed over by the CLI layer. Constructed once
/// per invocation; never mutated after dispatch.
#[derive(Debug, Clone, Default)]
pub struct ExecutionRequest {
    pub task_name: String,
    pub file: Option<String>,
    pub hosts: Option<String>,
    /// Explicit `KEY=VALUE` overrides from `-e/--env`.
    pub env: Vec<String>,
    pub dry_run: bool,
    pub debug: bool,
    pub parallel: bool,
    pub task_args: Vec<String>,
}

impl ExecutionRequest {
    pub fn for_task(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            ..Default::default()
        }
    }
}

/// Execute one task and return its exit code.
pub async fn run_task(req: ExecutionRequest) -> Result<i32> {
    let loaded = load_taskfile(req.file.as_deref())?;

    let task = loaded
        .taskfile
        .tasks
        .get(&req.task_name)
        .cloned()
        .ok_or_else(|| PfError::TaskNotFound(req.task_name.clone()))?;

    let env = merged_env(&task, &req.env)?;
    let hosts = resolve_hosts(&task, req.hosts.as_deref());
    let base_dir = loaded
        .root_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf);

    if req.dry_run {
        print_dry_run(&task, &env, &hosts, &req.task_args);
        return Ok(0);
    }

    info!(task = %task.name, hosts = hosts.len(), "running task");

    if hosts.is_empty() {
        return run_commands_local(&task, &env, base_dir.as_deref(), &req.task_args).await;
    }

    if req.parallel && hosts.len() > 1 {
        return Ok(run_hosts_parallel(&task, &env, base_dir, &hosts, &req.task_args).await);
    }

    // Sequential host loop: every host gets its full command sequence;
    // outcomes aggregate by OR over non-zero-ness.
    let mut rc_total = 0;
    for host in &hosts {
        let rc = run_commands_on_host(&task, &env, base_dir.as_deref(), host, &req.task_args).await?;
        if rc_total == 0 {
            rc_total = rc;
        }
    }
    Ok(rc_total)
}

async fn run_commands_local(
    task: &Task,
    env: &IndexMap<String, String>,
    base_dir: Option<&Path>,
    task_args: &[String],
) -> Result<i32> {
    let opts = ExecOptions {
        sudo: task.sudo,
        sudo_user: task.sudo_user.clone(),
        prefix: String::new(),
    };
    run_command_sequence(task, env, base_dir, task_args, &opts, None).await
}

async fn run_commands_on_host(
    task: &Task,
    env: &IndexMap<String, String>,
    base_dir: Option<&Path>,
    host: &str,
    task_args: &[String],
) -> Result<i32> {
    let connection = SshConnection::new(host);
    let opts = ExecOptions {
        sudo: task.sudo,
        sudo_user: task.sudo_user.clone(),
        prefix: format!("[{host}] "),
    };
    run_command_sequence(task, env, base_dir, task_args, &opts, Some(&connection)).await
}

async fn run_hosts_parallel(
    task: &Task,
    env: &IndexMap<String, String>,
    base_dir: Option<PathBuf>,
    hosts: &[String],
    task_args: &[String],
) -> i32 {
    let task = Arc::new(task.clone());
    let env = Arc::new(env.clone());
    let base_dir = Arc::new(base_dir);
    let task_args = Arc::new(task_args.to_vec());

    let units: Vec<Unit> = hosts
        .iter()
        .cloned()
        .map(|host| {
            let task = Arc::clone(&task);
            let env = Arc::clone(&env);
            let base_dir = Arc::clone(&base_dir);
            let task_args = Arc::clone(&task_args);
            Box::pin(async move {
                run_commands_on_host(&task, &env, base_dir.as_deref(), &host, &task_args).await
            }) as Unit
        })
        .collect();

    run_bounded(units, DEFAULT_MAX_WORKERS).await
}

/// Run a task's command lines strictly in definition order, stopping at
/// the first non-zero exit code.
async fn run_command_sequence(
    task: &Task,
    env: &IndexMap<String, String>,
    base_dir: Option<&Path>,
    task_args: &[String],
    opts: &ExecOptions,
    connection: Option<&dyn RemoteConnection>,
) -> Result<i32> {
    for command in &task.commands {
        let rc = match &command.lang {
            Some(hint) => {
                let rendered =
                    render_polyglot_command(hint, &command.line, base_dir, task_args)?;
                debug!(
                    task = %task.name,
                    lang = %rendered.canonical_key,
                    "executing polyglot payload"
                );
                execute_prepared_script(&rendered.script, env, opts, connection).await?
            }
            None => {
                let line = append_task_args(&command.line, task_args);
                execute_command_line(&line, env, opts, connection).await?
            }
        };

        if rc != 0 {
            info!(task = %task.name, exit_code = rc, "command failed; stopping task");
            return Ok(rc);
        }
    }

    Ok(0)
}

/// Append trailing task arguments, each shell-quoted, to a plain command
/// line.
fn append_task_args(line: &str, task_args: &[String]) -> String {
    if task_args.is_empty() {
        return line.to_string();
    }
    let quoted = shell_words::join(task_args.iter().map(String::as_str));
    format!("{line} {quoted}")
}

fn merged_env(task: &Task, overrides: &[String]) -> Result<IndexMap<String, String>> {
    let mut env = task.env.clone();

    for entry in overrides {
        let Some((key, value)) = entry.split_once('=') else {
            return Err(PfError::syntax(
                format!("Malformed environment override: {entry}"),
                "Write -e KEY=VALUE",
            ));
        };
        if !is_valid_env_key(key) {
            return Err(PfError::syntax(
                format!("Invalid environment variable name: {key}"),
                "Names must match [A-Za-z_][A-Za-z0-9_]*",
            ));
        }
        env.insert(key.to_string(), value.to_string());
    }

    Ok(env)
}

fn resolve_hosts(task: &Task, hosts_arg: Option<&str>) -> Vec<String> {
    match hosts_arg {
        Some(hosts) => hosts
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect(),
        None => task.hosts.clone(),
    }
}

/// Dry-run output: show what would be executed without running anything.
fn print_dry_run(
    task: &Task,
    env: &IndexMap<String, String>,
    hosts: &[String],
    task_args: &[String],
) {
    println!("pf dry-run");
    println!("  task: {}", task.name);
    if let Some(desc) = &task.description {
        println!("  description: {desc}");
    }

    if hosts.is_empty() {
        println!("  target: local");
    } else {
        println!("  target: {}", hosts.join(", "));
    }

    if !env.is_empty() {
        let env_display = env
            .iter()
            .map(|(k, v)| format!("{k}={}", shell_words::quote(v)))
            .collect::<Vec<_>>()
            .join(" ");
        println!("  env: {env_display}");
    }

    if task.sudo {
        match &task.sudo_user {
            Some(user) => println!("  sudo: as {user}"),
            None => println!("  sudo: yes"),
        }
    }

    println!("  commands:");
    for (i, command) in task.commands.iter().enumerate() {
        let line = append_task_args(&command.line, task_args);
        match &command.lang {
            Some(lang) => println!("    {}. [{lang}] {line}", i + 1),
            None => println!("    {}. {line}", i + 1),
        }
    }

    debug!("dry-run complete (no execution)");
}
