// src/shell/secure.rs

//! Secure command construction and execution.
//!
//! Commands defined in task files are executed without handing the whole
//! spawn surface to a shell. A command only gets a shell intermediary when
//! it actually uses shell features (pipes, redirects, substitution, ...),
//! and then only as the single argument of an explicit `bash -c` invocation.

use indexmap::IndexMap;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::{PfError, Result};
use crate::shell::parse::parse_command_line;
use crate::shell::remote::RemoteConnection;

/// Characters and operators whose presence means a command needs shell
/// features. Compound forms (`&&`, `>>`, `2>&1`, here-docs) are covered by
/// their constituent characters.
const SHELL_METACHARACTERS: &[char] = &[
    '|', '>', '<', '&', ';', '`', '$', // operators and substitution
    '*', '?', '[', ']', '{', '}', // globbing and brace expansion
    '~', '(', ')', // home expansion and subshells
    '\n', // command chaining with newlines
];

/// Execution options for a single command line.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Run the command under `sudo`.
    pub sudo: bool,
    /// Specific user for `sudo -u`.
    pub sudo_user: Option<String>,
    /// Output prefix for the pre-spawn echo (e.g. a host label).
    pub prefix: String,
}

/// Whether `cmd` contains shell metacharacters that require shell features.
pub fn needs_shell_features(cmd: &str) -> bool {
    cmd.contains(SHELL_METACHARACTERS)
}

/// Build the process argument vector for a command, without `shell=true`
/// semantics anywhere.
///
/// - Simple commands are tokenized into a direct argument vector.
/// - Commands with shell features become `bash -c <whole-command>`, so the
///   shell's parsing is confined to that one argument.
/// - With `sudo`, an elevation-prefixed vector is built; environment
///   exports are folded into the shell string only on the shell branch,
///   otherwise variables travel through the process environment.
pub fn build_secure_args(
    command: &str,
    env_vars: &IndexMap<String, String>,
    task_env: &IndexMap<String, String>,
    sudo: bool,
    sudo_user: Option<&str>,
) -> Result<Vec<String>> {
    let shell_features = needs_shell_features(command);

    if sudo {
        let mut args = vec!["sudo".to_string()];

        if let Some(user) = sudo_user {
            args.push("-u".to_string());
            args.push(user.to_string());
        }

        // Always force a fresh home-directory context.
        args.push("-H".to_string());

        if shell_features {
            let full_command = prepend_env_exports(command, env_vars, task_env);
            args.push("bash".to_string());
            args.push("-c".to_string());
            args.push(full_command);
        } else {
            let cmd_args = shell_words::split(command).map_err(|e| PfError::Execution {
                message: format!("Failed to parse sudo command arguments: {e}"),
                command: Some(command.to_string()),
                environment: Vec::new(),
                suggestion: Some(
                    "Check for unclosed quotes or invalid escape sequences".to_string(),
                ),
            })?;
            args.extend(cmd_args);
        }

        return Ok(args);
    }

    if shell_features {
        // Environment variables are handled by the process environment.
        return Ok(vec![
            "bash".to_string(),
            "-c".to_string(),
            command.to_string(),
        ]);
    }

    match shell_words::split(command) {
        Ok(args) => Ok(args),
        Err(e) => {
            // Tokenization of a metacharacter-free command failed (malformed
            // quoting). Fall back to an explicit shell invocation instead of
            // raising; the log line keeps the fallback observable.
            warn!(
                command,
                error = %e,
                "secure tokenization failed; falling back to shell invocation"
            );
            Ok(vec![
                "bash".to_string(),
                "-c".to_string(),
                command.to_string(),
            ])
        }
    }
}

/// Build a single composite command string for remote execution:
/// environment exports, then the command, then elevation wrapping.
pub fn build_composite_command(
    env_vars: &IndexMap<String, String>,
    command: &str,
    task_env: &IndexMap<String, String>,
    sudo: bool,
    sudo_user: Option<&str>,
) -> String {
    let mut full_command = prepend_env_exports(command, env_vars, task_env);

    if sudo {
        full_command = match sudo_user {
            Some(user) => format!(
                "sudo -u {} -H bash -lc {}",
                shell_words::quote(user),
                shell_words::quote(&full_command)
            ),
            None => format!("sudo bash -lc {}", shell_words::quote(&full_command)),
        };
    }

    full_command
}

/// Human-readable echo of what is about to run: env prefix, command, and a
/// "(sudo)" marker when elevated.
pub fn display_command(
    env_vars: &IndexMap<String, String>,
    task_env: &IndexMap<String, String>,
    command: &str,
    sudo: bool,
) -> String {
    let merged = merge_env(task_env, env_vars);

    let mut display = if merged.is_empty() {
        command.to_string()
    } else {
        let env_display = merged
            .iter()
            .map(|(k, v)| format!("{k}={}", shell_words::quote(v)))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{env_display} {command}")
    };

    if sudo {
        display = format!("(sudo) {display}");
    }

    display
}

/// Execute a raw command line: parse its env-assignment prefix, echo the
/// resolved command, then spawn locally or submit to a remote connection.
///
/// Returns the numeric exit code.
pub async fn execute_command_line(
    cmd_line: &str,
    task_env: &IndexMap<String, String>,
    opts: &ExecOptions,
    connection: Option<&dyn RemoteConnection>,
) -> Result<i32> {
    let (env_vars, command) = parse_command_line(cmd_line)?;

    if command.is_empty() {
        warn!(
            "{}Empty command after parsing environment variables",
            opts.prefix
        );
        return Ok(0);
    }

    let display_cmd = display_command(&env_vars, task_env, &command, opts.sudo);
    eprintln!("{}$ {display_cmd}", opts.prefix);

    match connection {
        None => spawn_local(&command, &env_vars, task_env, opts, &display_cmd).await,
        Some(conn) => {
            let composite = build_composite_command(
                &env_vars,
                &command,
                task_env,
                opts.sudo,
                opts.sudo_user.as_deref(),
            );
            submit_remote(conn, &composite, &env_vars, task_env, &display_cmd).await
        }
    }
}

/// Execute an already-rendered shell payload (e.g. a polyglot script).
///
/// The payload is always confined to a single `bash -c` argument; it is
/// never re-parsed for env assignments, since its content is a script, not
/// a task-file command line.
pub async fn execute_prepared_script(
    payload: &str,
    task_env: &IndexMap<String, String>,
    opts: &ExecOptions,
    connection: Option<&dyn RemoteConnection>,
) -> Result<i32> {
    let empty = IndexMap::new();

    let marker = if opts.sudo {
        "(sudo) <rendered script>"
    } else {
        "<rendered script>"
    };
    eprintln!("{}$ {marker}", opts.prefix);

    match connection {
        None => {
            let mut args = Vec::new();
            if opts.sudo {
                args.push("sudo".to_string());
                if let Some(user) = &opts.sudo_user {
                    args.push("-u".to_string());
                    args.push(user.clone());
                }
                args.push("-H".to_string());
            }
            args.push("bash".to_string());
            args.push("-c".to_string());
            args.push(payload.to_string());

            let mut cmd = Command::new(&args[0]);
            cmd.args(&args[1..]);
            apply_env(&mut cmd, task_env, &empty);
            wait_for_exit(cmd, marker).await
        }
        Some(conn) => {
            let composite = build_composite_command(
                &empty,
                payload,
                task_env,
                opts.sudo,
                opts.sudo_user.as_deref(),
            );
            submit_remote(conn, &composite, &empty, task_env, marker).await
        }
    }
}

async fn spawn_local(
    command: &str,
    env_vars: &IndexMap<String, String>,
    task_env: &IndexMap<String, String>,
    opts: &ExecOptions,
    display_cmd: &str,
) -> Result<i32> {
    let args = build_secure_args(
        command,
        env_vars,
        task_env,
        opts.sudo,
        opts.sudo_user.as_deref(),
    )?;

    debug!(?args, "spawning local process");

    let (program, rest) = args.split_first().ok_or_else(|| PfError::Execution {
        message: "Cannot execute an empty argument vector".to_string(),
        command: Some(display_cmd.to_string()),
        environment: Vec::new(),
        suggestion: None,
    })?;

    let mut cmd = Command::new(program);
    cmd.args(rest);
    apply_env(&mut cmd, task_env, env_vars);

    wait_for_exit(cmd, display_cmd).await
}

async fn submit_remote(
    conn: &dyn RemoteConnection,
    composite: &str,
    env_vars: &IndexMap<String, String>,
    task_env: &IndexMap<String, String>,
    display_cmd: &str,
) -> Result<i32> {
    info!(target = conn.target(), "submitting remote command");

    conn.run(composite).await.map_err(|e| PfError::Execution {
        message: format!("Remote command execution failed: {e}"),
        command: Some(display_cmd.to_string()),
        environment: merge_env(task_env, env_vars),
        suggestion: Some("Check network connectivity and remote host accessibility".to_string()),
    })
}

async fn wait_for_exit(mut cmd: Command, display_cmd: &str) -> Result<i32> {
    cmd.kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| PfError::Execution {
        message: format!("Failed to execute subprocess: {e}"),
        command: Some(display_cmd.to_string()),
        environment: Vec::new(),
        suggestion: Some("Check that the command exists and is executable".to_string()),
    })?;

    let status = child.wait().await.map_err(|e| PfError::Execution {
        message: format!("Failed waiting for subprocess: {e}"),
        command: Some(display_cmd.to_string()),
        environment: Vec::new(),
        suggestion: None,
    })?;

    Ok(status.code().unwrap_or(-1))
}

fn apply_env(
    cmd: &mut Command,
    task_env: &IndexMap<String, String>,
    env_vars: &IndexMap<String, String>,
) {
    for (k, v) in task_env.iter().chain(env_vars.iter()) {
        cmd.env(k, v);
    }
}

/// Merge task-level env with command-line env; command-line wins.
fn merge_env(
    task_env: &IndexMap<String, String>,
    env_vars: &IndexMap<String, String>,
) -> Vec<(String, String)> {
    let mut merged: IndexMap<String, String> = task_env.clone();
    for (k, v) in env_vars {
        merged.insert(k.clone(), v.clone());
    }
    merged.into_iter().collect()
}

fn prepend_env_exports(
    command: &str,
    env_vars: &IndexMap<String, String>,
    task_env: &IndexMap<String, String>,
) -> String {
    let merged = merge_env(task_env, env_vars);
    if merged.is_empty() {
        return command.to_string();
    }

    let exports = merged
        .iter()
        .map(|(k, v)| format!("export {k}={}", shell_words::quote(v)))
        .collect::<Vec<_>>()
        .join("; ");

    format!("{exports}; {command}")
}
