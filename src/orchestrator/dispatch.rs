// src/orchestrator/dispatch.rs

//! Top-level dispatch: alias rewriting, argument parsing, and routing to
//! builtin handlers or the task-execution funnel.

use tracing::{debug, warn};

use crate::cli::{CliArgs, PfCommand};
use crate::errors::{PfError, Result, format_for_user};
use crate::orchestrator::builtin;
use crate::orchestrator::debug_flag;
use crate::orchestrator::run::{ExecutionRequest, run_task};
use crate::taskfile::loader::{alias_map, load_taskfile};

/// Builtin command names an alias may not shadow.
pub const BUILTIN_COMMANDS: &[&str] = &["list", "help", "run", "prune", "debug-on", "debug-off"];

/// Entry point: resolve aliases, parse arguments, set up logging, route.
///
/// `argv` is the full argument vector including the program name. The
/// returned integer is the process exit status.
pub async fn dispatch(argv: Vec<String>) -> i32 {
    let argv = resolve_aliases(argv);

    let args = match <CliArgs as clap::Parser>::try_parse_from(&argv) {
        Ok(args) => args,
        Err(err) => {
            let code = err.exit_code();
            let _ = err.print();
            return code;
        }
    };

    let debug_mode = debug_flag::debug_mode_active(args.debug);
    if let Err(err) = crate::logging::init_logging(args.log_level, debug_mode) {
        eprintln!("failed to initialise logging: {err}");
    }

    match route(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", format_for_user(&err));
            1
        }
    }
}

/// Rewrite a leading alias to the canonical `run <taskName>` form.
///
/// The scan skips `-f/--file` (with value) and other options; the first
/// non-option argument is checked against the builtin set, then looked up
/// in the alias map. A failed alias load is treated as "no alias".
pub fn resolve_aliases(argv: Vec<String>) -> Vec<String> {
    let mut file_arg: Option<String> = None;
    let mut i = 1;

    while i < argv.len() {
        let arg = &argv[i];

        if (arg == "-f" || arg == "--file") && i + 1 < argv.len() {
            file_arg = Some(argv[i + 1].clone());
            i += 2;
        } else if let Some(value) = arg.strip_prefix("--file=") {
            file_arg = Some(value.to_string());
            i += 1;
        } else if !arg.starts_with('-') {
            // Found the leading non-option argument.
            if !BUILTIN_COMMANDS.contains(&arg.as_str()) {
                let aliases = alias_map(file_arg.as_deref());
                if let Some(task_name) = aliases.get(arg.as_str()) {
                    debug!(alias = %arg, task = %task_name, "rewriting alias invocation");
                    let mut rewritten = argv[..i].to_vec();
                    rewritten.push("run".to_string());
                    rewritten.push(task_name.clone());
                    rewritten.extend(argv[i + 1..].iter().cloned());
                    return rewritten;
                }
            }
            break;
        } else {
            i += 1;
        }
    }

    argv
}

async fn route(args: CliArgs) -> Result<i32> {
    let file = args.file.clone();

    let Some(command) = args.command else {
        eprintln!("No command specified. Use 'pf help' for usage information.");
        return Ok(1);
    };

    match command {
        PfCommand::List => builtin::list(file.as_deref()),

        PfCommand::Help { task } => builtin::help(task.as_deref(), file.as_deref()),

        PfCommand::Prune => builtin::prune().await,

        PfCommand::DebugOn => {
            debug_flag::enable()?;
            println!(
                "Debug mode enabled. Set PF_DEBUG=1 in your environment or run with --debug."
            );
            Ok(0)
        }

        PfCommand::DebugOff => {
            debug_flag::disable()?;
            println!("Debug mode disabled.");
            Ok(0)
        }

        PfCommand::Run { task, task_args } => {
            run_with_diagnostics(ExecutionRequest {
                task_name: task,
                file,
                hosts: args.hosts,
                env: args.env,
                dry_run: args.dry_run,
                debug: args.debug,
                parallel: args.parallel,
                task_args,
            })
            .await
        }

        PfCommand::External(mut parts) => {
            if parts.is_empty() {
                eprintln!("No subcommand specified.");
                return Ok(1);
            }
            let task = parts.remove(0);
            warn_if_undiscovered(&task, file.as_deref());

            run_with_diagnostics(ExecutionRequest {
                task_name: task,
                file,
                hosts: args.hosts,
                env: args.env,
                dry_run: args.dry_run,
                debug: args.debug,
                parallel: args.parallel,
                task_args: parts,
            })
            .await
        }
    }
}

/// Run one request; an unknown task name gets a near-miss suggestion
/// attached before the error surfaces.
async fn run_with_diagnostics(req: ExecutionRequest) -> Result<i32> {
    let file = req.file.clone();
    match run_task(req).await {
        Ok(code) => Ok(code),
        Err(PfError::TaskNotFound(name)) => {
            let mut message = format!("Task '{name}' not found.");
            let similar = similar_task_names(&name, file.as_deref());
            if !similar.is_empty() {
                message.push_str(&format!(" Did you mean: {}?", similar.join(", ")));
            }
            eprintln!("{message}");
            Ok(1)
        }
        Err(other) => Err(other),
    }
}

/// An invoked external name that is neither a root task nor a discovered
/// subcommand still reaches the funnel (which reports it as unknown), but
/// the mismatch is worth surfacing early.
fn warn_if_undiscovered(name: &str, file_arg: Option<&str>) {
    if let Ok(loaded) = load_taskfile(file_arg) {
        if !loaded.taskfile.tasks.contains_key(name) && !loaded.subcommands.contains(name) {
            warn!(task = %name, "invoked name is not a known task or discovered subcommand");
        }
    }
}

/// Cheap near-miss lookup: known task names sharing a prefix with, or
/// containing, the unknown name.
fn similar_task_names(name: &str, file_arg: Option<&str>) -> Vec<String> {
    let Ok(loaded) = load_taskfile(file_arg) else {
        return Vec::new();
    };

    let lowered = name.to_lowercase();
    let prefix: String = lowered.chars().take(3).collect();

    loaded
        .taskfile
        .tasks
        .keys()
        .filter(|candidate| {
            let c = candidate.to_lowercase();
            c.contains(&lowered) || lowered.contains(&c) || (!prefix.is_empty() && c.starts_with(&prefix))
        })
        .cloned()
        .collect()
}
