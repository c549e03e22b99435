// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! NOTE: this expects `clap` to be built with the `derive` feature, e.g.:
//! `clap = { version = "4.5.53", features = ["derive"] }` in `Cargo.toml`.
//!
//! The short flag `-h` is taken by `--hosts`, so the automatic help short
//! flag is disabled and `--help` is re-registered explicitly.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `pf`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pf",
    version,
    about = "A polyglot task runner for local and remote automation.",
    long_about = None,
    disable_help_flag = true,
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Path to the task file.
    ///
    /// Default: `Pfyfile.pf` in the current working directory.
    #[arg(short = 'f', long = "file", value_name = "PATH", global = true)]
    pub file: Option<String>,

    /// Override target hosts (comma-separated, e.g. "user@web1,user@web2").
    #[arg(short = 'h', long = "hosts", value_name = "HOSTS", global = true)]
    pub hosts: Option<String>,

    /// Set environment variables (repeatable).
    #[arg(
        short = 'e',
        long = "env",
        value_name = "KEY=VALUE",
        global = true,
        action = ArgAction::Append
    )]
    pub env: Vec<String>,

    /// Enable debug output for this invocation.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Show what would be executed without running anything.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Run independent executions in parallel when possible.
    #[arg(long, global = true)]
    pub parallel: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PF_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Print help.
    #[arg(long, action = ArgAction::Help, global = true)]
    help: Option<bool>,

    #[command(subcommand)]
    pub command: Option<PfCommand>,
}

/// Builtin commands plus the escape hatch for discovered subcommands.
///
/// Every variant disables the auto help flags: `-h` is claimed by the
/// global `--hosts` short and `--help` by the global help arg above.
#[derive(Debug, Clone, Subcommand)]
pub enum PfCommand {
    /// List all available tasks.
    #[command(disable_help_flag = true)]
    List,

    /// Run a specific task.
    #[command(disable_help_flag = true)]
    Run {
        /// Task name to run.
        task: String,

        /// Trailing arguments forwarded to the task's commands.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        task_args: Vec<String>,
    },

    /// Show help (optionally for a specific task).
    #[command(disable_help_flag = true)]
    Help {
        /// Task name to describe.
        task: Option<String>,
    },

    /// Clean up containers and resources.
    #[command(disable_help_flag = true)]
    Prune,

    /// Enable persistent debug mode.
    #[command(disable_help_flag = true)]
    DebugOn,

    /// Disable persistent debug mode.
    #[command(disable_help_flag = true)]
    DebugOff,

    /// A discovered subcommand (task name from an included file).
    #[command(external_subcommand)]
    External(Vec<String>),
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Parse an explicit argument vector (the orchestrator rewrites aliases
/// before handing the vector to clap).
pub fn parse_from<I, T>(argv: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    CliArgs::parse_from(argv)
}
