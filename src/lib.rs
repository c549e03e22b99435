// src/lib.rs

pub mod cli;
pub mod errors;
pub mod logging;
pub mod orchestrator;
pub mod polyglot;
pub mod shell;
pub mod taskfile;

/// High-level entry point used by `main.rs`.
///
/// Takes the full argument vector (program name included) and returns the
/// process exit status. This wires together:
/// - alias resolution and argument parsing
/// - logging setup
/// - builtin-command and task-execution routing
pub async fn run(argv: Vec<String>) -> i32 {
    orchestrator::dispatch(argv).await
}
