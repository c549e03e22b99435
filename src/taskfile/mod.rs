// src/taskfile/mod.rs

//! Task-file contract layer.
//!
//! The orchestrator consumes task files through a stable contract:
//! `task name -> {commands, env, hosts, description}` plus `alias` and
//! `include` directives. This module owns the data model, the minimal
//! parser implementing that contract, file discovery/loading, and
//! include-based subcommand discovery.

pub mod include;
pub mod loader;
pub mod model;
pub mod parse;

pub use include::{SubcommandRegistry, extract_includes};
pub use loader::{LoadedTaskFile, alias_map, find_taskfile, load_taskfile};
pub use model::{AliasMap, CommandLine, Task, TaskFile};
pub use parse::parse_taskfile_text;
