// src/shell/mod.rs

//! Secure command construction and execution layer.
//!
//! - [`parse`] splits raw command lines into env assignments + command.
//! - [`secure`] decides shell vs direct-argv execution, applies sudo
//!   wrapping, and spawns processes locally.
//! - [`remote`] provides the `RemoteConnection` trait and the ssh-backed
//!   implementation used for remote hosts.

pub mod parse;
pub mod remote;
pub mod secure;

pub use parse::parse_command_line;
pub use remote::{RemoteConnection, SshConnection};
pub use secure::{
    ExecOptions, build_composite_command, build_secure_args, display_command,
    execute_command_line, execute_prepared_script, needs_shell_features,
};
