// src/shell/remote.rs

//! Remote-connection abstraction.
//!
//! The executor talks to a `RemoteConnection` instead of a concrete SSH
//! client. This makes it easy to swap in a fake connection in tests while
//! keeping the production implementation here.
//!
//! - `SshConnection` is the default implementation. It shells out to the
//!   system `ssh` client with a forced pseudo-terminal and the composite
//!   command as a single trailing argument.
//! - Tests can provide their own `RemoteConnection` that records submitted
//!   commands and returns canned exit codes.

use std::future::Future;
use std::pin::Pin;

use anyhow::Context;
use tokio::process::Command;
use tracing::debug;

use crate::errors::{PfError, Result};

/// Trait abstracting how composite commands reach a remote host.
///
/// Production code uses [`SshConnection`]; tests can provide their own
/// implementation that doesn't open real connections.
pub trait RemoteConnection: Send + Sync {
    /// The host identifier this connection points at (e.g. `user@web1`).
    fn target(&self) -> &str;

    /// Run one composite command remotely with a pseudo-terminal and
    /// return the remote exit status.
    fn run<'a>(&'a self, command: &'a str)
    -> Pin<Box<dyn Future<Output = Result<i32>> + Send + 'a>>;
}

/// SSH-backed connection used in production.
pub struct SshConnection {
    target: String,
}

impl SshConnection {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl RemoteConnection for SshConnection {
    fn target(&self) -> &str {
        &self.target
    }

    fn run<'a>(
        &'a self,
        command: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + 'a>> {
        Box::pin(async move {
            debug!(target = %self.target, "running command over ssh");

            // -t forces PTY allocation so interactive-style commands behave
            // the same as a local run.
            let status = Command::new("ssh")
                .arg("-t")
                .arg(&self.target)
                .arg(command)
                .kill_on_drop(true)
                .status()
                .await
                .with_context(|| format!("connecting to remote host '{}'", self.target))
                .map_err(|e| PfError::Environment(format!("{e:#}")))?;

            Ok(status.code().unwrap_or(-1))
        })
    }
}
