// src/orchestrator/debug_flag.rs

//! Persistent debug-mode marker file.
//!
//! Debug mode is toggled by the mere existence of `~/.pf_debug` (its
//! content is irrelevant). The flag is read once at startup; enabling
//! writes through a temp file and renames it into place so concurrent
//! toggles never leave a partially-written marker.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::errors::{PfError, Result};

const MARKER_NAME: &str = ".pf_debug";

/// Location of the marker file under the invoking user's home directory.
pub fn marker_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(MARKER_NAME))
}

/// Whether the persistent marker is present.
pub fn is_enabled() -> bool {
    marker_path().map(|p| p.exists()).unwrap_or(false)
}

/// Whether debug mode is active for this invocation: the `--debug` flag,
/// a non-empty `PF_DEBUG`, or the persisted marker.
pub fn debug_mode_active(cli_flag: bool) -> bool {
    cli_flag
        || std::env::var("PF_DEBUG").map(|v| !v.is_empty()).unwrap_or(false)
        || is_enabled()
}

/// Enable persistent debug mode (atomic write-to-temp-then-rename).
pub fn enable() -> Result<()> {
    let path = marker_path()
        .ok_or_else(|| PfError::Environment("Cannot locate home directory".to_string()))?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, "1")?;
    fs::rename(&tmp, &path)?;

    debug!(path = %path.display(), "debug marker written");
    Ok(())
}

/// Disable persistent debug mode. Removing an absent marker is fine.
pub fn disable() -> Result<()> {
    let path = marker_path()
        .ok_or_else(|| PfError::Environment("Cannot locate home directory".to_string()))?;

    match fs::remove_file(&path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    debug!(path = %path.display(), "debug marker removed");
    Ok(())
}
