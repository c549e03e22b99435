// src/polyglot/mod.rs

//! Polyglot execution builder.
//!
//! Turns a source snippet tagged with a language hint into a
//! self-contained, temp-file-based build-and-run shell payload for that
//! language's toolchain.
//!
//! - [`profile`] defines the `LanguageProfile` trait and its variants
//!   (script, compile, JVM, browser).
//! - [`registry`] holds the canonical key table and alias resolution.
//! - [`source`] resolves inline vs file-referenced snippets.

pub mod profile;
pub mod registry;
pub mod source;

use std::path::Path;

use tracing::debug;

use crate::errors::Result;

pub use profile::{LanguageProfile, POLY_DELIM};
pub use registry::LanguageRegistry;
pub use source::{PolyglotSource, extract_source};

/// Rendered payload plus the canonical key the hint resolved to.
#[derive(Debug, Clone)]
pub struct RenderedPayload {
    pub script: String,
    pub canonical_key: String,
}

/// Render the shell payload for one polyglot command.
///
/// `extra_args` (trailing task arguments from the CLI) are appended after
/// any arguments extracted from the command itself.
pub fn render_polyglot_command(
    lang_hint: &str,
    cmd: &str,
    base_dir: Option<&Path>,
    extra_args: &[String],
) -> Result<RenderedPayload> {
    let canonical_key = LanguageRegistry::canonicalize(lang_hint);
    let registry = LanguageRegistry::builtin();
    let profile = registry.profile(&canonical_key, lang_hint)?;

    let mut source = extract_source(cmd, base_dir)?;
    source.args.extend(extra_args.iter().cloned());

    debug!(
        lang = %canonical_key,
        from_file = source.file.is_some(),
        args = source.args.len(),
        "rendering polyglot payload"
    );

    Ok(RenderedPayload {
        script: profile.render(&source.code, &source.args),
        canonical_key,
    })
}
