// tests/alias_resolution.rs

use std::fs;

use pf::orchestrator::{BUILTIN_COMMANDS, resolve_aliases};
use tempfile::TempDir;

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[test]
fn alias_is_rewritten_to_canonical_run_form() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Pfyfile.pf");
    fs::write(
        &file,
        "alias b = build\n\ntask build:\n    make\n",
    )
    .unwrap();

    let resolved = resolve_aliases(argv(&[
        "pf",
        "-f",
        file.to_str().unwrap(),
        "b",
        "--release",
    ]));

    assert_eq!(
        resolved,
        argv(&["pf", "-f", file.to_str().unwrap(), "run", "build", "--release"])
    );
}

#[test]
fn builtin_names_are_never_rewritten() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Pfyfile.pf");
    // An alias shadowing a builtin must lose.
    fs::write(&file, "alias list = build\n\ntask build:\n    make\n").unwrap();

    for builtin in BUILTIN_COMMANDS {
        let resolved =
            resolve_aliases(argv(&["pf", "-f", file.to_str().unwrap(), builtin]));
        assert_eq!(
            resolved,
            argv(&["pf", "-f", file.to_str().unwrap(), builtin]),
            "builtin '{builtin}' must pass through untouched"
        );
    }
}

#[test]
fn unknown_name_passes_through_for_subcommand_routing() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Pfyfile.pf");
    fs::write(&file, "task build:\n    make\n").unwrap();

    let original = argv(&["pf", "-f", file.to_str().unwrap(), "deploy"]);
    assert_eq!(resolve_aliases(original.clone()), original);
}

#[test]
fn missing_alias_source_is_treated_as_no_alias() {
    // No task file anywhere near this path: resolution is best-effort and
    // must leave the invocation untouched.
    let original = argv(&["pf", "-f", "/definitely/absent/Pfyfile.pf", "b"]);
    assert_eq!(resolve_aliases(original.clone()), original);
}

#[test]
fn file_equals_spelling_is_honoured() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Pfyfile.pf");
    fs::write(&file, "alias d = deploy\n\ntask deploy:\n    true\n").unwrap();

    let resolved = resolve_aliases(argv(&[
        "pf",
        &format!("--file={}", file.to_str().unwrap()),
        "d",
    ]));

    assert_eq!(resolved[2], "run");
    assert_eq!(resolved[3], "deploy");
}

#[test]
fn options_before_the_leading_argument_are_skipped() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Pfyfile.pf");
    fs::write(&file, "alias b = build\n\ntask build:\n    true\n").unwrap();

    let resolved = resolve_aliases(argv(&[
        "pf",
        "--parallel",
        "-f",
        file.to_str().unwrap(),
        "b",
    ]));

    assert_eq!(resolved[4], "run");
    assert_eq!(resolved[5], "build");
}
