// tests/include_discovery.rs

use std::fs;

use pf::taskfile::{SubcommandRegistry, extract_includes, load_taskfile};
use tempfile::TempDir;

#[test]
fn include_directives_are_matched_by_exact_prefix() {
    let text = "include tasks/a.pf\n  include \"tasks/b.pf\"\ninclusive remark\ninclude 'c.pf'\n";

    let includes = extract_includes(text);
    assert_eq!(includes, vec!["tasks/a.pf", "tasks/b.pf", "c.pf"]);
}

#[test]
fn discovery_registers_tasks_of_each_included_file() {
    pf_test_utils::init_tracing();

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("Pfyfile.pf");
    fs::create_dir(dir.path().join("tasks")).unwrap();

    fs::write(
        &root,
        "include \"tasks/deploy.pf\"\n\ntask build:\n    make\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("tasks/deploy.pf"),
        "task deploy:\n    make deploy\ntask rollback:\n    make rollback\n",
    )
    .unwrap();

    let text = fs::read_to_string(&root).unwrap();
    let registry = SubcommandRegistry::discover(&root, &text);

    let entries: Vec<_> = registry.entries().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "tasks/deploy.pf");
    let names: Vec<&str> = entries[0].1.iter().map(String::as_str).collect();
    assert_eq!(names, vec!["deploy", "rollback"]);

    assert!(registry.contains("deploy"));
    assert!(registry.contains("rollback"));
    assert!(!registry.contains("build"));
}

#[test]
fn missing_include_warns_and_root_stays_usable() {
    pf_test_utils::init_tracing();

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("Pfyfile.pf");
    fs::write(
        &root,
        "include \"tasks/deploy.pf\"\n\ntask build:\n    make\n",
    )
    .unwrap();

    // Discovery degrades to an empty registry.
    let text = fs::read_to_string(&root).unwrap();
    let registry = SubcommandRegistry::discover(&root, &text);
    assert!(registry.is_empty());

    // The root task set remains fully usable.
    let loaded = load_taskfile(root.to_str()).unwrap();
    assert!(loaded.taskfile.tasks.contains_key("build"));
}

#[test]
fn included_tasks_merge_into_the_root_task_set() {
    pf_test_utils::init_tracing();

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("Pfyfile.pf");
    fs::write(&root, "include extra.pf\n\ntask build:\n    make\n").unwrap();
    fs::write(
        dir.path().join("extra.pf"),
        "task lint:\n    cargo clippy\n",
    )
    .unwrap();

    let loaded = load_taskfile(root.to_str()).unwrap();
    assert!(loaded.taskfile.tasks.contains_key("build"));
    assert!(loaded.taskfile.tasks.contains_key("lint"));
}

#[test]
fn root_definition_wins_over_included_duplicate() {
    pf_test_utils::init_tracing();

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("Pfyfile.pf");
    fs::write(&root, "include extra.pf\n\ntask build:\n    make root\n").unwrap();
    fs::write(
        dir.path().join("extra.pf"),
        "task build:\n    make included\n",
    )
    .unwrap();

    let loaded = load_taskfile(root.to_str()).unwrap();
    assert_eq!(loaded.taskfile.tasks["build"].commands[0].line, "make root");
}

#[test]
fn unparsable_include_is_skipped_not_fatal() {
    pf_test_utils::init_tracing();

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("Pfyfile.pf");
    fs::write(&root, "include broken.pf\n\ntask build:\n    make\n").unwrap();
    fs::write(dir.path().join("broken.pf"), "this is not a task file\n").unwrap();

    let loaded = load_taskfile(root.to_str()).unwrap();
    assert!(loaded.taskfile.tasks.contains_key("build"));
    assert!(loaded.subcommands.is_empty());
}

#[test]
fn missing_task_file_is_a_syntax_error_with_suggestion() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("Absent.pf");

    let err = load_taskfile(missing.to_str()).unwrap_err();
    match err {
        pf::errors::PfError::Syntax { suggestion, .. } => {
            assert!(suggestion.unwrap().contains("Pfyfile.pf"));
        }
        other => panic!("expected Syntax error, got: {other:?}"),
    }
}
