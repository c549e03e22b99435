// tests/command_parse.rs

use pf::errors::PfError;
use pf::shell::parse_command_line;

#[test]
fn env_prefix_is_split_from_command() {
    let (env, cmd) = parse_command_line("PORT=8080 node server.js").unwrap();

    assert_eq!(env.len(), 1);
    assert_eq!(env.get("PORT").map(String::as_str), Some("8080"));
    assert_eq!(cmd, "node server.js");
}

#[test]
fn multiple_assignments_keep_insertion_order() {
    let (env, cmd) = parse_command_line("USER=test PORT=3000 node server.js").unwrap();

    let keys: Vec<&str> = env.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["USER", "PORT"]);
    assert_eq!(cmd, "node server.js");
}

#[test]
fn assignments_after_command_are_not_env_vars() {
    let (env, cmd) = parse_command_line("A=1 echo B=2").unwrap();

    assert_eq!(env.len(), 1);
    assert_eq!(env.get("A").map(String::as_str), Some("1"));
    assert_eq!(cmd, "echo B=2");
}

#[test]
fn dash_prefixed_tokens_are_not_assignments() {
    let (env, cmd) = parse_command_line("--opt=value cmd").unwrap();

    assert!(env.is_empty());
    assert_eq!(cmd, "--opt=value cmd");
}

#[test]
fn invalid_identifier_is_not_an_assignment() {
    // "1BAD" does not match the identifier pattern, so the token starts
    // the command instead.
    let (env, cmd) = parse_command_line("1BAD=x echo hi").unwrap();

    assert!(env.is_empty());
    assert_eq!(cmd, "1BAD=x echo hi");
}

#[test]
fn quoted_values_are_preserved_intact() {
    let (env, cmd) = parse_command_line(r#"MSG="hello world" echo done"#).unwrap();

    assert_eq!(env.get("MSG").map(String::as_str), Some("hello world"));
    assert_eq!(cmd, "echo done");
}

#[test]
fn remaining_command_is_requoted_for_safety() {
    let (env, cmd) = parse_command_line(r#"echo "two words""#).unwrap();

    assert!(env.is_empty());
    // The token with a space must stay a single argument after re-quoting.
    let tokens = shell_words_split(&cmd);
    assert_eq!(tokens, vec!["echo", "two words"]);
}

#[test]
fn empty_input_gives_empty_env_and_command() {
    let (env, cmd) = parse_command_line("").unwrap();

    assert!(env.is_empty());
    assert!(cmd.is_empty());
}

#[test]
fn only_assignments_leave_empty_command() {
    let (env, cmd) = parse_command_line("A=1 B=2").unwrap();

    assert_eq!(env.len(), 2);
    assert!(cmd.is_empty());
}

#[test]
fn unbalanced_quotes_fail_with_suggestion() {
    let err = parse_command_line("echo 'oops").unwrap_err();

    match err {
        PfError::Execution {
            command,
            suggestion,
            ..
        } => {
            assert_eq!(command.as_deref(), Some("echo 'oops"));
            assert!(suggestion.unwrap().contains("unclosed quotes"));
        }
        other => panic!("expected Execution error, got: {other:?}"),
    }
}

fn shell_words_split(cmd: &str) -> Vec<String> {
    shell_words::split(cmd).expect("requoted command must re-tokenize")
}
