// tests/secure_exec.rs

use indexmap::IndexMap;
use pf::shell::{
    ExecOptions, build_composite_command, build_secure_args, display_command,
    execute_command_line, needs_shell_features,
};

fn env(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn plain_commands_do_not_need_shell_features() {
    for cmd in ["echo hi", "ls -la /tmp", "cargo build --release"] {
        assert!(!needs_shell_features(cmd), "unexpected shell need: {cmd}");
    }
}

#[test]
fn metacharacters_need_shell_features() {
    for cmd in [
        "echo hi && echo bye",
        "cat in.txt | sort",
        "echo x > out.txt",
        "echo $HOME",
        "ls *.rs",
        "echo `date`",
        "(cd /tmp && ls)",
        "ls ~",
        "echo a\necho b",
        "grep foo 2> err.log",
    ] {
        assert!(needs_shell_features(cmd), "missed shell need: {cmd}");
    }
}

#[test]
fn simple_command_becomes_direct_argv() {
    let args = build_secure_args("echo hello world", &env(&[]), &env(&[]), false, None).unwrap();
    assert_eq!(args, vec!["echo", "hello", "world"]);
}

#[test]
fn shell_command_is_confined_to_one_argument() {
    let args =
        build_secure_args("echo hi && echo bye", &env(&[]), &env(&[]), false, None).unwrap();
    assert_eq!(args, vec!["bash", "-c", "echo hi && echo bye"]);
}

#[test]
fn malformed_quoting_falls_back_to_shell() {
    // No metacharacters, but tokenization fails: the executor trades
    // strictness for robustness and wraps the command in bash -c.
    let args = build_secure_args("echo 'oops", &env(&[]), &env(&[]), false, None).unwrap();
    assert_eq!(args, vec!["bash", "-c", "echo 'oops"]);
}

#[test]
fn sudo_prefixes_tokenized_args_directly() {
    let args = build_secure_args("systemctl restart app", &env(&[]), &env(&[]), true, None)
        .unwrap();
    assert_eq!(args, vec!["sudo", "-H", "systemctl", "restart", "app"]);
}

#[test]
fn sudo_with_user_adds_user_switch_flag() {
    let args =
        build_secure_args("whoami", &env(&[]), &env(&[]), true, Some("deploy")).unwrap();
    assert_eq!(args, vec!["sudo", "-u", "deploy", "-H", "whoami"]);
}

#[test]
fn sudo_shell_command_folds_env_exports_into_bash_string() {
    let args = build_secure_args(
        "echo $APP_ENV | tee log",
        &env(&[("APP_ENV", "prod")]),
        &env(&[]),
        true,
        None,
    )
    .unwrap();

    assert_eq!(args[..4], ["sudo", "-H", "bash", "-c"]);
    assert_eq!(args[4], "export APP_ENV=prod; echo $APP_ENV | tee log");
}

#[test]
fn sudo_malformed_quoting_is_an_error() {
    let result = build_secure_args("echo 'oops", &env(&[]), &env(&[]), true, None);
    assert!(result.is_err());
}

#[test]
fn composite_command_exports_then_runs() {
    let composite = build_composite_command(
        &env(&[("PORT", "8080")]),
        "node server.js",
        &env(&[("APP", "web")]),
        false,
        None,
    );
    assert_eq!(
        composite,
        "export APP=web; export PORT=8080; node server.js"
    );
}

#[test]
fn command_line_env_overrides_task_env_in_composite() {
    let composite = build_composite_command(
        &env(&[("PORT", "9999")]),
        "node server.js",
        &env(&[("PORT", "8080")]),
        false,
        None,
    );
    assert_eq!(composite, "export PORT=9999; node server.js");
}

#[test]
fn composite_sudo_wraps_whole_string() {
    let composite = build_composite_command(&env(&[]), "whoami", &env(&[]), true, None);
    assert_eq!(composite, "sudo bash -lc whoami");

    let composite =
        build_composite_command(&env(&[]), "whoami", &env(&[]), true, Some("deploy"));
    assert_eq!(composite, "sudo -u deploy -H bash -lc whoami");
}

#[test]
fn display_command_shows_env_and_sudo_marker() {
    let display = display_command(
        &env(&[("PORT", "8080")]),
        &env(&[]),
        "node server.js",
        true,
    );
    assert_eq!(display, "(sudo) PORT=8080 node server.js");
}

#[test]
fn values_with_spaces_are_quoted_in_display() {
    let display = display_command(&env(&[("MSG", "hello world")]), &env(&[]), "echo", false);
    assert_eq!(display, "MSG='hello world' echo");
}

#[tokio::test]
async fn local_execution_returns_exit_code() {
    pf_test_utils::init_tracing();

    let opts = ExecOptions::default();
    let rc = execute_command_line("true", &env(&[]), &opts, None).await.unwrap();
    assert_eq!(rc, 0);

    let rc = execute_command_line("false", &env(&[]), &opts, None).await.unwrap();
    assert_ne!(rc, 0);
}

#[tokio::test]
async fn env_vars_reach_the_spawned_process() {
    pf_test_utils::init_tracing();

    // printenv exits non-zero when the variable is missing, so a zero exit
    // proves the assignment travelled through the process environment.
    let opts = ExecOptions::default();
    let rc = execute_command_line("GREETING=hi printenv GREETING", &env(&[]), &opts, None)
        .await
        .unwrap();
    assert_eq!(rc, 0);

    let rc = execute_command_line("printenv PF_UNSET_VAR_XYZ", &env(&[]), &opts, None)
        .await
        .unwrap();
    assert_ne!(rc, 0);
}

#[tokio::test]
async fn empty_command_after_env_parsing_is_a_warning_not_an_error() {
    pf_test_utils::init_tracing();

    let opts = ExecOptions::default();
    let rc = execute_command_line("A=1 B=2", &env(&[]), &opts, None).await.unwrap();
    assert_eq!(rc, 0);
}

#[tokio::test]
async fn missing_program_is_an_execution_error() {
    pf_test_utils::init_tracing();

    let opts = ExecOptions::default();
    let err = execute_command_line(
        "definitely-not-a-real-program-xyz arg",
        &env(&[]),
        &opts,
        None,
    )
    .await
    .unwrap_err();

    match err {
        pf::errors::PfError::Execution { suggestion, .. } => {
            assert!(suggestion.unwrap().contains("command exists"));
        }
        other => panic!("expected Execution error, got: {other:?}"),
    }
}
