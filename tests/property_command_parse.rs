// tests/property_command_parse.rs

use proptest::prelude::*;

use pf::shell::parse_command_line;

// Strategy for valid environment variable identifiers.
fn env_key_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,10}"
}

// Values without quoting hazards, so the assignment survives tokenization
// as a single token.
fn env_value_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_./:-]{0,12}"
}

// Simple command words that are never mistaken for assignments or options.
fn command_word_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,8}"
}

proptest! {
    #[test]
    fn env_prefix_round_trips_exactly(
        pairs in proptest::collection::vec((env_key_strategy(), env_value_strategy()), 0..5),
        words in proptest::collection::vec(command_word_strategy(), 1..5),
    ) {
        // Deduplicate keys; repeated assignments would collapse in the map.
        let mut seen = std::collections::HashSet::new();
        let pairs: Vec<_> = pairs
            .into_iter()
            .filter(|(k, _)| seen.insert(k.clone()))
            .collect();

        let prefix = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ");
        let command = words.join(" ");
        let line = if prefix.is_empty() {
            command.clone()
        } else {
            format!("{prefix} {command}")
        };

        let (env, remaining) = parse_command_line(&line).unwrap();

        prop_assert_eq!(env.len(), pairs.len());
        for (k, v) in &pairs {
            prop_assert_eq!(env.get(k.as_str()).map(String::as_str), Some(v.as_str()));
        }
        prop_assert_eq!(remaining, command);
    }

    #[test]
    fn parsing_never_panics_on_arbitrary_input(line in ".{0,80}") {
        // Any outcome is fine; the parser must only ever return Ok or a
        // typed error.
        let _ = parse_command_line(&line);
    }

    #[test]
    fn requoted_remainder_tokenizes_back_to_the_same_words(
        words in proptest::collection::vec("[a-z ]{1,10}", 1..4),
    ) {
        // Build a command whose words need quoting, starting with a fixed
        // program name so no word is taken for an assignment.
        let mut tokens = vec!["prog".to_string()];
        tokens.extend(words);

        let line = shell_words::join(tokens.iter().map(String::as_str));
        let (env, remaining) = parse_command_line(&line).unwrap();

        prop_assert!(env.is_empty());
        let reparsed = shell_words::split(&remaining).unwrap();
        prop_assert_eq!(reparsed, tokens);
    }
}
