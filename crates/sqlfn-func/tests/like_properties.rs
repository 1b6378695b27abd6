//! Property tests for `LIKE` compilation and matching.
//!
//! The iterative matcher is checked against a direct recursive reading of the
//! wildcard rules on small alphabets that include regex metacharacters, so
//! any accidental special-casing of `.`, `*`, `\`, `[` shows up as a
//! disagreement.

use proptest::prelude::*;
use sqlfn_func::{LikePattern, PatternToken, like, not_like};
use sqlfn_types::Value;

/// Plain recursive matcher over the raw pattern text, no compilation step.
fn reference_like(subject: &[char], pattern: &[char]) -> bool {
    match pattern.split_first() {
        None => subject.is_empty(),
        Some(('%', rest)) => (0..=subject.len()).any(|skip| reference_like(&subject[skip..], rest)),
        Some(('_', rest)) => !subject.is_empty() && reference_like(&subject[1..], rest),
        Some((c, rest)) => subject.first() == Some(c) && reference_like(&subject[1..], rest),
    }
}

fn subject_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(prop::sample::select(vec!['a', 'b', 'A', '.', '*', '\\']), 0..8)
        .prop_map(|chars| chars.into_iter().collect())
}

fn pattern_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop::sample::select(vec!['a', 'b', '%', '_', '.', '*', '\\', '[', ']']),
        0..8,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_matches_reference(subject in subject_strategy(), pattern in pattern_strategy()) {
        let s: Vec<char> = subject.chars().collect();
        let p: Vec<char> = pattern.chars().collect();
        prop_assert_eq!(
            LikePattern::compile(&pattern).matches(&subject),
            reference_like(&s, &p),
            "subject={:?} pattern={:?}", subject, pattern
        );
    }

    #[test]
    fn prop_percent_collapse_is_idempotent(subject in subject_strategy(), pattern in pattern_strategy()) {
        let doubled = pattern.replace('%', "%%");
        prop_assert_eq!(
            LikePattern::compile(&pattern).matches(&subject),
            LikePattern::compile(&doubled).matches(&subject)
        );
        prop_assert_eq!(LikePattern::compile(&pattern), LikePattern::compile(&doubled));
    }

    #[test]
    fn prop_wildcard_free_text_matches_only_itself(subject in subject_strategy(), other in subject_strategy()) {
        let p = LikePattern::compile(&subject);
        prop_assert!(p.matches(&subject));
        prop_assert_eq!(p.matches(&other), subject == other);
    }

    #[test]
    fn prop_literal_text_drops_only_wildcards(pattern in pattern_strategy()) {
        let expected: String = pattern.chars().filter(|c| *c != '%' && *c != '_').collect();
        prop_assert_eq!(LikePattern::compile(&pattern).literal_text(), expected);
    }

    #[test]
    fn prop_no_adjacent_any_run_tokens(pattern in pattern_strategy()) {
        let p = LikePattern::compile(&pattern);
        for pair in p.tokens().windows(2) {
            prop_assert!(!(pair[0] == PatternToken::AnyRun && pair[1] == PatternToken::AnyRun));
            let both_literal = matches!(pair[0], PatternToken::Literal(_))
                && matches!(pair[1], PatternToken::Literal(_));
            prop_assert!(!both_literal);
        }
    }

    #[test]
    fn prop_percent_prefix_suffix_is_contains(subject in subject_strategy(), needle in subject_strategy()) {
        let pattern = format!("%{needle}%");
        prop_assert_eq!(LikePattern::compile(&pattern).matches(&subject), subject.contains(&needle));
    }

    #[test]
    fn prop_not_like_is_strict_negation(subject in subject_strategy(), pattern in pattern_strategy()) {
        let s = Value::Text(subject);
        let p = Value::Text(pattern);
        let positive = like(&s, &p).unwrap().as_bool().unwrap();
        prop_assert_eq!(not_like(&s, &p).unwrap(), Value::Boolean(!positive));
    }

    #[test]
    fn prop_null_propagates(text in subject_strategy()) {
        let t = Value::Text(text);
        prop_assert!(like(&Value::Null, &t).unwrap().is_null());
        prop_assert!(like(&t, &Value::Null).unwrap().is_null());
        prop_assert!(not_like(&Value::Null, &t).unwrap().is_null());
        prop_assert!(not_like(&t, &Value::Null).unwrap().is_null());
    }

    #[test]
    fn prop_match_requires_min_len(subject in subject_strategy(), pattern in pattern_strategy()) {
        let p = LikePattern::compile(&pattern);
        if p.matches(&subject) {
            prop_assert!(subject.chars().count() >= p.min_len());
        }
    }
}
