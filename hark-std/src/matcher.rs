//! Filter evaluation.
//!
//! [`evaluate`] checks a [`Filter`] against an [`Event`] pair by pair, in
//! declaration order, and stops at the first failing pair. It has no side
//! effects: the same inputs always give the same [`MatchResult`].

use hark_core::{
    CHANNEL_FIELD, Captures, Directory, Event, Expect, Filter, MatchResult, USER_FIELD, field,
};

/// Evaluate `filter` against `event`, translating user and channel names
/// through `directory`.
///
/// # Example
///
/// ```rust
/// use hark_core::{Directory, Entity, Event, Filter};
/// use hark_std::matcher::evaluate;
/// use regex::Regex;
///
/// let directory = Directory::new(vec![Entity::new("n0", "neil")], vec![]);
/// let event = Event::decode(r#"{"user":"n0","file":{"name":"foo nope bar"}}"#).unwrap();
/// let filter = Filter::new()
///     .field("user", "@neil")
///     .field("filename", Regex::new("n(.*)e").unwrap());
///
/// let captures = evaluate(&filter, &event, &directory).into_captures().unwrap();
/// assert_eq!(captures.as_slice(), ["op"]);
/// ```
pub fn evaluate(filter: &Filter, event: &Event, directory: &Directory) -> MatchResult {
    let mut captures = Captures::new();
    for (name, expect) in filter.iter() {
        if !check(name, expect, event, directory, &mut captures) {
            return MatchResult::NoMatch;
        }
    }
    MatchResult::Matched(captures)
}

fn check(
    name: &str,
    expect: &Expect,
    event: &Event,
    directory: &Directory,
    captures: &mut Captures,
) -> bool {
    let Some(actual) = field::resolve_present(event, name) else {
        return false;
    };

    match expect {
        Expect::Present => true,
        Expect::Unsatisfiable => false,
        Expect::Exact(expected) => match translate(name, expected, directory) {
            Some(expected) => actual.as_str() == Some(expected),
            None => false,
        },
        Expect::Pattern(pattern) => {
            let Some(text) = actual.as_str() else {
                return false;
            };
            let Some(groups) = pattern.captures(text) else {
                return false;
            };
            captures.extend(
                groups
                    .iter()
                    .skip(1)
                    .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string())),
            );
            true
        }
    }
}

/// Replace a user or channel name with its id. Other fields pass through.
fn translate<'a>(name: &str, expected: &'a str, directory: &'a Directory) -> Option<&'a str> {
    match name {
        USER_FIELD => directory.resolve_user(expected),
        CHANNEL_FIELD => directory.resolve_channel(expected),
        _ => Some(expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{directory, event};
    use regex::Regex;
    use serde_json::json;

    fn captures(result: MatchResult) -> Vec<String> {
        result.into_captures().expect("expected a match").into_vec()
    }

    #[test]
    fn test_exact_match_is_exact() {
        let filter = Filter::new().field("text", "cool");
        let dir = directory();
        assert!(evaluate(&filter, &event(json!({"text": "cool"})), &dir).is_match());
        assert!(!evaluate(&filter, &event(json!({"text": "cool story"})), &dir).is_match());
        assert!(!evaluate(&filter, &event(json!({"type": "message"})), &dir).is_match());
    }

    #[test]
    fn test_pattern_on_filename_alias() {
        let filter = Filter::new().field("filename", Regex::new("n(.*)e").unwrap());
        let ev = event(json!({"file": {"name": "foo nope bar"}}));
        assert_eq!(captures(evaluate(&filter, &ev, &directory())), ["op"]);
    }

    #[test]
    fn test_pattern_without_groups_matches_with_empty_captures() {
        let filter = Filter::new().field("text", Regex::new("^deploy").unwrap());
        let ev = event(json!({"text": "deploy now"}));
        assert_eq!(
            evaluate(&filter, &ev, &directory()),
            MatchResult::Matched(Captures::new())
        );
    }

    #[test]
    fn test_unmatched_optional_group_is_empty() {
        let filter = Filter::new().field("text", Regex::new("^(a)?(b)$").unwrap());
        let ev = event(json!({"text": "b"}));
        assert_eq!(captures(evaluate(&filter, &ev, &directory())), ["", "b"]);
    }

    #[test]
    fn test_pattern_requires_string_value() {
        let filter = Filter::new().field("ts", Regex::new("1").unwrap());
        let ev = event(json!({"ts": 1}));
        assert!(!evaluate(&filter, &ev, &directory()).is_match());
    }

    #[test]
    fn test_user_name_translation() {
        let ev = event(json!({"user": "n0"}));
        let dir = directory();
        assert!(evaluate(&Filter::new().field("user", "neil"), &ev, &dir).is_match());
        assert!(evaluate(&Filter::new().field("user", "@neil"), &ev, &dir).is_match());
        // "n0" is not id-shaped, so it is looked up as a name and misses.
        assert!(!evaluate(&Filter::new().field("user", "n0"), &ev, &dir).is_match());
    }

    #[test]
    fn test_user_id_is_not_translated() {
        let ev = event(json!({"user": "U100"}));
        let filter = Filter::new().field("user", "U100");
        assert!(evaluate(&filter, &ev, &directory()).is_match());
    }

    #[test]
    fn test_unknown_name_never_matches() {
        let ev = event(json!({"user": "n0", "channel": "CG0"}));
        let dir = directory();
        assert!(!evaluate(&Filter::new().field("user", "@ghost"), &ev, &dir).is_match());
        assert!(!evaluate(&Filter::new().field("channel", "#ghost"), &ev, &dir).is_match());
    }

    #[test]
    fn test_multi_field() {
        let filter = Filter::new()
            .field("text", "sick")
            .field("channel", "#general");
        let dir = directory();
        let matches = |value| evaluate(&filter, &event(value), &dir).is_match();
        assert!(matches(json!({"text": "sick", "channel": "CG0"})));
        assert!(!matches(json!({"text": "sick", "channel": "OTHER"})));
        assert!(!matches(json!({"text": "meh", "channel": "CG0"})));
    }

    #[test]
    fn test_presence_check() {
        let filter = Filter::new().field("file", true);
        let dir = directory();
        assert!(evaluate(&filter, &event(json!({"file": {"name": "a.txt"}})), &dir).is_match());
        assert!(evaluate(&filter, &event(json!({"file": "a.txt"})), &dir).is_match());
        assert!(!evaluate(&filter, &event(json!({"text": "no file"})), &dir).is_match());
        assert!(!evaluate(&filter, &event(json!({"file": null})), &dir).is_match());
        assert!(!evaluate(&filter, &event(json!({"file": ""})), &dir).is_match());
    }

    #[test]
    fn test_false_never_matches() {
        let filter = Filter::new().field("file", false);
        let dir = directory();
        assert!(!evaluate(&filter, &event(json!({"file": {"name": "a"}})), &dir).is_match());
        assert!(!evaluate(&filter, &event(json!({})), &dir).is_match());
    }

    #[test]
    fn test_captures_follow_declaration_order() {
        let filter = Filter::new()
            .field("text", Regex::new(r"^(\w+) (\w+)$").unwrap())
            .field("filename", Regex::new(r"\.(\w+)$").unwrap());
        let ev = event(json!({"text": "ship it", "file": {"name": "build.tar"}}));
        assert_eq!(
            captures(evaluate(&filter, &ev, &directory())),
            ["ship", "it", "tar"]
        );
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let ev = event(json!({"type": "hello"}));
        assert!(evaluate(&Filter::new(), &ev, &directory()).is_match());
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let filter = Filter::new()
            .field("user", "neil")
            .field("text", Regex::new("(o+)").unwrap());
        let ev = event(json!({"user": "n0", "text": "foo"}));
        let dir = directory();
        let first = evaluate(&filter, &ev, &dir);
        let second = evaluate(&filter, &ev, &dir);
        assert_eq!(first, second);
        assert_eq!(captures(first), ["oo"]);
    }
}
