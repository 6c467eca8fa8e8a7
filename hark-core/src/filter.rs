//! Declarative event filters.
//!
//! A [`Filter`] is an ordered list of `(field, expectation)` pairs. Pairs are
//! checked in declaration order and the first failing pair ends evaluation,
//! so the order also decides the order of the collected captures.
//!
//! # Expectations
//!
//! | [`Expect`] | built from | passes when |
//! |---|---|---|
//! | `Exact` | `&str`, `String` | the field equals the string |
//! | `Pattern` | `Regex` | the field contains a match |
//! | `Present` | `true` | the field is present |
//! | `Unsatisfiable` | `false` | never |
//!
//! Exact strings given for the `user` and `channel` fields are translated
//! through the directory first, so `"@neil"` or `"#general"` can be written
//! in place of ids.

use crate::error::{FilterError, json_kind};
use regex::Regex;
use serde_json::Value;

/// Field whose exact expectations are resolved as user names.
pub const USER_FIELD: &str = "user";

/// Field whose exact expectations are resolved as channel names.
pub const CHANNEL_FIELD: &str = "channel";

/// What a filter expects of one field.
#[derive(Debug, Clone)]
pub enum Expect {
    /// The field must equal this string.
    Exact(String),
    /// The field must contain a match; capture groups are collected.
    Pattern(Regex),
    /// The field only needs to be present.
    Present,
    /// No value satisfies this expectation.
    Unsatisfiable,
}

impl Expect {
    /// Compile a pattern expectation.
    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Expect::Pattern)
    }
}

impl PartialEq for Expect {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expect::Exact(a), Expect::Exact(b)) => a == b,
            (Expect::Pattern(a), Expect::Pattern(b)) => a.as_str() == b.as_str(),
            (Expect::Present, Expect::Present) => true,
            (Expect::Unsatisfiable, Expect::Unsatisfiable) => true,
            _ => false,
        }
    }
}

impl From<&str> for Expect {
    fn from(value: &str) -> Self {
        Expect::Exact(value.to_string())
    }
}

impl From<String> for Expect {
    fn from(value: String) -> Self {
        Expect::Exact(value)
    }
}

impl From<Regex> for Expect {
    fn from(value: Regex) -> Self {
        Expect::Pattern(value)
    }
}

impl From<&Regex> for Expect {
    fn from(value: &Regex) -> Self {
        Expect::Pattern(value.clone())
    }
}

impl From<bool> for Expect {
    fn from(value: bool) -> Self {
        if value {
            Expect::Present
        } else {
            Expect::Unsatisfiable
        }
    }
}

/// An ordered set of field expectations.
///
/// An empty filter matches every event.
///
/// # Example
///
/// ```rust
/// use hark_core::{Expect, Filter};
/// use regex::Regex;
///
/// let filter = Filter::new()
///     .field("channel", "#general")
///     .field("text", Regex::new(r"^deploy (\w+)$").unwrap())
///     .field("file", true);
///
/// assert_eq!(filter.len(), 3);
/// assert_eq!(filter.get("file"), Some(&Expect::Present));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pairs: Vec<(String, Expect)>,
}

impl Filter {
    /// Create an empty filter, which matches every event.
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append an expectation for `field`.
    pub fn field(mut self, field: impl Into<String>, expect: impl Into<Expect>) -> Self {
        self.pairs.push((field.into(), expect.into()));
        self
    }

    /// Append a pattern expectation compiled from `source`.
    pub fn pattern(self, field: impl Into<String>, source: &str) -> Result<Self, FilterError> {
        let field = field.into();
        match Regex::new(source) {
            Ok(regex) => Ok(self.field(field, regex)),
            Err(source) => Err(FilterError::InvalidPattern { field, source }),
        }
    }

    /// Build a filter from a JSON object.
    ///
    /// Strings become exact expectations, booleans become presence checks
    /// (`false` never matches), and `{"pattern": "..."}` objects become
    /// pattern expectations. Key order is preserved.
    pub fn from_json(value: &Value) -> Result<Self, FilterError> {
        let Value::Object(entries) = value else {
            return Err(FilterError::NotAnObject(json_kind(value)));
        };

        let mut filter = Filter::new();
        for (field, expected) in entries {
            filter = match expected {
                Value::String(text) => filter.field(field.as_str(), text.as_str()),
                Value::Bool(flag) => filter.field(field.as_str(), *flag),
                Value::Object(spec) => match spec.get("pattern").and_then(Value::as_str) {
                    Some(source) => filter.pattern(field.as_str(), source)?,
                    None => {
                        return Err(FilterError::UnsupportedValue {
                            field: field.clone(),
                            kind: "object without a `pattern` string",
                        });
                    }
                },
                other => {
                    return Err(FilterError::UnsupportedValue {
                        field: field.clone(),
                        kind: json_kind(other),
                    });
                }
            };
        }
        Ok(filter)
    }

    /// Iterate over the pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expect)> {
        self.pairs
            .iter()
            .map(|(field, expect)| (field.as_str(), expect))
    }

    /// The first expectation declared for `field`.
    pub fn get(&self, field: &str) -> Option<&Expect> {
        self.pairs
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, expect)| expect)
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the filter has no pairs (and so matches everything).
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Filter
where
    K: Into<String>,
    V: Into<Expect>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Filter::new(), |filter, (field, expect)| filter.field(field, expect))
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Filter
where
    K: Into<String>,
    V: Into<Expect>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bool_conversions() {
        assert_eq!(Expect::from(true), Expect::Present);
        assert_eq!(Expect::from(false), Expect::Unsatisfiable);
    }

    #[test]
    fn test_array_conversion_keeps_order() {
        let filter = Filter::from([("text", "sick"), ("channel", "#general")]);
        let fields: Vec<_> = filter.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, ["text", "channel"]);
    }

    #[test]
    fn test_from_json() {
        let filter = Filter::from_json(&json!({
            "text": "cool",
            "file": true,
            "hidden": false,
            "filename": {"pattern": "n(.*)e"}
        }))
        .unwrap();

        let expected = Filter::new()
            .field("text", "cool")
            .field("file", true)
            .field("hidden", false)
            .pattern("filename", "n(.*)e")
            .unwrap();
        assert_eq!(filter, expected);
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            Filter::from_json(&json!(["text"])),
            Err(FilterError::NotAnObject("array"))
        ));
        assert!(matches!(
            Filter::from_json(&json!({"ts": 12})),
            Err(FilterError::UnsupportedValue { kind: "number", .. })
        ));
        assert!(matches!(
            Filter::from_json(&json!({"text": {"pattern": "("}})),
            Err(FilterError::InvalidPattern { .. })
        ));
        assert!(matches!(
            Filter::from_json(&json!({"text": {"regex": "a"}})),
            Err(FilterError::UnsupportedValue { .. })
        ));
    }

    #[test]
    fn test_empty_filter() {
        let filter = Filter::new();
        assert!(filter.is_empty());
        assert_eq!(filter.get("text"), None);
    }
}
