//! Match results.

/// Capture groups collected while evaluating a filter.
///
/// Groups appear in filter declaration order, then group order within each
/// pattern. A group that did not participate in the match is recorded as an
/// empty string so positions stay stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures(Vec<String>);

impl Captures {
    /// Create an empty capture list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append one group.
    pub fn push(&mut self, group: impl Into<String>) {
        self.0.push(group.into());
    }

    /// The group at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// All groups.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterate over the groups.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no group was captured. An empty list is still a match.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Take the groups out.
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl Extend<String> for Captures {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl From<Vec<String>> for Captures {
    fn from(groups: Vec<String>) -> Self {
        Self(groups)
    }
}

impl IntoIterator for Captures {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Outcome of evaluating one filter against one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// At least one pair failed.
    NoMatch,
    /// Every pair passed.
    Matched(Captures),
}

impl MatchResult {
    /// Whether the filter matched.
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched(_))
    }

    /// The captures, if the filter matched.
    pub fn captures(&self) -> Option<&Captures> {
        match self {
            MatchResult::Matched(captures) => Some(captures),
            MatchResult::NoMatch => None,
        }
    }

    /// Convert into the captures, if the filter matched.
    pub fn into_captures(self) -> Option<Captures> {
        match self {
            MatchResult::Matched(captures) => Some(captures),
            MatchResult::NoMatch => None,
        }
    }
}
