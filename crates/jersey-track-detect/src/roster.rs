use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Set of jersey numbers considered valid for the active team.
///
/// An empty filter accepts every number.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RosterFilter {
    numbers: BTreeSet<String>,
}

impl RosterFilter {
    pub fn new<I, S>(numbers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            numbers: numbers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn contains(&self, number: &str) -> bool {
        self.numbers.contains(number)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.numbers.iter().map(String::as_str)
    }

    /// Map a recognized number onto the roster.
    ///
    /// Returns the number itself when the filter is empty or contains it.
    /// `"0"` and `"00"` are read interchangeably, so either resolves to the
    /// spelling the roster uses. Anything else is rejected.
    pub fn resolve(&self, number: &str) -> Option<String> {
        if self.is_empty() || self.contains(number) {
            return Some(number.to_string());
        }
        let alias = match number {
            "0" => "00",
            "00" => "0",
            _ => return None,
        };
        self.contains(alias).then(|| alias.to_string())
    }
}

impl<S: Into<String>> FromIterator<S> for RosterFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_accepts_everything() {
        let roster = RosterFilter::default();
        assert_eq!(roster.resolve("23").as_deref(), Some("23"));
    }

    #[test]
    fn rejects_numbers_off_roster() {
        let roster = RosterFilter::new(["7", "10"]);
        assert_eq!(roster.resolve("23"), None);
        assert_eq!(roster.resolve("10").as_deref(), Some("10"));
    }

    #[test]
    fn zero_and_double_zero_alias() {
        let roster: RosterFilter = ["00", "4"].into_iter().collect();
        assert_eq!(roster.resolve("0").as_deref(), Some("00"));

        let roster = RosterFilter::new(["0"]);
        assert_eq!(roster.resolve("00").as_deref(), Some("0"));
        assert_eq!(roster.resolve("000"), None);
    }

    #[test]
    fn serializes_as_plain_list() {
        let roster = RosterFilter::new(["10", "7"]);
        let json = serde_json::to_string(&roster).expect("serialize");
        assert_eq!(json, r#"["10","7"]"#);
        assert_eq!(
            serde_json::from_str::<RosterFilter>(&json).expect("deserialize"),
            roster
        );
    }
}
