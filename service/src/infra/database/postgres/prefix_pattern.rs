//! [`PrefixPattern`] definition.

use derive_more::Display;
use postgres_types::{FromSql, ToSql};

/// `LIKE` pattern matching strings starting with a literal prefix.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct PrefixPattern(String);

impl PrefixPattern {
    /// Creates a new [`PrefixPattern`] out of the given `prefix`.
    ///
    /// `LIKE` metacharacters of the `prefix` are escaped, so they match
    /// themselves only.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        let mut pattern = String::with_capacity(prefix.len() + 1);
        for c in prefix.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        Self(pattern)
    }
}

#[cfg(test)]
mod spec {
    use super::PrefixPattern;

    #[test]
    fn appends_wildcard() {
        assert_eq!(PrefixPattern::new("Wid").to_string(), "Wid%");
        assert_eq!(PrefixPattern::new("blue wid").to_string(), "blue wid%");
        assert_eq!(PrefixPattern::new("").to_string(), "%");
    }

    #[test]
    fn escapes_metacharacters() {
        assert_eq!(PrefixPattern::new("50%").to_string(), r"50\%%");
        assert_eq!(PrefixPattern::new("a_b").to_string(), r"a\_b%");
        assert_eq!(PrefixPattern::new(r"C:\dir").to_string(), r"C:\\dir%");
        assert_eq!(PrefixPattern::new(r"%_\").to_string(), r"\%\_\\%");
    }
}
