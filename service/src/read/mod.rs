//! Read entities definitions.

pub mod product;
pub mod user;

use crate::domain::DeletionMode;

/// Lookup of a single entity by the provided `key`.
#[derive(Clone, Copy, Debug)]
pub struct Lookup<K> {
    /// Key identifying the entity.
    pub key: K,

    /// [`DeletionMode`] the entity is looked up with.
    pub deletion: DeletionMode,
}

/// Normalizes the provided search term into a name prefix.
///
/// [`None`] is returned if the term is blank.
#[must_use]
pub fn name_prefix(search: &str) -> Option<String> {
    let search = search.trim();
    (!search.is_empty()).then(|| search.to_owned())
}

#[cfg(test)]
mod spec {
    use super::name_prefix;

    #[test]
    fn normalizes_name_prefix() {
        assert_eq!(name_prefix("Wid"), Some("Wid".to_owned()));
        assert_eq!(name_prefix("  Wid \t"), Some("Wid".to_owned()));
        assert_eq!(name_prefix("blue widget"), Some("blue widget".to_owned()));
        assert_eq!(name_prefix(""), None);
        assert_eq!(name_prefix(" \n "), None);
    }
}
