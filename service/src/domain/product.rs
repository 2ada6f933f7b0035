//! [`Product`] definitions.

use std::str::FromStr;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

use crate::read::Lookup;

/// Product offered by the platform.
#[derive(Clone, Debug)]
pub struct Product {
    /// ID of this [`Product`].
    pub id: Id,

    /// [`Name`] of this [`Product`].
    pub name: Name,

    /// [`DateTime`] when this [`Product`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Product`] was modified the last time.
    pub updated_at: ModificationDateTime,
}

/// ID of a [`Product`].
///
/// Assigned by the database on insertion and never reused.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i64);

/// Name of a [`Product`].
#[derive(AsRef, Clone, Debug, Display, Eq, Into, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Data of a [`Product`] to be created.
#[derive(Clone, Debug)]
pub struct Draft {
    /// [`Name`] of a new [`Product`].
    pub name: Name,
}

/// Changes to be applied to an existing [`Product`].
#[derive(Clone, Debug)]
pub struct Revision {
    /// [`Lookup`] of the [`Product`] to change.
    pub lookup: Lookup<Id>,

    /// New [`Name`] of the [`Product`].
    pub name: Name,
}

/// [`DateTime`] when a [`Product`] was created.
pub type CreationDateTime = DateTimeOf<(Product, unit::Creation)>;

/// [`DateTime`] when a [`Product`] was modified the last time.
pub type ModificationDateTime = DateTimeOf<(Product, unit::Modification)>;

#[cfg(test)]
mod spec {
    use super::Name;

    #[test]
    fn validates_name() {
        assert!(Name::new("Widget").is_some());
        assert!(Name::new("Blue widget 2000").is_some());
        assert!(Name::new("x".repeat(512)).is_some());

        assert!(Name::new("").is_none());
        assert!(Name::new(" Widget").is_none());
        assert!(Name::new("Widget\n").is_none());
        assert!(Name::new("x".repeat(513)).is_none());
    }

    #[test]
    fn parses_name() {
        let name = "Widget".parse::<Name>().unwrap();

        assert_eq!(AsRef::<str>::as_ref(&name), "Widget");
        assert!("  ".parse::<Name>().is_err());
    }
}
