//! Domain definitions.

pub mod field;
pub mod product;
pub mod user;

pub use self::{field::Field, product::Product, user::User};

/// Strategy of removing entities.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum DeletionMode {
    /// Entities are removed permanently, and lookups by ID don't check the
    /// deletion marker.
    #[default]
    Hard,

    /// Entities are marked as deleted and become invisible to every lookup.
    Soft,
}

impl DeletionMode {
    /// Indicates whether entities marked as deleted must be skipped by
    /// lookups.
    #[must_use]
    pub const fn hides_deleted(self) -> bool {
        matches!(self, Self::Soft)
    }
}
