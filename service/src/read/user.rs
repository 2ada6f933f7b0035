//! [`User`] read model definition.
//!
//! [`User`]: crate::domain::User

pub mod list {
    //! [`User`]s list definitions.

    use common::{define_pagination, pagination::Order};

    use crate::domain::User;

    define_pagination!(User, Filter);

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// Case-insensitive prefix of a [`User`] name to search for.
        pub name_prefix: Option<String>,

        /// [`Order`] of [`User`]s by their creation time, if any.
        pub created_at_order: Option<Order>,
    }
}
