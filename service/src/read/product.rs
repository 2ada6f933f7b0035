//! [`Product`] read model definition.
//!
//! [`Product`]: crate::domain::Product

pub mod list {
    //! [`Product`]s list definitions.

    use common::{define_pagination, pagination::Order};

    use crate::domain::Product;

    define_pagination!(Product, Filter);

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// Case-insensitive prefix of a [`Product`] name to search for.
        pub name_prefix: Option<String>,

        /// [`Order`] of [`Product`]s by their creation time, if any.
        pub created_at_order: Option<Order>,
    }
}
