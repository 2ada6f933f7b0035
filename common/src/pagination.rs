//! Abstractions for pagination.

use std::num::NonZeroU32;

/// A page of nodes along with the total count of nodes matching the filter.
#[derive(Clone, Debug)]
pub struct Page<N> {
    /// Nodes on this [`Page`].
    pub nodes: Vec<N>,

    /// Total number of nodes matching the filter, regardless of pagination.
    pub total_count: u64,
}

impl<N> Page<N> {
    /// Creates a new [`Page`] out of the provided `nodes`.
    #[must_use]
    pub fn new(nodes: impl IntoIterator<Item = N>, total_count: u64) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
            total_count,
        }
    }
}

/// Page-based pagination arguments.
///
/// Both the page number and the limit are guaranteed to be positive, so the
/// [`Arguments::offset()`] is always well-defined.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arguments {
    /// 1-based number of the requested page.
    page: NonZeroU32,

    /// Maximum number of nodes on the requested page.
    limit: NonZeroU32,
}

impl Arguments {
    /// Page requested when none is specified.
    pub const DEFAULT_PAGE: NonZeroU32 = NonZeroU32::MIN;

    /// Limit used when none is specified.
    pub const DEFAULT_LIMIT: NonZeroU32 = match NonZeroU32::new(10) {
        Some(l) => l,
        None => NonZeroU32::MIN,
    };

    /// Creates new [`Arguments`].
    ///
    /// Missing values fall back to [`Arguments::DEFAULT_PAGE`] and
    /// [`Arguments::DEFAULT_LIMIT`].
    ///
    /// [`None`] is returned if any of the provided values is not positive or
    /// doesn't fit.
    pub fn new<Num>(page: Option<Num>, limit: Option<Num>) -> Option<Self>
    where
        Num: TryInto<u32>,
    {
        let positive = |n: Num| n.try_into().ok().and_then(NonZeroU32::new);
        Some(Self {
            page: page.map_or(Some(Self::DEFAULT_PAGE), positive)?,
            limit: limit.map_or(Some(Self::DEFAULT_LIMIT), positive)?,
        })
    }

    /// Returns the 1-based number of the requested page.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.get()
    }

    /// Returns the maximum number of nodes on the requested page.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit.get()
    }

    /// Returns the number of nodes to skip before the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.get() - 1) * u64::from(self.limit.get())
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Pagination selector.
#[derive(Clone, Debug)]
pub struct Selector<F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Additional filter being applied to the result.
    pub filter: F,
}

/// Order of the nodes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Order {
    /// Ascending order.
    Ascending,

    /// Descending order.
    Descending,
}

impl Order {
    /// Interprets the provided direction `flag`:
    /// - zero means no explicit order;
    /// - positive means [`Order::Descending`];
    /// - negative means [`Order::Ascending`].
    #[must_use]
    pub const fn from_flag(flag: i64) -> Option<Self> {
        match flag {
            0 => None,
            1.. => Some(Self::Descending),
            _ => Some(Self::Ascending),
        }
    }

    #[cfg(feature = "postgres")]
    /// Returns SQL operator representing this [`Order`].
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $filter:ty) => {
        #[doc = "A [`Page`] of nodes."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$filter>;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Order, Page};

    #[test]
    fn defaults_missing_arguments() {
        let args = Arguments::new::<i64>(None, None).unwrap();

        assert_eq!(args.page(), 1);
        assert_eq!(args.limit(), 10);
        assert_eq!(args.offset(), 0);
        assert_eq!(args, Arguments::default());
    }

    #[test]
    fn computes_offset() {
        let args = Arguments::new(Some(3), Some(25)).unwrap();
        assert_eq!(args.offset(), 50);

        let args = Arguments::new(Some(1), Some(7)).unwrap();
        assert_eq!(args.offset(), 0);

        let args = Arguments::new(Some(u32::MAX), Some(u32::MAX)).unwrap();
        assert_eq!(
            args.offset(),
            u64::from(u32::MAX - 1) * u64::from(u32::MAX),
        );
    }

    #[test]
    fn rejects_non_positive_arguments() {
        assert!(Arguments::new(Some(0), Some(10)).is_none());
        assert!(Arguments::new(Some(1), Some(0)).is_none());
        assert!(Arguments::new(Some(-1), None).is_none());
        assert!(Arguments::new(None, Some(-5)).is_none());
        assert!(Arguments::new(Some(i64::MAX), None).is_none());
    }

    #[test]
    fn interprets_order_flag() {
        assert_eq!(Order::from_flag(0), None);
        assert_eq!(Order::from_flag(1), Some(Order::Descending));
        assert_eq!(Order::from_flag(42), Some(Order::Descending));
        assert_eq!(Order::from_flag(-1), Some(Order::Ascending));
        assert_eq!(Order::from_flag(i64::MIN), Some(Order::Ascending));
    }

    #[test]
    fn collects_page_nodes() {
        let page = Page::new((1..=3).map(|n| n * 2), 10);

        assert_eq!(page.nodes, [2, 4, 6]);
        assert_eq!(page.total_count, 10);
    }
}
