//! [`Database`] implementations.

#![allow(
    clippy::items_after_statements,
    reason = "`const SQL` after statements"
)]

mod field;
mod product;
mod user;

use async_trait::async_trait;
use common::pagination::{self, Order};
use itertools::Itertools as _;
use postgres_types::ToSql;
use refinery_core::{
    traits::r#async::{AsyncQuery, AsyncTransaction},
    AsyncMigrate, Migration,
};
use tokio_postgres::Row;
use tracerr::Traced;

#[cfg(doc)]
use crate::infra::Database;
use crate::{
    domain::DeletionMode,
    infra::{
        database::{
            self,
            postgres::{Connection, PrefixPattern},
        },
        postgres,
    },
};

use super::Postgres;

/// Parameterized statements listing a page of non-deleted table rows.
///
/// Both statements share the same predicates, so the count always reflects
/// exactly the rows the page is taken from.
#[derive(Debug, Eq, PartialEq)]
struct ListStatements {
    /// Statement counting all the matching rows.
    ///
    /// Binds the name pattern as `$1`, if any.
    count: String,

    /// Statement fetching a single page of the matching rows.
    ///
    /// Binds the limit as `$1`, the offset as `$2` and the name pattern as
    /// `$3`, if any.
    page: String,
}

impl ListStatements {
    /// Builds new [`ListStatements`] over the provided `table`.
    ///
    /// If `by_name` is `true`, rows are matched by their `name_column`
    /// against a [`PrefixPattern`].
    fn new(
        table: &str,
        columns: &str,
        name_column: &str,
        by_name: bool,
        order: Option<Order>,
    ) -> Self {
        let name_filtering = |idx: usize| {
            by_name.then_some(idx).into_iter().format_with("", move |idx, f| {
                f(&format_args!(" AND {name_column} ILIKE ${idx}::VARCHAR"))
            })
        };

        let count = format!(
            "SELECT COUNT(*) \
             FROM {table} \
             WHERE deleted_at IS NULL{name_filtering}",
            name_filtering = name_filtering(1),
        );
        let page = format!(
            "SELECT {columns} \
             FROM {table} \
             WHERE deleted_at IS NULL{name_filtering}{ordering} \
             LIMIT $1::INT8 OFFSET $2::INT8",
            name_filtering = name_filtering(3),
            ordering = order.into_iter().format_with("", |order, f| {
                f(&format_args!(" ORDER BY created_at {}", order.sql()))
            }),
        );

        Self { count, page }
    }

    /// Executes these [`ListStatements`] with the provided pagination
    /// `arguments` and name `prefix`, mapping the fetched rows into nodes.
    ///
    /// The count goes first, and the page isn't fetched if it fails.
    async fn execute<C, N>(
        &self,
        db: &Postgres<C>,
        arguments: pagination::Arguments,
        prefix: Option<&str>,
        node: impl FnMut(Row) -> N,
    ) -> Result<pagination::Page<N>, Traced<database::Error>>
    where
        C: Connection,
    {
        let pattern = prefix.map(PrefixPattern::new);

        let mut ps: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(1);
        if let Some(p) = &pattern {
            ps.push(p);
        }
        let total_count = db
            .query_opt(self.count.as_str(), ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .map_or(0, |row| {
                u64::try_from(row.get::<_, i64>(0)).unwrap_or_default()
            });

        let limit = i64::from(arguments.limit());
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);
        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &offset];
        if let Some(p) = &pattern {
            ps.push(p);
        }
        let rows = db
            .query(self.page.as_str(), ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        Ok(pagination::Page::new(rows.into_iter().map(node), total_count))
    }
}

/// Returns the SQL predicate hiding deleted rows, if the provided
/// [`DeletionMode`] requires so.
const fn visibility(deletion: DeletionMode) -> &'static str {
    if deletion.hides_deleted() {
        " AND deleted_at IS NULL"
    } else {
        ""
    }
}

#[async_trait]
impl AsyncTransaction for Postgres {
    type Error = Traced<database::Error>;

    async fn execute(
        &mut self,
        queries: &[&str],
    ) -> Result<usize, Self::Error> {
        let mut conn = self
            .0
            .pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        AsyncTransaction::execute(&mut **conn, queries)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

#[async_trait]
impl AsyncQuery<Vec<Migration>> for Postgres {
    async fn query(
        &mut self,
        query: &str,
    ) -> Result<Vec<Migration>, <Self as AsyncTransaction>::Error> {
        let mut conn = self
            .0
            .pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        AsyncQuery::query(&mut **conn, query)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl AsyncMigrate for Postgres {}
