//! Postgres database client definitions.

use std::{future::Future, time::Duration};

use tokio::time;
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Non-transactional Postgres database client.
///
/// Every operation takes its own [`Connection`] from the [`connection::Pool`]
/// and is bounded by the configured timeout.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to take [`Connection`]s from.
    pub(crate) pool: connection::Pool,

    /// Maximum [`Duration`] of a single operation, including waiting for a
    /// free [`Connection`].
    timeout: Duration,
}

impl NonTx {
    /// Creates a new [`NonTx`] client from the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Takes a [`Connection`] from the [`connection::Pool`].
    async fn connection(
        &self,
    ) -> Result<connection::NonTx, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    /// Runs the provided `operation` failing if it doesn't complete in time.
    async fn bounded<T>(
        &self,
        operation: impl Future<Output = Result<T, Traced<database::Error>>>,
    ) -> Result<T, Traced<database::Error>> {
        time::timeout(self.timeout, operation)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?
    }
}

impl Connection for NonTx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.bounded(async {
            self.connection()
                .await
                .map_err(tracerr::wrap!())?
                .query(stmt, params)
                .await
                .map_err(tracerr::wrap!())
        })
        .await
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.bounded(async {
            self.connection()
                .await
                .map_err(tracerr::wrap!())?
                .query_opt(stmt, params)
                .await
                .map_err(tracerr::wrap!())
        })
        .await
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.bounded(async {
            self.connection()
                .await
                .map_err(tracerr::wrap!())?
                .exec(stmt, params)
                .await
                .map_err(tracerr::wrap!())
        })
        .await
    }
}
