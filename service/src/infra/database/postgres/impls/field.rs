//! Generic [`Field`]-related [`Database`] implementations.

use common::operations::{By, Select, Update};
use postgres_types::ToSql;
use tracerr::Traced;

use crate::{
    domain::{
        field::{Probe, SingleField},
        Field,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::Lookup,
};

use super::visibility;

impl<C, F> Database<Update<SingleField<F>>> for Postgres<C>
where
    C: Connection,
    F: Field<Id: ToSql + Sync, Value: ToSql + Sync>,
{
    /// Indicator whether a row has been updated.
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(field): Update<SingleField<F>>,
    ) -> Result<Self::Ok, Self::Err> {
        let SingleField {
            lookup: Lookup { key: id, deletion },
            value,
        } = field;

        let sql = format!(
            "UPDATE {table} \
             SET {column} = $2, \
                 updated_at = NOW() \
             WHERE id = $1{visibility}",
            table = F::TABLE,
            column = F::COLUMN,
            visibility = visibility(deletion),
        );
        self.exec(sql.as_str(), &[&id, &value])
            .await
            .map_err(tracerr::wrap!())
            .map(|affected| affected > 0)
    }
}

impl<C, F> Database<Select<By<bool, Probe<F>>>> for Postgres<C>
where
    C: Connection,
    F: Field<Value: ToSql + Sync>,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<bool, Probe<F>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Probe { value } = by.into_inner();

        let sql = format!(
            "SELECT 1 \
             FROM {table} \
             WHERE {column} = $1 \
             LIMIT 1",
            table = F::TABLE,
            column = F::COLUMN,
        );
        self.query_opt(sql.as_str(), &[&value])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.is_some())
    }
}
