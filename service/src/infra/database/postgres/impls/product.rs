//! [`Product`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{product, Product},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::{self, Lookup},
};

use super::{visibility, ListStatements};

/// Columns of the `products` table making up a [`Product`].
const COLUMNS: &str = "id, product_name, created_at, updated_at";

/// Decodes a [`Product`] out of the provided [`Row`] of [`COLUMNS`].
fn product(row: Row) -> Product {
    Product {
        id: row.get("id"),
        name: row.get("product_name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Insert<product::Draft>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Product;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(draft): Insert<product::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let product::Draft { name } = draft;

        const SQL: &str = "\
            INSERT INTO products (product_name) \
            VALUES ($1::VARCHAR) \
            RETURNING id, product_name, created_at, updated_at";
        self.query_opt(SQL, &[&name])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| product(row.expect("always exists")))
    }
}

impl<C> Database<Select<By<Option<Product>, Lookup<product::Id>>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Product>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Product>, Lookup<product::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Lookup { key: id, deletion } = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM products \
             WHERE id = $1::INT8{visibility}",
            visibility = visibility(deletion),
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(product))
    }
}

impl<C> Database<Update<By<Option<Product>, product::Revision>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Product>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(by): Update<By<Option<Product>, product::Revision>>,
    ) -> Result<Self::Ok, Self::Err> {
        let product::Revision {
            lookup: Lookup { key: id, deletion },
            name,
        } = by.into_inner();

        let sql = format!(
            "UPDATE products \
             SET product_name = $2::VARCHAR, \
                 updated_at = NOW() \
             WHERE id = $1::INT8{visibility} \
             RETURNING {COLUMNS}",
            visibility = visibility(deletion),
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id, &name])
            .await
            .map_err(tracerr::wrap!())?
            .map(product))
    }
}

impl<C> Database<Delete<By<Product, Lookup<product::Id>>>> for Postgres<C>
where
    C: Connection,
{
    /// Indicator whether a [`Product`] has been deleted.
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Product, Lookup<product::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Lookup { key: id, deletion } = by.into_inner();

        let sql = if deletion.hides_deleted() {
            "UPDATE products \
             SET deleted_at = NOW() \
             WHERE id = $1::INT8 \
               AND deleted_at IS NULL"
        } else {
            "DELETE FROM products \
             WHERE id = $1::INT8"
        };
        self.exec(sql, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|affected| affected > 0)
    }
}

impl<C>
    Database<
        Select<By<read::product::list::Page, read::product::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::product::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::product::list::Page, read::product::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::product::list::Selector {
            arguments,
            filter:
                read::product::list::Filter {
                    name_prefix,
                    created_at_order,
                },
        } = by.into_inner();

        ListStatements::new(
            "products",
            COLUMNS,
            "product_name",
            name_prefix.is_some(),
            created_at_order,
        )
        .execute(self, arguments, name_prefix.as_deref(), product)
        .await
        .map_err(tracerr::wrap!())
    }
}
