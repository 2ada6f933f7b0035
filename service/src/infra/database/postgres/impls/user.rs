//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::{self, Lookup},
};

use super::{visibility, ListStatements};

/// Columns of the `users` table making up a [`User`].
const COLUMNS: &str = "\
    id, name, login, password_hash, email, created_at, updated_at";

/// Decodes a [`User`] out of the provided [`Row`] of [`COLUMNS`].
fn user(row: Row) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        login: row.get("login"),
        password_hash: row.get("password_hash"),
        email: row.get("email"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Insert<user::Draft>> for Postgres<C>
where
    C: Connection,
{
    type Ok = User;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(draft): Insert<user::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let user::Draft {
            name,
            login,
            password_hash,
            email,
        } = draft;

        let sql = format!(
            "INSERT INTO users (name, login, password_hash, email) \
             VALUES ($1::VARCHAR, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR) \
             RETURNING {COLUMNS}",
        );
        self.query_opt(sql.as_str(), &[&name, &login, &password_hash, &email])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| user(row.expect("always exists")))
    }
}

impl<C> Database<Select<By<Option<User>, Lookup<user::Id>>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, Lookup<user::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Lookup { key: id, deletion } = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE id = $1::INT8{visibility}",
            visibility = visibility(deletion),
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(user))
    }
}

impl<'l, C> Database<Select<By<Option<User>, Lookup<&'l user::Login>>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, Lookup<&'l user::Login>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Lookup {
            key: login,
            deletion,
        } = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE login = $1::VARCHAR{visibility} \
             LIMIT 1",
            visibility = visibility(deletion),
        );
        Ok(self
            .query_opt(sql.as_str(), &[login])
            .await
            .map_err(tracerr::wrap!())?
            .map(user))
    }
}

impl<C> Database<Update<By<Option<User>, user::Revision>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(by): Update<By<Option<User>, user::Revision>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user::Revision {
            lookup: Lookup { key: id, deletion },
            name,
        } = by.into_inner();

        let sql = format!(
            "UPDATE users \
             SET name = $2::VARCHAR, \
                 updated_at = NOW() \
             WHERE id = $1::INT8{visibility} \
             RETURNING {COLUMNS}",
            visibility = visibility(deletion),
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id, &name])
            .await
            .map_err(tracerr::wrap!())?
            .map(user))
    }
}

impl<C> Database<Delete<By<User, Lookup<user::Id>>>> for Postgres<C>
where
    C: Connection,
{
    /// Indicator whether a [`User`] has been deleted.
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, Lookup<user::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Lookup { key: id, deletion } = by.into_inner();

        let sql = if deletion.hides_deleted() {
            "UPDATE users \
             SET deleted_at = NOW() \
             WHERE id = $1::INT8 \
               AND deleted_at IS NULL"
        } else {
            "DELETE FROM users \
             WHERE id = $1::INT8"
        };
        self.exec(sql, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|affected| affected > 0)
    }
}

impl<C> Database<Select<By<read::user::list::Page, read::user::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::user::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::user::list::Page, read::user::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::user::list::Selector {
            arguments,
            filter:
                read::user::list::Filter {
                    name_prefix,
                    created_at_order,
                },
        } = by.into_inner();

        ListStatements::new(
            "users",
            COLUMNS,
            "name",
            name_prefix.is_some(),
            created_at_order,
        )
        .execute(self, arguments, name_prefix.as_deref(), user)
        .await
        .map_err(tracerr::wrap!())
    }
}
