//! In-memory [`Database`] for testing handlers without Postgres.

use std::{
    cmp::Reverse,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use common::{
    operations::{By, Delete, Insert, Select, Update},
    pagination::{Order, Page},
    DateTime,
};
use service::{
    domain::{
        field::{Probe, SingleField},
        product, user, DeletionMode, Product, User,
    },
    infra::{database, Database},
    read::{self, Lookup},
};
use tracerr::Traced;

/// Row stored in a [`MockDb`] along with its deletion marker.
#[derive(Clone, Debug)]
struct Row<T> {
    /// Stored entity.
    entity: T,

    /// Indicator whether the entity is marked as deleted.
    deleted: bool,
}

/// Contents of a [`MockDb`].
#[derive(Debug, Default)]
struct State {
    /// Stored [`Product`]s.
    products: Vec<Row<Product>>,

    /// Stored [`User`]s.
    users: Vec<Row<User>>,

    /// Last assigned ID.
    last_id: i64,

    /// Number of performed writes, used to spread creation times.
    writes: u64,
}

impl State {
    /// Returns the next ID and the current time for a new row.
    ///
    /// Every row is created one second after the previous one, so ordering by
    /// the creation time is deterministic.
    fn next(&mut self) -> (i64, DateTime) {
        self.last_id += 1;
        self.writes += 1;
        (
            self.last_id,
            DateTime::now() + Duration::from_secs(self.writes),
        )
    }
}

/// In-memory [`Database`] mirroring the Postgres semantics.
#[derive(Clone, Debug, Default)]
pub(crate) struct MockDb(Arc<Mutex<State>>);

impl MockDb {
    /// Locks the [`State`] of this [`MockDb`].
    fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Indicates whether the `row` is visible to a lookup in the provided
/// [`DeletionMode`].
fn visible<T>(row: &Row<T>, deletion: DeletionMode) -> bool {
    !(row.deleted && deletion.hides_deleted())
}

/// Selects a page of non-deleted entities, mimicking the SQL list statements.
///
/// Case folding of the name prefix is ASCII-only, the same as `ILIKE` does
/// under the `C` collation.
fn list<T: Clone>(
    rows: &[Row<T>],
    name: impl Fn(&T) -> &str,
    created_at: impl Fn(&T) -> DateTime,
    arguments: common::pagination::Arguments,
    name_prefix: Option<&str>,
    order: Option<Order>,
) -> Page<T> {
    let prefix = name_prefix.map(str::to_ascii_lowercase);
    let mut matched = rows
        .iter()
        .filter(|r| !r.deleted)
        .map(|r| &r.entity)
        .filter(|e| {
            prefix
                .as_ref()
                .map_or(true, |p| name(e).to_ascii_lowercase().starts_with(p))
        })
        .cloned()
        .collect::<Vec<_>>();
    match order {
        Some(Order::Ascending) => matched.sort_by_key(|e| created_at(e)),
        Some(Order::Descending) => {
            matched.sort_by_key(|e| Reverse(created_at(e)));
        }
        None => {}
    }

    let total_count = matched.len() as u64;
    let offset = usize::try_from(arguments.offset()).unwrap_or(usize::MAX);
    let limit = arguments.limit() as usize;
    Page::new(matched.into_iter().skip(offset).take(limit), total_count)
}

impl Database<Insert<product::Draft>> for MockDb {
    type Ok = Product;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(draft): Insert<product::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        let (id, now) = state.next();
        let product = Product {
            id: id.into(),
            name: draft.name,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };
        state.products.push(Row {
            entity: product.clone(),
            deleted: false,
        });
        Ok(product)
    }
}

impl Database<Select<By<Option<Product>, Lookup<product::Id>>>> for MockDb {
    type Ok = Option<Product>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Product>, Lookup<product::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Lookup { key, deletion } = by.into_inner();
        Ok(self
            .state()
            .products
            .iter()
            .find(|r| r.entity.id == key && visible(r, deletion))
            .map(|r| r.entity.clone()))
    }
}

impl Database<Update<By<Option<Product>, product::Revision>>> for MockDb {
    type Ok = Option<Product>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(by): Update<By<Option<Product>, product::Revision>>,
    ) -> Result<Self::Ok, Self::Err> {
        let product::Revision {
            lookup: Lookup { key, deletion },
            name,
        } = by.into_inner();

        let mut state = self.state();
        let (_, now) = state.next();
        Ok(state
            .products
            .iter_mut()
            .find(|r| r.entity.id == key && visible(r, deletion))
            .map(|r| {
                r.entity.name = name;
                r.entity.updated_at = now.coerce();
                r.entity.clone()
            }))
    }
}

impl Database<Delete<By<Product, Lookup<product::Id>>>> for MockDb {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Product, Lookup<product::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Lookup { key, deletion } = by.into_inner();

        let mut state = self.state();
        let Some(pos) = state
            .products
            .iter()
            .position(|r| r.entity.id == key && !r.deleted)
        else {
            return Ok(false);
        };
        if deletion.hides_deleted() {
            state.products[pos].deleted = true;
        } else {
            drop(state.products.remove(pos));
        }
        Ok(true)
    }
}

impl
    Database<
        Select<By<read::product::list::Page, read::product::list::Selector>>,
    > for MockDb
{
    type Ok = read::product::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::product::list::Page, read::product::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::product::list::Selector { arguments, filter } =
            by.into_inner();
        Ok(list(
            &self.state().products,
            |p| p.name.as_ref(),
            |p| p.created_at.coerce(),
            arguments,
            filter.name_prefix.as_deref(),
            filter.created_at_order,
        ))
    }
}

impl Database<Insert<user::Draft>> for MockDb {
    type Ok = User;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(draft): Insert<user::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        let (id, now) = state.next();
        let user::Draft {
            name,
            login,
            password_hash,
            email,
        } = draft;
        let user = User {
            id: id.into(),
            name,
            login,
            password_hash,
            email,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };
        state.users.push(Row {
            entity: user.clone(),
            deleted: false,
        });
        Ok(user)
    }
}

impl Database<Select<By<Option<User>, Lookup<user::Id>>>> for MockDb {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, Lookup<user::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Lookup { key, deletion } = by.into_inner();
        Ok(self
            .state()
            .users
            .iter()
            .find(|r| r.entity.id == key && visible(r, deletion))
            .map(|r| r.entity.clone()))
    }
}

impl<'l> Database<Select<By<Option<User>, Lookup<&'l user::Login>>>>
    for MockDb
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, Lookup<&'l user::Login>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Lookup { key, deletion } = by.into_inner();
        Ok(self
            .state()
            .users
            .iter()
            .find(|r| &r.entity.login == key && visible(r, deletion))
            .map(|r| r.entity.clone()))
    }
}

impl Database<Update<By<Option<User>, user::Revision>>> for MockDb {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(by): Update<By<Option<User>, user::Revision>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user::Revision {
            lookup: Lookup { key, deletion },
            name,
        } = by.into_inner();

        let mut state = self.state();
        let (_, now) = state.next();
        Ok(state
            .users
            .iter_mut()
            .find(|r| r.entity.id == key && visible(r, deletion))
            .map(|r| {
                r.entity.name = name;
                r.entity.updated_at = now.coerce();
                r.entity.clone()
            }))
    }
}

impl Database<Update<SingleField<user::field::Email>>> for MockDb {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(field): Update<SingleField<user::field::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let SingleField {
            lookup: Lookup { key, deletion },
            value,
        } = field;

        let mut state = self.state();
        let (_, now) = state.next();
        Ok(state
            .users
            .iter_mut()
            .find(|r| r.entity.id == key && visible(r, deletion))
            .map(|r| {
                r.entity.email = value;
                r.entity.updated_at = now.coerce();
            })
            .is_some())
    }
}

impl Database<Select<By<bool, Probe<user::field::Login>>>> for MockDb {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<bool, Probe<user::field::Login>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Probe { value } = by.into_inner();
        Ok(self.state().users.iter().any(|r| r.entity.login == value))
    }
}

impl Database<Delete<By<User, Lookup<user::Id>>>> for MockDb {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, Lookup<user::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Lookup { key, deletion } = by.into_inner();

        let mut state = self.state();
        let Some(pos) = state
            .users
            .iter()
            .position(|r| r.entity.id == key && !r.deleted)
        else {
            return Ok(false);
        };
        if deletion.hides_deleted() {
            state.users[pos].deleted = true;
        } else {
            drop(state.users.remove(pos));
        }
        Ok(true)
    }
}

impl
    Database<Select<By<read::user::list::Page, read::user::list::Selector>>>
    for MockDb
{
    type Ok = read::user::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::user::list::Page, read::user::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::user::list::Selector { arguments, filter } = by.into_inner();
        Ok(list(
            &self.state().users,
            |u| u.name.as_ref(),
            |u| u.created_at.coerce(),
            arguments,
            filter.name_prefix.as_deref(),
            filter.created_at_order,
        ))
    }
}

/// Creates a new [`service::Service`] over a fresh [`MockDb`] with the
/// provided [`DeletionMode`].
pub(crate) fn service(deletion: DeletionMode) -> service::Service<MockDb> {
    service::Service::new(
        service::Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(b"test"),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(b"test"),
            session_ttl: Duration::from_secs(30 * 60),
            deletion,
        },
        MockDb::default(),
    )
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Delete, Insert, Select, Update},
        pagination::Arguments,
        DateTime,
    };
    use service::{
        domain::{field::SingleField, user, DeletionMode, User},
        infra::Database as _,
        read::Lookup,
    };

    use super::{list, MockDb, Row};

    #[tokio::test]
    async fn skips_soft_deleted_row_on_field_update() {
        let db = MockDb::default();
        let password = "qwerty".parse::<user::Password>().unwrap();
        let user = db
            .execute(Insert(user::Draft {
                name: "Alice".parse().unwrap(),
                login: "alice".parse().unwrap(),
                password_hash: user::PasswordHash::new(&password).unwrap(),
                email: None,
            }))
            .await
            .unwrap();
        let lookup = Lookup {
            key: user.id,
            deletion: DeletionMode::Soft,
        };
        assert!(db.execute(Delete(By::<User, _>::new(lookup))).await.unwrap());

        let updated = db
            .execute(Update(SingleField::<user::field::Email> {
                lookup,
                value: Some("alice@example.com".parse().unwrap()),
            }))
            .await
            .unwrap();
        assert!(!updated);

        let stored = db
            .execute(Select(By::<Option<User>, _>::new(Lookup {
                key: user.id,
                deletion: DeletionMode::Hard,
            })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.email, None);
    }

    #[test]
    fn folds_only_ascii_case() {
        let rows = ["ÉCLAIR", "Éclair", "Widget"].map(|entity| Row {
            entity,
            deleted: false,
        });
        let names = |prefix: &str| {
            list(
                &rows,
                |n| *n,
                |_| DateTime::UNIX_EPOCH,
                Arguments::default(),
                Some(prefix),
                None,
            )
            .nodes
        };

        assert_eq!(names("wID"), ["Widget"]);
        assert_eq!(names("É"), ["ÉCLAIR", "Éclair"]);
        assert_eq!(names("éc"), Vec::<&str>::new());
    }
}
