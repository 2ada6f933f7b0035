//! [`Query`] collection related to [`User`]s.

use common::operations::{By, Select};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::DeletionMode;
use crate::{
    domain::{user, User},
    infra::{database, Database},
    read::{self, Lookup},
    Service,
};

use super::{DatabaseQuery, Query};

/// Queries a [`User`] by its [`user::Id`], respecting the configured
/// [`DeletionMode`].
#[derive(Clone, Copy, Debug)]
pub struct ById(pub user::Id);

impl<Db> Query<ById> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, Lookup<user::Id>>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(&self, ById(id): ById) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(By::new(Lookup {
                key: id,
                deletion: self.config().deletion,
            })))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Queries a list of [`User`]s.
pub type List =
    DatabaseQuery<By<read::user::list::Page, read::user::list::Selector>>;
