//! [`Query`] collection related to [`Product`]s.

use common::operations::{By, Select};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::DeletionMode;
use crate::{
    domain::{product, Product},
    infra::{database, Database},
    read::{self, Lookup},
    Service,
};

use super::{DatabaseQuery, Query};

/// Queries a [`Product`] by its [`product::Id`], respecting the configured
/// [`DeletionMode`].
#[derive(Clone, Copy, Debug)]
pub struct ById(pub product::Id);

impl<Db> Query<ById> for Service<Db>
where
    Db: Database<
        Select<By<Option<Product>, Lookup<product::Id>>>,
        Ok = Option<Product>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Product>;
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

/// Queries a list of [`Product`]s.
pub type List = DatabaseQuery<
    By<read::product::list::Page, read::product::list::Selector>,
>;
