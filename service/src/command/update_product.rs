//! [`Command`] for renaming an existing [`Product`].

use common::operations::{By, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::product::Name;
use crate::{
    domain::{product, Product},
    infra::{database, Database},
    read::Lookup,
    Service,
};

use super::Command;

/// [`Command`] for renaming an existing [`Product`].
#[derive(Clone, Debug)]
pub struct UpdateProduct {
    /// ID of the [`Product`] to rename.
    pub product_id: product::Id,

    /// New [`Name`] of the [`Product`].
    pub name: product::Name,
}

impl<Db> Command<UpdateProduct> for Service<Db>
where
    Db: Database<
        Update<By<Option<Product>, product::Revision>>,
        Ok = Option<Product>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Product;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateProduct,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateProduct { product_id, name } = cmd;

        let revision = product::Revision {
            lookup: Lookup {
                key: product_id,
                deletion: self.config().deletion,
            },
            name,
        };
        self.database()
            .execute(Update(By::new(revision)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ProductNotExists(product_id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`UpdateProduct`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Product`] doesn't exist.
    #[display("`Product(id: {_0})` does not exist")]
    #[from(ignore)]
    ProductNotExists(#[error(not(source))] product::Id),
}
