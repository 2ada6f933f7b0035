//! [`Command`] for deleting a [`Product`].

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::DeletionMode;
use crate::{
    domain::{product, Product},
    infra::{database, Database},
    read::Lookup,
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Product`] according to the configured
/// [`DeletionMode`].
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteProduct {
    /// ID of the [`Product`] to delete.
    pub product_id: product::Id,
}

impl<Db> Command<DeleteProduct> for Service<Db>
where
    Db: Database<
        Delete<By<Product, Lookup<product::Id>>>,
        Ok = bool,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteProduct,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteProduct { product_id } = cmd;

        let deleted = self
            .database()
            .execute(Delete(By::new(Lookup {
                key: product_id,
                deletion: self.config().deletion,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !deleted {
            return Err(tracerr::new!(E::ProductNotExists(product_id)));
        }

        Ok(())
    }
}

/// Error of [`DeleteProduct`] [`Command`] execution.
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
