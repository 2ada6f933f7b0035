//! [`Command`] for creating a new [`Product`].

use common::operations::Insert;
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::product::Name;
use crate::{
    domain::{product, Product},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Product`].
#[derive(Clone, Debug)]
pub struct CreateProduct {
    /// [`Name`] of a new [`Product`].
    pub name: product::Name,
}

impl<Db> Command<CreateProduct> for Service<Db>
where
    Db: Database<
        Insert<product::Draft>,
        Ok = Product,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Product;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateProduct,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateProduct { name } = cmd;

        self.database()
            .execute(Insert(product::Draft { name }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`CreateProduct`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
