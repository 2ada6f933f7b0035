//! [`Command`] for updating an [`user::Email`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::Email;
use crate::{
    domain::{
        field::SingleField,
        user::{self, field},
        User,
    },
    infra::{database, Database},
    read::Lookup,
    Service,
};

use super::Command;

/// [`Command`] for updating an [`user::Email`].
#[derive(Clone, Debug, From)]
pub struct UpdateUserEmail {
    /// ID of the [`User`] which [`Email`] should be updated.
    pub user_id: user::Id,

    /// New [`Email`] address of the [`User`].
    ///
    /// [`None`] indicating [`Email`] deletion.
    pub address: Option<user::Email>,
}

impl<Db> Command<UpdateUserEmail> for Service<Db>
where
    Db: Database<
            Update<SingleField<field::Email>>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, Lookup<user::Id>>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateUserEmail,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUserEmail { user_id, address } = cmd;
        let lookup = Lookup {
            key: user_id,
            deletion: self.config().deletion,
        };

        let updated = self
            .database()
            .execute(Update(SingleField::<field::Email> {
                lookup,
                value: address,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !updated {
            return Err(tracerr::new!(E::UserNotExists(user_id)));
        }

        self.database()
            .execute(Select(By::new(lookup)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`UpdateUserEmail`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
