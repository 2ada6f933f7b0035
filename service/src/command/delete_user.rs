//! [`Command`] for deleting a [`User`].

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::DeletionMode;
use crate::{
    domain::{user, User},
    infra::{database, Database},
    read::Lookup,
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`User`] according to the configured
/// [`DeletionMode`].
///
/// [`User`]s are allowed to delete only themselves.
#[derive(Clone, Copy, Debug)]
pub struct DeleteUser {
    /// ID of the [`User`] executing this [`Command`].
    pub initiator_id: user::Id,

    /// ID of the [`User`] to delete.
    pub user_id: user::Id,
}

impl<Db> Command<DeleteUser> for Service<Db>
where
    Db: Database<
        Delete<By<User, Lookup<user::Id>>>,
        Ok = bool,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteUser {
            initiator_id,
            user_id,
        } = cmd;

        if initiator_id != user_id {
            return Err(tracerr::new!(E::NotPermitted(user_id)));
        }

        let deleted = self
            .database()
            .execute(Delete(By::new(Lookup {
                key: user_id,
                deletion: self.config().deletion,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !deleted {
            return Err(tracerr::new!(E::UserNotExists(user_id)));
        }

        Ok(())
    }
}

/// Error of [`DeleteUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Initiator is not allowed to delete the [`User`].
    #[display("Not permitted to delete `User(id: {_0})`")]
    #[from(ignore)]
    NotPermitted(#[error(not(source))] user::Id),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
