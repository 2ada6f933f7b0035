//! [`Command`] for renaming a [`User`].

use common::operations::{By, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::Name;
use crate::{
    domain::{user, User},
    infra::{database, Database},
    read::Lookup,
    Service,
};

use super::Command;

/// [`Command`] for renaming a [`User`].
///
/// [`User`]s are allowed to rename only themselves.
#[derive(Clone, Debug)]
pub struct UpdateUserName {
    /// ID of the [`User`] executing this [`Command`].
    pub initiator_id: user::Id,

    /// ID of the [`User`] to rename.
    pub user_id: user::Id,

    /// New [`Name`] of the [`User`].
    pub name: user::Name,
}

impl<Db> Command<UpdateUserName> for Service<Db>
where
    Db: Database<
        Update<By<Option<User>, user::Revision>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateUserName,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUserName {
            initiator_id,
            user_id,
            name,
        } = cmd;

        if initiator_id != user_id {
            return Err(tracerr::new!(E::NotPermitted(user_id)));
        }

        let revision = user::Revision {
            lookup: Lookup {
                key: user_id,
                deletion: self.config().deletion,
            },
            name,
        };
        self.database()
            .execute(Update(By::new(revision)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`UpdateUserName`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Initiator is not allowed to rename the [`User`].
    #[display("Not permitted to rename `User(id: {_0})`")]
    #[from(ignore)]
    NotPermitted(#[error(not(source))] user::Id),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
