//! [`Command`] for creating a new [`User`].

use argon2::password_hash;
use common::operations::{By, Insert, Select};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Login, Name, Password};
use crate::{
    domain::{
        field::Probe,
        user::{self, field},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// Name of the unique constraint over [`User`] logins.
const LOGIN_CONSTRAINT: &str = "users_login_key";

/// [`Command`] for creating a new [`User`].
#[derive(Debug)]
pub struct CreateUser {
    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Login`] of a new [`User`].
    pub login: user::Login,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Email`] of a new [`User`].
    pub email: Option<user::Email>,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: Database<
            Select<By<bool, Probe<field::Login>>>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<
            Insert<user::Draft>,
            Ok = User,
            Err = Traced<database::Error>,
        >,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            name,
            login,
            password,
            email,
        } = cmd;

        let occupied = self
            .database()
            .execute(Select(By::new(Probe {
                value: login.clone(),
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if occupied {
            return Err(tracerr::new!(E::LoginOccupied(login)));
        }

        let password_hash = user::PasswordHash::new(password.expose_secret())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let draft = user::Draft {
            name,
            login: login.clone(),
            password_hash,
            email,
        };
        // The login may be taken concurrently after the probe.
        match self.database().execute(Insert(draft)).await {
            Err(e)
                if e.as_ref().is_unique_violation(Some(LOGIN_CONSTRAINT)) =>
            {
                Err(tracerr::new!(E::LoginOccupied(login)))
            }
            res => res.map_err(tracerr::map_from_and_wrap!(=> E)),
        }
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`user::Login`] is already occupied.
    #[display("`{_0}` login is occupied")]
    #[from(ignore)]
    LoginOccupied(#[error(not(source))] user::Login),

    /// [`user::Password`] cannot be hashed.
    #[display("Failed to hash `Password`: {_0}")]
    PasswordHash(password_hash::Error),
}
