//! Request context definitions.

use axum::{
    async_trait,
    extract::FromRequestParts,
    response::{IntoResponse as _, Response},
    RequestPartsExt as _,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use service::{
    command::{self, Command},
    domain::user::{self, session},
};
use tracerr::Traced;

use crate::{define_error, AsError, Error, Service};

/// Authenticated session of the [`User`] performing the request.
///
/// [`User`]: service::domain::User
#[derive(Clone, Copy, Debug)]
pub struct Session {
    /// ID of the [`User`] associated with this [`Session`].
    ///
    /// [`User`]: service::domain::User
    pub user_id: user::Id,
}

impl Session {
    /// Authenticates the provided bearer `token` via the provided service.
    ///
    /// # Errors
    ///
    /// Errors if the `token` is missing, invalid or belongs to a removed
    /// [`User`].
    ///
    /// [`User`]: service::domain::User
    pub async fn authenticate<S>(
        svc: &S,
        token: Option<&str>,
    ) -> Result<Self, Error>
    where
        S: Command<
            command::AuthorizeUserSession,
            Ok = user::Session,
            Err = Traced<command::authorize_user_session::ExecutionError>,
        >,
    {
        let token = token.ok_or(AuthError::AuthorizationRequired)?;

        // SAFETY: Any string is passed for validation only, so an invalid
        //         token just fails to authorize.
        #[expect(unsafe_code, reason = "validated by the command")]
        let token = unsafe { session::Token::new_unchecked(token.to_owned()) };

        svc.execute(command::AuthorizeUserSession { token })
            .await
            .map(|s| Self { user_id: s.user_id })
            .map_err(AsError::into_error)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        /// Name of the operation logged on failures.
        const OPERATION: &str = "session::authenticate";

        let reject = |e: Error| {
            e.log(OPERATION);
            e.into_response()
        };

        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))
            .map_err(reject)?;

        let token = match parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
        {
            Ok(TypedHeader(Authorization(bearer))) => {
                Some(bearer.token().to_owned())
            }
            Err(e) if e.is_missing() => None,
            Err(e) => return Err(reject(e.into_error())),
        };

        Self::authenticate(&service, token.as_deref())
            .await
            .map_err(reject)
    }
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenDecodeError(_) | Self::UserNotExists(_) => {
                Some(AuthError::AuthorizationRequired.into())
            }
        }
    }
}

define_error! {
    enum AuthError {
        #[code = 1001]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = 1002]
        #[status = FORBIDDEN]
        #[message = "Provided credentials do not match any `User`"]
        WrongCredentials,

        #[code = 1003]
        #[status = FORBIDDEN]
        #[message = "Operation is permitted only upon the authenticated `User`"]
        NotPermitted,
    }
}
