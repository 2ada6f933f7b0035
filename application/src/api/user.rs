//! [`User`]-related REST API definitions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query as QueryParams,
    },
    response::Response,
    Extension, Json,
};
use derive_more::Debug;
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command},
    domain::{self, user},
    query::{self, DatabaseQuery},
    read, Query,
};
use tracerr::Traced;

use crate::{
    api::{self, respond, Envelope, ListParams, ListRequest},
    context::AuthError,
    define_error, AsError, Error, Service, Session,
};

/// [`User`] as returned by the API.
#[derive(Clone, Debug, Serialize)]
pub struct User {
    /// ID of this [`User`].
    pub id: i64,

    /// Name of this [`User`].
    pub name: String,

    /// Login of this [`User`].
    pub login: String,

    /// Email address of this [`User`], if any.
    pub email: Option<String>,

    /// RFC 1123 date and time when this [`User`] was created.
    pub created_at: String,

    /// RFC 1123 date and time when this [`User`] was modified the last time.
    pub updated_at: String,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        let domain::User {
            id,
            name,
            login,
            password_hash: _,
            email,
            created_at,
            updated_at,
        } = user;

        Self {
            id: id.into(),
            name: name.into(),
            login: login.into(),
            email: email.map(Into::into),
            created_at: created_at.to_rfc1123(),
            updated_at: updated_at.to_rfc1123(),
        }
    }
}

/// Page of [`User`]s.
#[derive(Clone, Debug, Serialize)]
pub struct UserList {
    /// [`User`]s on the requested page.
    pub users: Vec<User>,

    /// Total number of [`User`]s matching the filter.
    pub count: u64,
}

/// Issued session of a [`User`].
#[derive(Clone, Debug, Serialize)]
pub struct Login {
    /// Bearer token of the session.
    #[debug(skip)]
    pub token: String,

    /// RFC 1123 date and time when the session expires.
    pub expires_at: String,

    /// [`User`] the session is issued for.
    pub user: User,
}

/// Body of a [`User`] creation request.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateRequest {
    /// Name of a new [`User`].
    pub name: String,

    /// Login of a new [`User`].
    pub login: String,

    /// Password of a new [`User`].
    #[debug(skip)]
    pub password: String,

    /// Email address of a new [`User`].
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of a login request.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginRequest {
    /// Login of the [`User`].
    pub login: String,

    /// Password of the [`User`].
    #[debug(skip)]
    pub password: String,
}

/// Body of a [`User`] rename request.
#[derive(Clone, Debug, Deserialize)]
pub struct UpdateRequest {
    /// ID of the [`User`] to rename.
    #[serde(default)]
    pub id: i64,

    /// New name of the [`User`].
    pub name: String,
}

/// Body of an email update request.
#[derive(Clone, Debug, Deserialize)]
pub struct EmailRequest {
    /// New email address, or [`None`] to remove it.
    #[serde(default)]
    pub email: Option<String>,
}

/// Parses the provided raw `name` of a [`User`].
fn name(name: String) -> Result<user::Name, Error> {
    user::Name::new(name).ok_or_else(|| {
        Error::bad_request(
            "`name` must be non-empty, at most 512 bytes long and have no \
             surrounding whitespace",
        )
    })
}

/// Parses the provided raw `email` address of a [`User`].
fn email(email: Option<String>) -> Result<Option<user::Email>, Error> {
    email
        .map(|e| {
            user::Email::new(e.trim())
                .ok_or_else(|| Error::bad_request("invalid `email` address"))
        })
        .transpose()
}

/// Creates a new [`User`].
///
/// # Errors
///
/// If the request is invalid or the login is occupied.
pub async fn create<S>(svc: &S, req: CreateRequest) -> api::Result<User>
where
    S: Command<
        command::CreateUser,
        Ok = domain::User,
        Err = Traced<command::create_user::ExecutionError>,
    >,
{
    let CreateRequest {
        name: raw_name,
        login,
        password,
        email: raw_email,
    } = req;

    let name = name(raw_name)?;
    let login = user::Login::new(login).ok_or_else(|| {
        Error::bad_request("`login` must be 2 to 100 letters or digits")
    })?;
    let password = user::Password::new(password).ok_or_else(|| {
        Error::bad_request("`password` must be 2 to 128 bytes long")
    })?;
    let email = email(raw_email)?;

    svc.execute(command::CreateUser {
        name,
        login,
        password: SecretBox::new(Box::new(password)),
        email,
    })
    .await
    .map(|u| Envelope::success(u.into()))
    .map_err(AsError::into_error)
}

/// Issues a new session for the [`User`] with the provided credentials.
///
/// # Errors
///
/// If the credentials don't match any [`User`].
pub async fn login<S>(svc: &S, req: LoginRequest) -> api::Result<Login>
where
    S: Command<
        command::CreateUserSession,
        Ok = command::create_user_session::Output,
        Err = Traced<command::create_user_session::ExecutionError>,
    >,
{
    let LoginRequest { login, password } = req;

    // Malformed credentials cannot match anyone, so they are reported the
    // same way as the wrong ones.
    let (Some(login), Some(password)) =
        (user::Login::new(login), user::Password::new(password))
    else {
        return Err(AuthError::WrongCredentials.into());
    };

    let command::create_user_session::Output {
        token,
        user,
        expires_at,
    } = svc
        .execute(command::CreateUserSession {
            login,
            password: SecretBox::new(Box::new(password)),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Envelope::success(Login {
        token: token.to_string(),
        expires_at: expires_at.to_rfc1123(),
        user: user.into(),
    }))
}

/// Returns a single [`User`] by its ID.
///
/// # Errors
///
/// If the ID is invalid or no such [`User`] exists.
pub async fn get<S>(svc: &S, id: i64) -> api::Result<User>
where
    S: Query<
        query::user::ById,
        Ok = Option<domain::User>,
        Err = Traced<service::infra::database::Error>,
    >,
{
    let id = api::id(id)?;

    svc.execute(query::user::ById(id))
        .await
        .map_err(AsError::into_error)?
        .map(|u| Envelope::success(u.into()))
        .ok_or_else(|| UserError::NotExists.into())
}

/// Returns a page of [`User`]s matching the provided [`ListRequest`].
///
/// # Errors
///
/// If the [`User`]s cannot be read.
pub async fn list<S>(svc: &S, req: ListRequest) -> api::Result<UserList>
where
    S: Query<
        query::user::List,
        Ok = read::user::list::Page,
        Err = Traced<service::infra::database::Error>,
    >,
{
    let ListRequest {
        arguments,
        name_prefix,
        created_at_order,
    } = req;

    let page = svc
        .execute(DatabaseQuery::by(read::user::list::Selector {
            arguments,
            filter: read::user::list::Filter {
                name_prefix,
                created_at_order,
            },
        }))
        .await
        .map_err(AsError::into_error)?;

    Ok(Envelope::success(UserList {
        count: page.total_count,
        users: page.nodes.into_iter().map(Into::into).collect(),
    }))
}

/// Renames the [`User`] of the provided [`Session`].
///
/// # Errors
///
/// If the request is invalid or targets another [`User`].
pub async fn update_name<S>(
    svc: &S,
    session: Session,
    req: UpdateRequest,
) -> api::Result<User>
where
    S: Command<
        command::UpdateUserName,
        Ok = domain::User,
        Err = Traced<command::update_user_name::ExecutionError>,
    >,
{
    let UpdateRequest { id, name: raw_name } = req;
    let user_id = api::id(id)?;
    let name = name(raw_name)?;

    svc.execute(command::UpdateUserName {
        initiator_id: session.user_id,
        user_id,
        name,
    })
    .await
    .map(|u| Envelope::success(u.into()))
    .map_err(AsError::into_error)
}

/// Sets or removes the email address of the [`User`] of the provided
/// [`Session`].
///
/// # Errors
///
/// If the address is invalid or the [`User`] doesn't exist anymore.
pub async fn update_email<S>(
    svc: &S,
    session: Session,
    req: EmailRequest,
) -> api::Result<User>
where
    S: Command<
        command::UpdateUserEmail,
        Ok = domain::User,
        Err = Traced<command::update_user_email::ExecutionError>,
    >,
{
    let address = email(req.email)?;

    svc.execute(command::UpdateUserEmail {
        user_id: session.user_id,
        address,
    })
    .await
    .map(|u| Envelope::success(u.into()))
    .map_err(AsError::into_error)
}

/// Deletes the [`User`] of the provided [`Session`].
///
/// # Errors
///
/// If the ID is invalid or targets another [`User`].
pub async fn delete<S>(svc: &S, session: Session, id: i64) -> api::Result<()>
where
    S: Command<
        command::DeleteUser,
        Ok = (),
        Err = Traced<command::delete_user::ExecutionError>,
    >,
{
    let user_id = api::id(id)?;

    svc.execute(command::DeleteUser {
        initiator_id: session.user_id,
        user_id,
    })
    .await
    .map(|()| Envelope::message("Successfully deleted"))
    .map_err(AsError::into_error)
}

/// `POST /user` handler.
#[tracing::instrument(skip_all)]
pub async fn create_handler(
    Extension(svc): Extension<Service>,
    req: Result<Json<CreateRequest>, JsonRejection>,
) -> Response {
    let result = match req {
        Ok(Json(req)) => create(&svc, req).await,
        Err(e) => Err(e.into_error()),
    };
    respond("user::create", result)
}

/// `POST /user/login` handler.
#[tracing::instrument(skip_all)]
pub async fn login_handler(
    Extension(svc): Extension<Service>,
    req: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let result = match req {
        Ok(Json(req)) => login(&svc, req).await,
        Err(e) => Err(e.into_error()),
    };
    respond("user::login", result)
}

/// `GET /user/:id` handler.
#[tracing::instrument(skip_all)]
pub async fn get_handler(
    Extension(svc): Extension<Service>,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let result = match id {
        Ok(Path(id)) => get(&svc, id).await,
        Err(e) => Err(e.into_error()),
    };
    respond("user::get", result)
}

/// `GET /user/list` handler.
#[tracing::instrument(skip_all)]
pub async fn list_handler(
    Extension(svc): Extension<Service>,
    params: Result<QueryParams<ListParams>, QueryRejection>,
) -> Response {
    let result = match params.map_err(AsError::into_error) {
        Ok(QueryParams(params)) => match ListRequest::try_from(params) {
            Ok(req) => list(&svc, req).await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };
    respond("user::list", result)
}

/// `PUT /user` handler.
#[tracing::instrument(skip_all, fields(user_id = %session.user_id))]
pub async fn update_name_handler(
    Extension(svc): Extension<Service>,
    session: Session,
    req: Result<Json<UpdateRequest>, JsonRejection>,
) -> Response {
    let result = match req {
        Ok(Json(req)) => update_name(&svc, session, req).await,
        Err(e) => Err(e.into_error()),
    };
    respond("user::update_name", result)
}

/// `PUT /user/email` handler.
#[tracing::instrument(skip_all, fields(user_id = %session.user_id))]
pub async fn update_email_handler(
    Extension(svc): Extension<Service>,
    session: Session,
    req: Result<Json<EmailRequest>, JsonRejection>,
) -> Response {
    let result = match req {
        Ok(Json(req)) => update_email(&svc, session, req).await,
        Err(e) => Err(e.into_error()),
    };
    respond("user::update_email", result)
}

/// `DELETE /user/:id` handler.
#[tracing::instrument(skip_all, fields(user_id = %session.user_id))]
pub async fn delete_handler(
    Extension(svc): Extension<Service>,
    session: Session,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let result = match id {
        Ok(Path(id)) => delete(&svc, session, id).await,
        Err(e) => Err(e.into_error()),
    };
    respond("user::delete", result)
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::LoginOccupied(_) => Some(UserError::LoginOccupied.into()),
            Self::PasswordHash(_) => None,
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::WrongCredentials => Some(AuthError::WrongCredentials.into()),
            Self::JsonWebTokenEncodeError(_) => None,
        }
    }
}

impl AsError for command::update_user_name::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotPermitted(_) => Some(AuthError::NotPermitted.into()),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}

impl AsError for command::update_user_email::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}

impl AsError for command::delete_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotPermitted(_) => Some(AuthError::NotPermitted.into()),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}

define_error! {
    enum UserError {
        #[code = 2002]
        #[status = NOT_FOUND]
        #[message = "`User` does not exist"]
        NotExists,

        #[code = 2003]
        #[status = CONFLICT]
        #[message = "`User` with such login already exists"]
        LoginOccupied,
    }
}

#[cfg(test)]
mod spec {
    use service::domain::DeletionMode;

    use crate::{
        api::{mock, ListParams, ListRequest},
        Session,
    };

    use super::{
        create, delete, get, list, login, update_email, update_name,
        CreateRequest, EmailRequest, LoginRequest, UpdateRequest,
    };

    fn create_req(name: &str, login: &str) -> CreateRequest {
        CreateRequest {
            name: name.to_owned(),
            login: login.to_owned(),
            password: "correct horse".to_owned(),
            email: None,
        }
    }

    fn login_req(login: &str, password: &str) -> LoginRequest {
        LoginRequest {
            login: login.to_owned(),
            password: password.to_owned(),
        }
    }

    async fn sign_in(
        svc: &service::Service<mock::MockDb>,
        login_name: &str,
    ) -> Session {
        let issued = login(svc, login_req(login_name, "correct horse"))
            .await
            .unwrap()
            .body
            .flatten()
            .unwrap();
        Session::authenticate(svc, Some(issued.token.as_str()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn creates_and_gets() {
        let svc = mock::service(DeletionMode::Hard);

        let created = create(
            &svc,
            CreateRequest {
                email: Some(" alice@example.com ".into()),
                ..create_req("Alice", "alice")
            },
        )
        .await
        .unwrap()
        .body
        .flatten()
        .unwrap();
        assert_eq!(created.name, "Alice");
        assert_eq!(created.login, "alice");
        assert_eq!(created.email.as_deref(), Some("alice@example.com"));

        let got = get(&svc, created.id).await.unwrap().body.flatten().unwrap();
        assert_eq!(got.login, "alice");
        assert_eq!(got.created_at, created.created_at);
    }

    #[tokio::test]
    async fn hides_password_hash() {
        let svc = mock::service(DeletionMode::Hard);

        let created = create(&svc, create_req("Alice", "alice")).await.unwrap();
        let json = serde_json::to_value(created).unwrap();

        assert!(json["body"].get("password").is_none());
        assert!(json["body"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn rejects_invalid_fields() {
        let svc = mock::service(DeletionMode::Hard);

        for req in [
            create_req("", "alice"),
            create_req("Alice", "a"),
            create_req("Alice", "alice smith"),
            CreateRequest {
                password: "x".into(),
                ..create_req("Alice", "alice")
            },
            CreateRequest {
                email: Some("alice".into()),
                ..create_req("Alice", "alice")
            },
        ] {
            let err = create(&svc, req).await.unwrap_err();
            assert_eq!(err.code, 1000);
        }
    }

    #[tokio::test]
    async fn rejects_occupied_login() {
        let svc = mock::service(DeletionMode::Hard);
        _ = create(&svc, create_req("Alice", "alice")).await.unwrap();

        let err = create(&svc, create_req("Another Alice", "alice"))
            .await
            .unwrap_err();
        assert_eq!(err.code, 2003);
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn logs_in() {
        let svc = mock::service(DeletionMode::Hard);
        let created = create(&svc, create_req("Alice", "alice"))
            .await
            .unwrap()
            .body
            .flatten()
            .unwrap();

        let issued = login(&svc, login_req("alice", "correct horse"))
            .await
            .unwrap()
            .body
            .flatten()
            .unwrap();
        assert_eq!(issued.user.id, created.id);
        assert!(issued.expires_at.ends_with(" UTC"));

        let session = Session::authenticate(&svc, Some(issued.token.as_str()))
            .await
            .unwrap();
        assert_eq!(i64::from(session.user_id), created.id);
    }

    #[tokio::test]
    async fn rejects_wrong_credentials() {
        let svc = mock::service(DeletionMode::Hard);
        _ = create(&svc, create_req("Alice", "alice")).await.unwrap();

        for req in [
            login_req("alice", "wrong horse"),
            login_req("bob", "correct horse"),
            login_req("", "correct horse"),
        ] {
            let err = login(&svc, req).await.unwrap_err();
            assert_eq!(err.code, 1002);
            assert_eq!(err.status_code, http::StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn requires_valid_token() {
        let svc = mock::service(DeletionMode::Hard);

        let err = Session::authenticate(&svc, None).await.unwrap_err();
        assert_eq!(err.code, 1001);
        assert_eq!(err.status_code, http::StatusCode::UNAUTHORIZED);

        let err = Session::authenticate(&svc, Some("not.a.token"))
            .await
            .unwrap_err();
        assert_eq!(err.code, 1001);
    }

    #[tokio::test]
    async fn renames_only_themself() {
        let svc = mock::service(DeletionMode::Hard);
        let alice = create(&svc, create_req("Alice", "alice"))
            .await
            .unwrap()
            .body
            .flatten()
            .unwrap();
        let bob = create(&svc, create_req("Bob", "bob"))
            .await
            .unwrap()
            .body
            .flatten()
            .unwrap();
        let session = sign_in(&svc, "alice").await;

        let renamed = update_name(
            &svc,
            session,
            UpdateRequest {
                id: alice.id,
                name: "Alice Smith".into(),
            },
        )
        .await
        .unwrap()
        .body
        .flatten()
        .unwrap();
        assert_eq!(renamed.name, "Alice Smith");

        let err = update_name(
            &svc,
            session,
            UpdateRequest {
                id: bob.id,
                name: "Mallory".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, 1003);
        assert_eq!(err.status_code, http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn updates_email() {
        let svc = mock::service(DeletionMode::Hard);
        _ = create(&svc, create_req("Alice", "alice")).await.unwrap();
        let session = sign_in(&svc, "alice").await;

        let updated = update_email(
            &svc,
            session,
            EmailRequest {
                email: Some("alice@example.com".into()),
            },
        )
        .await
        .unwrap()
        .body
        .flatten()
        .unwrap();
        assert_eq!(updated.email.as_deref(), Some("alice@example.com"));

        let updated = update_email(&svc, session, EmailRequest { email: None })
            .await
            .unwrap()
            .body
            .flatten()
            .unwrap();
        assert_eq!(updated.email, None);

        let err = update_email(
            &svc,
            session,
            EmailRequest {
                email: Some("alice@".into()),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, 1000);
    }

    #[tokio::test]
    async fn deletes_only_themself() {
        let svc = mock::service(DeletionMode::Soft);
        let alice = create(&svc, create_req("Alice", "alice"))
            .await
            .unwrap()
            .body
            .flatten()
            .unwrap();
        let bob = create(&svc, create_req("Bob", "bob"))
            .await
            .unwrap()
            .body
            .flatten()
            .unwrap();
        let session = sign_in(&svc, "alice").await;
        let token = login(&svc, login_req("alice", "correct horse"))
            .await
            .unwrap()
            .body
            .flatten()
            .unwrap()
            .token;

        assert_eq!(delete(&svc, session, bob.id).await.unwrap_err().code, 1003);

        let deleted = delete(&svc, session, alice.id).await.unwrap();
        assert_eq!(deleted.error_message, "Successfully deleted");

        assert_eq!(get(&svc, alice.id).await.unwrap_err().code, 2002);
        let err = Session::authenticate(&svc, Some(token.as_str()))
            .await
            .unwrap_err();
        assert_eq!(err.code, 1001);
        let err = login(&svc, login_req("alice", "correct horse"))
            .await
            .unwrap_err();
        assert_eq!(err.code, 1002);

        let page = list(
            &svc,
            ListRequest::try_from(ListParams::default()).unwrap(),
        )
        .await
        .unwrap()
        .body
        .flatten()
        .unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.users[0].login, "bob");
    }
}
