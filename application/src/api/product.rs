//! [`Product`]-related REST API definitions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query as QueryParams,
    },
    response::Response,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command},
    domain::{self, product},
    query::{self, DatabaseQuery},
    read, Query,
};
use tracerr::Traced;

use crate::{
    api::{self, respond, Envelope, ListParams, ListRequest},
    define_error, AsError, Error, Service, Session,
};

/// [`Product`] as returned by the API.
#[derive(Clone, Debug, Serialize)]
pub struct Product {
    /// ID of this [`Product`].
    pub id: i64,

    /// Name of this [`Product`].
    pub product_name: String,

    /// RFC 1123 date and time when this [`Product`] was created.
    pub created_at: String,

    /// RFC 1123 date and time when this [`Product`] was modified the last
    /// time.
    pub updated_at: String,
}

impl From<domain::Product> for Product {
    fn from(product: domain::Product) -> Self {
        let domain::Product {
            id,
            name,
            created_at,
            updated_at,
        } = product;

        Self {
            id: id.into(),
            product_name: name.into(),
            created_at: created_at.to_rfc1123(),
            updated_at: updated_at.to_rfc1123(),
        }
    }
}

/// Page of [`Product`]s.
#[derive(Clone, Debug, Serialize)]
pub struct ProductList {
    /// [`Product`]s on the requested page.
    pub products: Vec<Product>,

    /// Total number of [`Product`]s matching the filter.
    pub count: u64,
}

/// Body of a [`Product`] creation request.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateRequest {
    /// Name of a new [`Product`].
    pub product_name: String,
}

/// Body of a [`Product`] update request.
#[derive(Clone, Debug, Deserialize)]
pub struct UpdateRequest {
    /// ID of the [`Product`] to update.
    #[serde(default)]
    pub id: i64,

    /// New name of the [`Product`].
    pub product_name: String,
}

/// Parses the provided raw `name` of a [`Product`].
fn name(name: String) -> Result<product::Name, Error> {
    product::Name::new(name).ok_or_else(|| {
        Error::bad_request(
            "`product_name` must be non-empty, at most 512 bytes long and \
             have no surrounding whitespace",
        )
    })
}

/// Creates a new [`Product`].
///
/// # Errors
///
/// If the request is invalid or the [`Product`] cannot be stored.
pub async fn create<S>(svc: &S, req: CreateRequest) -> api::Result<Product>
where
    S: Command<
        command::CreateProduct,
        Ok = domain::Product,
        Err = Traced<command::create_product::ExecutionError>,
    >,
{
    let name = name(req.product_name)?;

    svc.execute(command::CreateProduct { name })
        .await
        .map(|p| Envelope::success(p.into()))
        .map_err(AsError::into_error)
}

/// Returns a single [`Product`] by its ID.
///
/// # Errors
///
/// If the ID is invalid or no such [`Product`] exists.
pub async fn get<S>(svc: &S, id: i64) -> api::Result<Product>
where
    S: Query<
        query::product::ById,
        Ok = Option<domain::Product>,
        Err = Traced<service::infra::database::Error>,
    >,
{
    let id = api::id(id)?;

    svc.execute(query::product::ById(id))
        .await
        .map_err(AsError::into_error)?
        .map(|p| Envelope::success(p.into()))
        .ok_or_else(|| ProductError::NotExists.into())
}

/// Returns a page of [`Product`]s matching the provided [`ListRequest`].
///
/// # Errors
///
/// If the [`Product`]s cannot be read.
pub async fn list<S>(svc: &S, req: ListRequest) -> api::Result<ProductList>
where
    S: Query<
        query::product::List,
        Ok = read::product::list::Page,
        Err = Traced<service::infra::database::Error>,
    >,
{
    let ListRequest {
        arguments,
        name_prefix,
        created_at_order,
    } = req;

    let page = svc
        .execute(DatabaseQuery::by(read::product::list::Selector {
            arguments,
            filter: read::product::list::Filter {
                name_prefix,
                created_at_order,
            },
        }))
        .await
        .map_err(AsError::into_error)?;

    Ok(Envelope::success(ProductList {
        count: page.total_count,
        products: page.nodes.into_iter().map(Into::into).collect(),
    }))
}

/// Renames an existing [`Product`].
///
/// # Errors
///
/// If the request is invalid or no such [`Product`] exists.
pub async fn update<S>(svc: &S, req: UpdateRequest) -> api::Result<Product>
where
    S: Command<
        command::UpdateProduct,
        Ok = domain::Product,
        Err = Traced<command::update_product::ExecutionError>,
    >,
{
    let UpdateRequest { id, product_name } = req;
    let product_id = api::id(id)?;
    let name = name(product_name)?;

    svc.execute(command::UpdateProduct { product_id, name })
        .await
        .map(|p| Envelope::success(p.into()))
        .map_err(AsError::into_error)
}

/// Deletes an existing [`Product`].
///
/// # Errors
///
/// If the ID is invalid or no such [`Product`] exists.
pub async fn delete<S>(svc: &S, id: i64) -> api::Result<()>
where
    S: Command<
        command::DeleteProduct,
        Ok = (),
        Err = Traced<command::delete_product::ExecutionError>,
    >,
{
    let product_id = api::id(id)?;

    svc.execute(command::DeleteProduct { product_id })
        .await
        .map(|()| Envelope::message("Successfully deleted"))
        .map_err(AsError::into_error)
}

/// `POST /product` handler.
#[tracing::instrument(skip_all, fields(user_id = %session.user_id))]
pub async fn create_handler(
    Extension(svc): Extension<Service>,
    session: Session,
    req: Result<Json<CreateRequest>, JsonRejection>,
) -> Response {
    let result = match req {
        Ok(Json(req)) => create(&svc, req).await,
        Err(e) => Err(e.into_error()),
    };
    respond("product::create", result)
}

/// `GET /product/:id` handler.
#[tracing::instrument(skip_all)]
pub async fn get_handler(
    Extension(svc): Extension<Service>,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let result = match id {
        Ok(Path(id)) => get(&svc, id).await,
        Err(e) => Err(e.into_error()),
    };
    respond("product::get", result)
}

/// `GET /product/list` handler.
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
    respond("product::list", result)
}

/// `PUT /product` handler.
#[tracing::instrument(skip_all, fields(user_id = %session.user_id))]
pub async fn update_handler(
    Extension(svc): Extension<Service>,
    session: Session,
    req: Result<Json<UpdateRequest>, JsonRejection>,
) -> Response {
    let result = match req {
        Ok(Json(req)) => update(&svc, req).await,
        Err(e) => Err(e.into_error()),
    };
    respond("product::update", result)
}

/// `DELETE /product/:id` handler.
#[tracing::instrument(skip_all, fields(user_id = %session.user_id))]
pub async fn delete_handler(
    Extension(svc): Extension<Service>,
    session: Session,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let result = match id {
        Ok(Path(id)) => delete(&svc, id).await,
        Err(e) => Err(e.into_error()),
    };
    respond("product::delete", result)
}

impl AsError for command::create_product::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_product::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ProductNotExists(_) => Some(ProductError::NotExists.into()),
        }
    }
}

impl AsError for command::delete_product::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ProductNotExists(_) => Some(ProductError::NotExists.into()),
        }
    }
}

define_error! {
    enum ProductError {
        #[code = 2001]
        #[status = NOT_FOUND]
        #[message = "`Product` does not exist"]
        NotExists,
    }
}
