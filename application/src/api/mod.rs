//! REST API definitions.

pub mod product;
pub mod user;

use axum::{
    response::{IntoResponse as _, Response},
    routing::{get, post, put},
    Json, Router,
};
use common::pagination::{self, Order};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Uniform wrapper of every API response.
#[derive(Clone, Debug, Serialize)]
pub struct Envelope<T> {
    /// Code of the error, or [`Envelope::SUCCESS`].
    pub error_code: u16,

    /// Human-readable description of the result.
    pub error_message: String,

    /// Payload of the response.
    ///
    /// Omitted entirely if [`None`], rendered as `null` if `Some(None)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Option<T>>,
}

impl<T> Envelope<T> {
    /// Code of a successful response.
    pub const SUCCESS: u16 = 0;

    /// Creates a successful [`Envelope`] carrying the provided `body`.
    #[must_use]
    pub const fn success(body: T) -> Self {
        Self {
            error_code: Self::SUCCESS,
            error_message: String::new(),
            body: Some(Some(body)),
        }
    }

    /// Creates a successful [`Envelope`] carrying only the provided
    /// `message`.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            error_code: Self::SUCCESS,
            error_message: message.into(),
            body: None,
        }
    }

    /// Creates a failed [`Envelope`] with a `null` body.
    #[must_use]
    pub const fn failure(code: u16, message: String) -> Self {
        Self {
            error_code: code,
            error_message: message,
            body: Some(None),
        }
    }
}

/// Result of an API operation.
pub type Result<T> = std::result::Result<Envelope<T>, Error>;

/// Converts the `result` of the provided `operation` into an HTTP response,
/// logging its failure.
pub(crate) fn respond<T: Serialize>(
    operation: &str,
    result: Result<T>,
) -> Response {
    match result {
        Ok(envelope) => Json(envelope).into_response(),
        Err(e) => {
            e.log(operation);
            e.into_response()
        }
    }
}

/// Validates the provided raw `id` of a single entity.
///
/// # Errors
///
/// If the `id` is not positive, so cannot identify any entity.
pub fn id<Id: From<i64>>(id: i64) -> std::result::Result<Id, Error> {
    if id > 0 {
        Ok(id.into())
    } else {
        Err(Error::bad_request("`id` must be a positive integer"))
    }
}

/// Query parameters of a list request.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListParams {
    /// Case-insensitive prefix of a name to search for.
    pub search: Option<String>,

    /// Direction of ordering by creation time: positive for descending,
    /// negative for ascending, zero for none.
    pub order_by_created_at: Option<String>,

    /// 1-based number of the requested page.
    pub page: Option<String>,

    /// Maximum number of entries on the requested page.
    pub limit: Option<String>,
}

/// Parsed [`ListParams`].
#[derive(Clone, Debug)]
pub struct ListRequest {
    /// Pagination arguments.
    pub arguments: pagination::Arguments,

    /// Normalized name prefix to search for, if any.
    pub name_prefix: Option<String>,

    /// [`Order`] by creation time, if any.
    pub created_at_order: Option<Order>,
}

impl TryFrom<ListParams> for ListRequest {
    type Error = Error;

    fn try_from(params: ListParams) -> std::result::Result<Self, Error> {
        /// Parses an optional integer parameter, treating blank as absent.
        fn int(
            name: &str,
            value: Option<&str>,
        ) -> std::result::Result<Option<i64>, Error> {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| {
                    v.parse().map_err(|e| {
                        Error::bad_request(format!("invalid `{name}`: {e}"))
                    })
                })
                .transpose()
        }

        let ListParams {
            search,
            order_by_created_at,
            page,
            limit,
        } = params;

        /// Checks that a pagination parameter is a positive `u32`.
        fn positive(
            name: &str,
            value: Option<i64>,
        ) -> std::result::Result<Option<u32>, Error> {
            value
                .map(|v| match v {
                    ..=0 => Err(Error::bad_request(format!(
                        "`{name}` must be positive",
                    ))),
                    v => u32::try_from(v).map_err(|_| {
                        Error::bad_request(format!(
                            "`{name}` must be a positive integer below 2^32",
                        ))
                    }),
                })
                .transpose()
        }

        let page = positive("page", int("page", page.as_deref())?)?;
        let limit = positive("limit", int("limit", limit.as_deref())?)?;
        let arguments =
            pagination::Arguments::new(page, limit).ok_or_else(|| {
                Error::bad_request("`page` and `limit` must be positive")
            })?;

        let created_at_order =
            int("order_by_created_at", order_by_created_at.as_deref())?
                .and_then(Order::from_flag);

        Ok(Self {
            arguments,
            name_prefix: search
                .as_deref()
                .and_then(service::read::name_prefix),
            created_at_order,
        })
    }
}

/// Creates a [`Router`] serving the whole API.
///
/// Expects the [`Service`] to be provided as an [`Extension`].
///
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
pub fn router() -> Router {
    Router::new()
        .route(
            "/product",
            post(product::create_handler).put(product::update_handler),
        )
        .route("/product/list", get(product::list_handler))
        .route(
            "/product/:id",
            get(product::get_handler).delete(product::delete_handler),
        )
        .route(
            "/user",
            post(user::create_handler).put(user::update_name_handler),
        )
        .route("/user/login", post(user::login_handler))
        .route("/user/email", put(user::update_email_handler))
        .route("/user/list", get(user::list_handler))
        .route(
            "/user/:id",
            get(user::get_handler).delete(user::delete_handler),
        )
}

#[cfg(test)]
pub(crate) mod mock;

#[cfg(test)]
mod spec {
    use common::pagination::Order;

    use super::{id, Envelope, ListParams, ListRequest};

    fn params(
        search: Option<&str>,
        order: Option<&str>,
        page: Option<&str>,
        limit: Option<&str>,
    ) -> ListParams {
        ListParams {
            search: search.map(ToOwned::to_owned),
            order_by_created_at: order.map(ToOwned::to_owned),
            page: page.map(ToOwned::to_owned),
            limit: limit.map(ToOwned::to_owned),
        }
    }

    #[test]
    fn parses_default_list_params() {
        let req = ListRequest::try_from(ListParams::default()).unwrap();

        assert_eq!(req.arguments.page(), 1);
        assert_eq!(req.arguments.limit(), 10);
        assert_eq!(req.name_prefix, None);
        assert_eq!(req.created_at_order, None);
    }

    #[test]
    fn parses_list_params() {
        let req = ListRequest::try_from(params(
            Some(" Wid "),
            Some("1"),
            Some("3"),
            Some("5"),
        ))
        .unwrap();

        assert_eq!(req.arguments.offset(), 10);
        assert_eq!(req.name_prefix.as_deref(), Some("Wid"));
        assert_eq!(req.created_at_order, Some(Order::Descending));

        let req = ListRequest::try_from(params(
            Some("  "),
            Some("-1"),
            Some(""),
            None,
        ))
        .unwrap();

        assert_eq!(req.arguments.page(), 1);
        assert_eq!(req.name_prefix, None);
        assert_eq!(req.created_at_order, Some(Order::Ascending));
    }

    #[test]
    fn rejects_invalid_list_params() {
        for p in [
            params(None, None, Some("0"), None),
            params(None, None, None, Some("-10")),
            params(None, None, Some("one"), None),
            params(None, Some("up"), None, None),
        ] {
            let err = ListRequest::try_from(p).unwrap_err();
            assert_eq!(err.code, 1000);
        }
    }

    #[test]
    fn explains_rejected_pagination() {
        let err = ListRequest::try_from(params(None, None, Some("0"), None))
            .unwrap_err();
        assert_eq!(err.message, "`page` must be positive");

        let err = ListRequest::try_from(params(
            None,
            None,
            Some("99999999999"),
            None,
        ))
        .unwrap_err();
        assert_eq!(err.code, 1000);
        assert_eq!(
            err.message,
            "`page` must be a positive integer below 2^32",
        );

        let err = ListRequest::try_from(params(
            None,
            None,
            None,
            Some("4294967296"),
        ))
        .unwrap_err();
        assert_eq!(
            err.message,
            "`limit` must be a positive integer below 2^32",
        );

        let req = ListRequest::try_from(params(
            None,
            None,
            Some("4294967295"),
            Some("1"),
        ))
        .unwrap();
        assert_eq!(req.arguments.page(), u32::MAX);
    }

    #[test]
    fn rejects_non_positive_id() {
        assert_eq!(id::<i64>(7).unwrap(), 7);
        assert_eq!(id::<i64>(0).unwrap_err().code, 1000);
        assert_eq!(id::<i64>(-3).unwrap_err().code, 1000);
    }

    mod routing {
        use std::time::Duration;

        use axum::{
            body::{self, Body},
            Extension, Router,
        };
        use http::{Method, Request, StatusCode};
        use service::{domain::DeletionMode, infra::Postgres};
        use tower::ServiceExt as _;

        use crate::{config, Service};

        /// Builds the [`router()`] over a lazily connected [`Postgres`],
        /// so only requests rejected before touching the database succeed.
        ///
        /// [`router()`]: super::super::router
        fn app() -> Router {
            let db = Postgres::new(
                &(&config::Postgres::default()).into(),
                Duration::from_secs(1),
            )
            .unwrap();
            let svc = Service::new(
                service::Config {
                    jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                        b"test",
                    ),
                    jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                        b"test",
                    ),
                    session_ttl: Duration::from_secs(60),
                    deletion: DeletionMode::Hard,
                },
                db,
            );
            super::super::router().layer(Extension(svc))
        }

        async fn call(
            method: Method,
            uri: &str,
            body: Option<serde_json::Value>,
        ) -> (StatusCode, serde_json::Value) {
            let req = Request::builder().method(method).uri(uri);
            let req = match body {
                Some(json) => req
                    .header(http::header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json.to_string())),
                None => req.body(Body::empty()),
            }
            .unwrap();

            let resp = app().oneshot(req).await.unwrap();
            let status = resp.status();
            let bytes =
                body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
            (status, serde_json::from_slice(&bytes).unwrap())
        }

        #[tokio::test]
        async fn requires_token_for_mutations() {
            for (method, uri, body) in [
                (
                    Method::POST,
                    "/product",
                    Some(serde_json::json!({"product_name": "Widget"})),
                ),
                (
                    Method::PUT,
                    "/product",
                    Some(serde_json::json!({"id": 1, "product_name": "W"})),
                ),
                (Method::DELETE, "/product/1", None),
                (Method::PUT, "/user", Some(serde_json::json!({"id": 1}))),
                (
                    Method::PUT,
                    "/user/email",
                    Some(serde_json::json!({"email": "a@b.io"})),
                ),
                (Method::DELETE, "/user/1", None),
            ] {
                let (status, json) = call(method, uri, body).await;

                assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
                assert_eq!(json["error_code"], 1001, "{uri}");
                assert_eq!(json["body"], serde_json::Value::Null, "{uri}");
            }
        }

        #[tokio::test]
        async fn rejects_malformed_reads() {
            for uri in [
                "/product/0",
                "/product/abc",
                "/product/list?page=0",
                "/user/-1",
                "/user/list?limit=many",
            ] {
                let (status, json) = call(Method::GET, uri, None).await;

                assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
                assert_eq!(json["error_code"], 1000, "{uri}");
            }
        }
    }

    #[test]
    fn serializes_envelope() {
        assert_eq!(
            serde_json::to_value(Envelope::success(42)).unwrap(),
            serde_json::json!({
                "error_code": 0,
                "error_message": "",
                "body": 42,
            }),
        );
        assert_eq!(
            serde_json::to_value(Envelope::<()>::message(
                "Successfully deleted"
            ))
            .unwrap(),
            serde_json::json!({
                "error_code": 0,
                "error_message": "Successfully deleted",
            }),
        );
        assert_eq!(
            serde_json::to_value(Envelope::<()>::failure(2001, "gone".into()))
                .unwrap(),
            serde_json::json!({
                "error_code": 2001,
                "error_message": "gone",
                "body": null,
            }),
        );
    }
}
