//! Centralized error mapping for Axum
//!
//! Handlers, extractors and responders signal failures with [`ApiError`]; the
//! middleware below is the single place where those failures are classified,
//! logged and rendered into an [`ErrorBody`](crate::api::error::ErrorBody).

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::any::Any;

use crate::api::error::{ApiError, UnhandledError};

/// Header holding the correlation id set by the ingress.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware function that provides centralized error mapping.
///
/// Must sit outside the panic catcher so that panics reach it as
/// [`ApiError::Internal`].
pub async fn error_mapping_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let url = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<UnhandledError>() {
        Some(UnhandledError(err)) => render(&err, &method, &url, &request_id),
        None => response,
    }
}

fn render(err: &ApiError, method: &str, url: &str, request_id: &str) -> Response {
    match err {
        ApiError::RequestValidation { issues } | ApiError::ResponseSerialization { issues } => {
            tracing::error!(
                request_id,
                method,
                url,
                kind = err.kind(),
                issues = ?issues,
                "{err}"
            );
        }
        ApiError::Internal(detail) => {
            tracing::error!(request_id, method, url, kind = err.kind(), "{detail}");
        }
    }

    (err.status(), Json(err.to_body(method, url))).into_response()
}

/// `CatchPanicLayer::custom` handler: a panicking handler becomes an
/// unclassified internal error rendered by the boundary.
pub fn panic_to_api_error(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::internal(format!("handler panicked: {detail}")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::schema::Issue;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn boom() -> &'static str {
        panic!("kaboom")
    }

    fn app() -> Router {
        Router::new()
            .route("/ok", get(|| async { "fine" }))
            .route(
                "/invalid",
                get(|| async {
                    Err::<(), _>(ApiError::request_validation(vec![Issue::body("bad")]))
                }),
            )
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(panic_to_api_error))
            .layer(middleware::from_fn(error_mapping_middleware))
    }

    #[tokio::test]
    async fn passes_through_success() {
        let resp = app()
            .oneshot(http::Request::get("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn renders_request_validation_with_method_and_url() {
        let resp = app()
            .oneshot(
                http::Request::get("/invalid?x=1")
                    .header(REQUEST_ID_HEADER, "req-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(resp.extensions().get::<UnhandledError>().is_none());

        let json = body_json(resp).await;
        assert_eq!(json["error"], "Request Validation Error");
        assert_eq!(json["details"]["method"], "GET");
        assert_eq!(json["details"]["url"], "/invalid?x=1");
        assert_eq!(json["details"]["issues"][0]["code"], "invalid_body");
    }

    #[tokio::test]
    async fn panics_become_unclassified_errors() {
        let resp = app()
            .oneshot(http::Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(resp).await;
        assert_eq!(json["message"], "Something went wrong");
        assert!(json.get("details").is_none());
    }
}
