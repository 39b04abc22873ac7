//! Validating extractors.
//!
//! Every rejection is an [`ApiError::RequestValidation`], so a malformed request
//! never reaches the handler body and is rendered by the error boundary.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{header, request::Parts, HeaderMap},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use utoipa::ToSchema;

use crate::api::error::ApiError;
use crate::api::schema::{Issue, SchemaDoc};

/// JSON body checked against `T`'s derived schema, then deserialized.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

/// Path parameters; extraction failures become validation errors.
#[derive(Debug, Clone)]
pub struct ValidPath<T>(pub T);

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json"
                || (mime.starts_with("application/") && mime.ends_with("+json"))
        })
        .unwrap_or(false)
}

fn invalid(issue: Issue) -> ApiError {
    ApiError::request_validation(vec![issue])
}

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + ToSchema,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json(req.headers()) {
            return Err(invalid(Issue::body(
                "Expected request with `Content-Type: application/json`",
            )));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| invalid(Issue::body(rejection.body_text())))?;

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| invalid(Issue::body(format!("Invalid JSON body: {e}"))))?;

        let issues = SchemaDoc::of::<T>().validate(&value);
        if !issues.is_empty() {
            return Err(ApiError::request_validation(issues));
        }

        serde_json::from_value(value)
            .map(ValidJson)
            .map_err(|e| invalid(Issue::body(e.to_string())))
    }
}

impl<T, S> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| ValidPath(value))
            .map_err(|rejection| invalid(Issue::params(rejection.body_text())))
    }
}
