//! Responders that hold handlers to their declared response schema.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::error::ApiError;
use crate::api::schema::SchemaDoc;

/// `status` + JSON of `value`, checked against `T`'s schema.
pub fn checked_json<T>(status: StatusCode, value: &T) -> Result<Response, ApiError>
where
    T: Serialize + ToSchema,
{
    respond(status, &SchemaDoc::of::<T>(), value)
}

/// `status` + JSON array of `values`, each checked against `T`'s schema.
pub fn checked_json_array<T>(status: StatusCode, values: &[T]) -> Result<Response, ApiError>
where
    T: Serialize + ToSchema,
{
    respond(status, &SchemaDoc::array_of::<T>(), values)
}

/// 204 No Content
pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

fn respond<V>(status: StatusCode, doc: &SchemaDoc, value: &V) -> Result<Response, ApiError>
where
    V: Serialize + ?Sized,
{
    let json = serde_json::to_value(value)
        .map_err(|e| ApiError::internal(format!("failed to serialize {}: {e}", doc.name())))?;

    let issues = doc.validate(&json);
    if !issues.is_empty() {
        return Err(ApiError::response_serialization(issues));
    }

    Ok((status, Json(json)).into_response())
}
