use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::schema::Issue;

/// Unified API error type that handles all errors at the API boundary.
///
/// Handlers return `Result<_, ApiError>` and use `?`; rendering is deferred to
/// [`crate::api::error_mapping_middleware`], which knows the request method and
/// URL and is the only place that turns errors into response bodies.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ApiError {
    /// Inbound path or body data does not match its schema.
    #[error("request doesn't match the schema ({} issue(s))", .issues.len())]
    RequestValidation { issues: Vec<Issue> },

    /// A handler produced a value that does not match its declared schema.
    #[error("response doesn't match the schema ({} issue(s))", .issues.len())]
    ResponseSerialization { issues: Vec<Issue> },

    /// Anything else. The message is logged, never sent to clients.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn request_validation(issues: Vec<Issue>) -> Self {
        ApiError::RequestValidation { issues }
    }

    pub fn response_serialization(issues: Vec<Issue>) -> Self {
        ApiError::ResponseSerialization { issues }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RequestValidation { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResponseSerialization { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::RequestValidation { .. } => "request_validation",
            ApiError::ResponseSerialization { .. } => "response_serialization",
            ApiError::Internal(_) => "internal",
        }
    }

    /// Render the client-facing body for a request.
    pub fn to_body(&self, method: &str, url: &str) -> ErrorBody {
        let details = |issues: &[Issue]| ErrorDetails {
            issues: issues.to_vec(),
            method: method.to_string(),
            url: url.to_string(),
        };

        match self {
            ApiError::RequestValidation { issues } => ErrorBody {
                error: "Request Validation Error".into(),
                message: "Request doesn't match the schema".into(),
                status_code: 400,
                details: Some(details(issues)),
            },
            ApiError::ResponseSerialization { issues } => ErrorBody {
                error: "Internal Server Error".into(),
                message: "Response doesn't match the schema".into(),
                status_code: 500,
                details: Some(details(issues)),
            },
            ApiError::Internal(_) => ErrorBody {
                error: "Internal Server Error".into(),
                message: "Something went wrong".into(),
                status_code: 500,
                details: None,
            },
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(format!("{e:#}"))
    }
}

/// Response extension carrying an error to the boundary.
#[derive(Debug, Clone)]
pub struct UnhandledError(pub ApiError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Placeholder body; the error boundary replaces it with a full `ErrorBody`
        let mut resp = axum::Json(self.to_body("", "")).into_response();
        *resp.status_mut() = self.status();
        resp.extensions_mut().insert(UnhandledError(self));
        resp
    }
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Error category, e.g. "Request Validation Error".
    pub error: String,
    pub message: String,
    pub status_code: u16,
    // Optional but never `null`; OpenAPI 3.0 has no `null` type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(nullable = false)]
    pub details: Option<ErrorDetails>,
}

/// Structured context for schema errors.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetails {
    pub issues: Vec<Issue>,
    pub method: String,
    pub url: String,
}

/// Generic Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::schema::{IssueCode, PathSegment};
    use serde_json::json;

    fn email_issue() -> Issue {
        Issue::new(
            IssueCode::InvalidString,
            vec![PathSegment::from("email")],
            "Invalid email",
        )
    }

    #[test]
    fn request_validation_body() {
        let body = ApiError::request_validation(vec![email_issue()]).to_body("POST", "/users");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "Request Validation Error");
        assert_eq!(json["message"], "Request doesn't match the schema");
        assert_eq!(json["statusCode"], 400);
        assert_eq!(json["details"]["method"], "POST");
        assert_eq!(json["details"]["url"], "/users");
        assert_eq!(json["details"]["issues"][0]["path"], json!(["email"]));
    }

    #[test]
    fn response_serialization_body() {
        let err = ApiError::response_serialization(vec![email_issue()]);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = serde_json::to_value(err.to_body("GET", "/users")).unwrap();
        assert_eq!(json["error"], "Internal Server Error");
        assert_eq!(json["message"], "Response doesn't match the schema");
        assert_eq!(json["statusCode"], 500);
        assert!(json["details"]["issues"].is_array());
    }

    #[test]
    fn internal_body_hides_details() {
        let err: ApiError = anyhow::anyhow!("db exploded").into();
        let json = serde_json::to_value(err.to_body("GET", "/x")).unwrap();
        assert_eq!(
            json,
            json!({
                "error": "Internal Server Error",
                "message": "Something went wrong",
                "statusCode": 500
            })
        );
    }

    #[test]
    fn details_schema_is_optional_and_not_nullable() {
        let schema = serde_json::to_value(<ErrorBody as utoipa::PartialSchema>::schema()).unwrap();
        assert!(
            !schema.to_string().contains("\"null\""),
            "null type in {schema}"
        );
        assert!(schema["properties"]["details"].is_object());
        let required = schema["required"].as_array().cloned().unwrap_or_default();
        assert!(!required.contains(&json!("details")));
        assert!(required.contains(&json!("statusCode")));
    }

    #[test]
    fn into_response_defers_to_boundary() {
        let resp = ApiError::internal("boom").into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let carried = resp.extensions().get::<UnhandledError>().unwrap();
        assert_eq!(carried.0.kind(), "internal");
    }
}
