use axum::{
    http::{Method, StatusCode, Uri},
    response::{Html, IntoResponse, Json, Response},
};
use modkit::ErrorBody;

/// Fallback for unmatched routes.
pub async fn not_found(method: Method, uri: Uri) -> Response {
    let body = ErrorBody {
        error: "Not Found".to_string(),
        message: format!("Route {method}:{} not found", uri.path()),
        status_code: StatusCode::NOT_FOUND.as_u16(),
        details: None,
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// Stoplight Elements page rendering `/openapi.json`.
pub async fn serve_docs() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>API Docs</title>
  <script src="https://unpkg.com/@stoplight/elements@latest/web-components.min.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@latest/styles.min.css">
</head>
<body>
  <elements-api apiDescriptionUrl="/openapi.json" router="hash" layout="sidebar"></elements-api>
</body>
</html>"#,
    )
}
