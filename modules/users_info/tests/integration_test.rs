use api_ingress::{ApiIngress, ApiIngressConfig};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use modkit::contracts::{RestHostModule, RestfulModule};
use serde_json::{json, Value};
use tower::ServiceExt;
use users_info::UsersInfo;

/// Users routes behind the full ingress stack (error boundary, fallback).
fn app() -> Router {
    let ingress = ApiIngress::new(ApiIngressConfig::default());
    let router = UsersInfo::new()
        .register_rest(Router::new(), ingress.as_registry())
        .expect("register users routes");
    ingress.rest_finalize(router).expect("finalize router")
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn ann() -> Value {
    json!({ "name": "Ann", "age": 31, "email": "ann@example.com" })
}

#[tokio::test]
async fn ping_returns_pong_without_side_effects() {
    let app = app();
    let (status, body) = call(&app, "GET", "/ping", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "pong" }));

    let (_, users) = call(&app, "GET", "/users", None).await;
    assert_eq!(users, json!([]));
}

#[tokio::test]
async fn created_user_is_listed_and_retrievable() {
    let app = app();
    let (status, created) = call(&app, "POST", "/users", Some(ann())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().expect("generated id").to_string();
    assert!(!id.is_empty());
    assert_eq!(created["name"], "Ann");
    assert_eq!(created["age"], 31.0);
    assert_eq!(created["email"], "ann@example.com");

    let (status, list) = call(&app, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([created.clone()]));

    let (status, fetched) = call(&app, "GET", &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn ids_are_fresh_and_list_keeps_insertion_order() {
    let app = app();
    let (_, a) = call(&app, "POST", "/users", Some(ann())).await;
    let (_, b) = call(
        &app,
        "POST",
        "/users",
        Some(json!({ "name": "Bob", "age": 40.5, "email": "bob@example.com" })),
    )
    .await;
    assert_ne!(a["id"], b["id"]);

    let (_, list) = call(&app, "GET", "/users", None).await;
    assert_eq!(list, json!([a, b]));
}

#[tokio::test]
async fn client_supplied_id_is_ignored() {
    let app = app();
    let mut body = ann();
    body["id"] = json!("chosen-by-client");

    let (status, created) = call(&app, "POST", "/users", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(created["id"], "chosen-by-client");
}

#[tokio::test]
async fn unknown_id_is_404_message() {
    let app = app();
    let not_found = json!({ "message": "User not found" });

    let (status, body) = call(&app, "GET", "/users/never-issued", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, not_found);

    let (status, body) = call(&app, "PUT", "/users/never-issued", Some(ann())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, not_found);
}

#[tokio::test]
async fn unsupported_methods_on_known_paths_are_404_error_bodies() {
    let app = app();
    let cases = [
        ("PATCH", "/users", Some(ann())),
        ("POST", "/ping", None),
        ("POST", "/users/abc", Some(ann())),
    ];
    for (method, uri, body) in cases {
        let (status, body) = call(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(
            body,
            json!({
                "error": "Not Found",
                "message": format!("Route {method}:{uri} not found"),
                "statusCode": 404
            })
        );
    }

    // Nothing was stored on the way
    let (_, users) = call(&app, "GET", "/users", None).await;
    assert_eq!(users, json!([]));
}

#[tokio::test]
async fn update_replaces_all_fields_but_id_and_is_idempotent() {
    let app = app();
    let (_, created) = call(&app, "POST", "/users", Some(ann())).await;
    let id = created["id"].as_str().unwrap().to_string();
    let uri = format!("/users/{id}");
    let replacement = json!({ "name": "Annie", "age": 32, "email": "annie@example.com" });

    let (status, first) = call(&app, "PUT", &uri, Some(replacement.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["id"], id.as_str());
    assert_eq!(first["name"], "Annie");
    assert_eq!(first["email"], "annie@example.com");

    let (status, second) = call(&app, "PUT", &uri, Some(replacement)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);

    let (_, fetched) = call(&app, "GET", &uri, None).await;
    assert_eq!(fetched, first);
}

#[tokio::test]
async fn delete_removes_and_missing_delete_leaves_store_unchanged() {
    let app = app();
    let (_, a) = call(&app, "POST", "/users", Some(ann())).await;
    let (_, b) = call(&app, "POST", "/users", Some(ann())).await;
    let uri = format!("/users/{}", a["id"].as_str().unwrap());

    let (status, body) = call(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = call(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "User not found" }));

    let (_, list) = call(&app, "GET", "/users", None).await;
    assert_eq!(list, json!([b]));
}

#[tokio::test]
async fn invalid_email_is_rejected_and_store_unchanged() {
    let app = app();
    let mut body = ann();
    body["email"] = json!("not-an-email");

    let (status, err) = call(&app, "POST", "/users", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Request Validation Error");
    assert_eq!(err["message"], "Request doesn't match the schema");
    assert_eq!(err["statusCode"], 400);
    assert_eq!(err["details"]["method"], "POST");
    assert_eq!(err["details"]["url"], "/users");

    let issues = err["details"]["issues"].as_array().unwrap();
    assert!(issues.iter().any(|i| i["path"] == json!(["email"])));

    let (_, list) = call(&app, "GET", "/users", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn wrong_types_and_missing_fields_are_reported() {
    let app = app();
    let (status, err) = call(
        &app,
        "POST",
        "/users",
        Some(json!({ "name": 7, "email": "ann@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let issues = err["details"]["issues"].as_array().unwrap();
    assert!(issues
        .iter()
        .any(|i| i["path"] == json!(["name"]) && i["code"] == "invalid_type"));
    assert!(issues
        .iter()
        .any(|i| i["path"] == json!(["age"]) && i["message"] == "Required"));
}

#[tokio::test]
async fn invalid_update_does_not_touch_the_record() {
    let app = app();
    let (_, created) = call(&app, "POST", "/users", Some(ann())).await;
    let uri = format!("/users/{}", created["id"].as_str().unwrap());

    let (status, _) = call(
        &app,
        "PUT",
        &uri,
        Some(json!({ "name": "Annie", "age": "old", "email": "annie@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, fetched) = call(&app, "GET", &uri, None).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn stores_are_isolated_per_instance() {
    let first = app();
    let second = app();
    call(&first, "POST", "/users", Some(ann())).await;

    let (_, list) = call(&second, "GET", "/users", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn documentation_lists_every_operation() {
    let (status, doc) = call(&app(), "GET", "/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);

    let paths = &doc["paths"];
    assert_eq!(paths["/ping"]["get"]["tags"], json!(["ping"]));
    for method in ["get", "post"] {
        assert_eq!(paths["/users"][method]["tags"], json!(["users"]));
    }
    for method in ["get", "put", "delete"] {
        let op = &paths["/users/{id}"][method];
        assert_eq!(op["tags"], json!(["users"]));
        assert_eq!(op["parameters"][0]["name"], "id");
        assert_eq!(op["parameters"][0]["in"], "path");
        assert_eq!(op["parameters"][0]["required"], true);
    }
    assert_eq!(paths["/users"]["post"]["summary"], "Create a user");
    assert!(paths["/users/{id}"]["delete"]["responses"]["204"]
        .get("content")
        .is_none());

    let schemas = &doc["components"]["schemas"];
    for name in ["User", "CreateUser", "UpdateUser", "Message", "ErrorBody"] {
        assert!(schemas[name].is_object(), "missing component {name}");
    }
    assert_eq!(schemas["CreateUser"]["properties"]["email"]["format"], "email");
    assert!(schemas["CreateUser"]["properties"].get("id").is_none());
}
