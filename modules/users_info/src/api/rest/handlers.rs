use std::sync::Arc;

use axum::{http::StatusCode, response::Response, Extension};
use modkit::{checked_json, checked_json_array, no_content, ApiResult, ValidJson, ValidPath};
use tracing::info;

use crate::api::rest::dto::{CreateUserReq, MessageDto, UpdateUserReq, UserDto, UserPathParams};
use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;

pub async fn ping() -> ApiResult<Response> {
    checked_json(StatusCode::OK, &MessageDto::new("pong"))
}

/// List all users in insertion order
pub async fn list_users(Extension(svc): Extension<Arc<Service>>) -> ApiResult<Response> {
    let users: Vec<UserDto> = svc.list_users().into_iter().map(UserDto::from).collect();
    checked_json_array(StatusCode::OK, &users)
}

/// Get a specific user by ID
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    ValidPath(path): ValidPath<UserPathParams>,
) -> ApiResult<Response> {
    match svc.get_user(&path.id) {
        Ok(user) => checked_json(StatusCode::OK, &UserDto::from(user)),
        Err(e) => map_domain_error(&e),
    }
}

/// Create a new user
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    ValidJson(req_body): ValidJson<CreateUserReq>,
) -> ApiResult<Response> {
    info!("Creating user: {:?}", req_body);

    let user = svc.create_user(req_body.into());
    checked_json(StatusCode::CREATED, &UserDto::from(user))
}

/// Replace all mutable fields of an existing user
pub async fn update_user(
    Extension(svc): Extension<Arc<Service>>,
    ValidPath(path): ValidPath<UserPathParams>,
    ValidJson(req_body): ValidJson<UpdateUserReq>,
) -> ApiResult<Response> {
    info!("Updating user {} with: {:?}", path.id, req_body);

    match svc.update_user(&path.id, req_body.into()) {
        Ok(user) => checked_json(StatusCode::OK, &UserDto::from(user)),
        Err(e) => map_domain_error(&e),
    }
}

/// Delete a user by ID
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    ValidPath(path): ValidPath<UserPathParams>,
) -> ApiResult<Response> {
    info!("Deleting user: {}", path.id);

    match svc.delete_user(&path.id) {
        Ok(()) => Ok(no_content()),
        Err(e) => map_domain_error(&e),
    }
}
