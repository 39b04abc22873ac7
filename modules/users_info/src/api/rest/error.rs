use axum::{http::StatusCode, response::Response};
use modkit::{checked_json, ApiResult};

use crate::api::rest::dto::MessageDto;
use crate::domain::error::DomainError;

pub const USER_NOT_FOUND: &str = "User not found";

/// Map a domain error to its direct handler response.
///
/// Not-found is an ordinary 404 reply, not a boundary error.
pub fn map_domain_error(e: &DomainError) -> ApiResult<Response> {
    match e {
        DomainError::UserNotFound { id } => {
            tracing::debug!(user_id = %id, "user not found");
            checked_json(StatusCode::NOT_FOUND, &MessageDto::new(USER_NOT_FOUND))
        }
    }
}
