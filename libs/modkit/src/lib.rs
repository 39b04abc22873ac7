//! # ModKit
//!
//! Building blocks for the service's HTTP modules: module contracts, the
//! type-safe operation builder, schema-validated extractors and responders,
//! the error boundary and shutdown handling.
//!
//! ## Example
//!
//! ```rust,ignore
//! use modkit::{OperationBuilder, ValidJson, checked_json};
//!
//! router = OperationBuilder::post("/users")
//!     .operation_id("users.create")
//!     .json_request::<CreateUserReq>(openapi, "User to create")
//!     .handler(create_user)
//!     .json_response_with_schema::<UserDto>(openapi, 201, "Created user")
//!     .error_response(openapi, 400, "Request Validation Error")
//!     .register(router, openapi);
//! ```

pub use anyhow::Result;

// Core module contracts and traits
pub mod contracts;
pub use crate::contracts::*;

// Type-safe API operation builder, validation and errors
pub mod api;
pub use api::{
    checked_json, checked_json_array, error_mapping_middleware, no_content, panic_to_api_error,
    ApiError, ApiResult, ErrorBody, Issue, IssueCode, OperationBuilder, SchemaDoc, ValidJson,
    ValidPath,
};

pub mod runtime;
pub use runtime::wait_for_shutdown;
