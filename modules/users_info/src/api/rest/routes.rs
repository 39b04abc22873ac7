use std::sync::Arc;

use axum::{Extension, Router};
use modkit::api::{Missing, OpenApiRegistry, OperationBuilder};

use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

type Op = OperationBuilder<Missing, Missing, ()>;

pub fn register_routes(
    mut router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
) -> anyhow::Result<Router> {
    // GET /ping - Liveness probe
    router = Op::get("/ping")
        .operation_id("ping")
        .summary("Ping route")
        .description("Returns pong")
        .tag("ping")
        .handler(handlers::ping)
        .json_response_with_schema::<dto::MessageDto>(openapi, 200, "Pong")
        .error_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    // GET /users - List all users
    router = Op::get("/users")
        .operation_id("getUsers")
        .summary("Get all users")
        .description("Returns every user in insertion order")
        .tag("users")
        .handler(handlers::list_users)
        .json_array_response_with_schema::<dto::UserDto>(openapi, 200, "List of users")
        .error_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    // GET /users/{id} - Get a specific user
    router = Op::get("/users/{id}")
        .operation_id("getUserById")
        .summary("Get a user by ID")
        .description("Returns the user with the given id")
        .tag("users")
        .path_params::<dto::UserPathParams>()
        .handler(handlers::get_user)
        .json_response_with_schema::<dto::UserDto>(openapi, 200, "User found")
        .json_response_with_schema::<dto::MessageDto>(openapi, 404, "User not found")
        .error_response(openapi, 400, "Request Validation Error")
        .error_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    // POST /users - Create a new user
    router = Op::post("/users")
        .operation_id("createUser")
        .summary("Create a user")
        .description("Creates a user with a server-generated id")
        .tag("users")
        .json_request::<dto::CreateUserReq>(openapi, "User to create")
        .handler(handlers::create_user)
        .json_response_with_schema::<dto::UserDto>(openapi, 201, "Created user")
        .error_response(openapi, 400, "Request Validation Error")
        .error_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    // PUT /users/{id} - Replace a user's fields
    router = Op::put("/users/{id}")
        .operation_id("updateUserById")
        .summary("Update a user by ID")
        .description("Replaces name, age and email of the user with the given id")
        .tag("users")
        .path_params::<dto::UserPathParams>()
        .json_request::<dto::UpdateUserReq>(openapi, "New user fields")
        .handler(handlers::update_user)
        .json_response_with_schema::<dto::UserDto>(openapi, 200, "Updated user")
        .json_response_with_schema::<dto::MessageDto>(openapi, 404, "User not found")
        .error_response(openapi, 400, "Request Validation Error")
        .error_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    // DELETE /users/{id} - Delete a user
    router = Op::delete("/users/{id}")
        .operation_id("deleteUserById")
        .summary("Delete a user by ID")
        .description("Removes the user with the given id")
        .tag("users")
        .path_params::<dto::UserPathParams>()
        .handler(handlers::delete_user)
        .empty_response(204, "User deleted")
        .json_response_with_schema::<dto::MessageDto>(openapi, 404, "User not found")
        .error_response(openapi, 400, "Request Validation Error")
        .error_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = router.layer(Extension(service));

    Ok(router)
}
