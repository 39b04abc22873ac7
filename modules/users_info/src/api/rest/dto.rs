use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::contract::model::{User, UserData};

/// REST DTO for user representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(as = User)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub age: f64,
    #[schema(format = "email")]
    pub email: String,
}

/// REST DTO for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(as = CreateUser)]
pub struct CreateUserReq {
    pub name: String,
    pub age: f64,
    #[schema(format = "email")]
    pub email: String,
}

/// REST DTO for replacing a user's fields
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(as = UpdateUser)]
pub struct UpdateUserReq {
    pub name: String,
    pub age: f64,
    #[schema(format = "email")]
    pub email: String,
}

/// `{message}` body shared by ping and not-found responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(as = Message)]
pub struct MessageDto {
    pub message: String,
}

impl MessageDto {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Path parameters of the `/users/{id}` routes
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct UserPathParams {
    /// User id
    pub id: String,
}

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            age: user.age,
            email: user.email,
        }
    }
}

impl From<CreateUserReq> for UserData {
    fn from(req: CreateUserReq) -> Self {
        Self {
            name: req.name,
            age: req.age,
            email: req.email,
        }
    }
}

impl From<UpdateUserReq> for UserData {
    fn from(req: UpdateUserReq) -> Self {
        Self {
            name: req.name,
            age: req.age,
            email: req.email,
        }
    }
}
