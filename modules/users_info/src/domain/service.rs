use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{User, UserData};
use crate::domain::error::DomainError;
use crate::domain::repo::UsersRepository;

/// Domain service for user management.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
}

impl Service {
    pub fn new(repo: Arc<dyn UsersRepository>) -> Self {
        Self { repo }
    }

    #[instrument(name = "users_info.service.list_users", skip(self))]
    pub fn list_users(&self) -> Vec<User> {
        let users = self.repo.list();
        debug!("Listed {} users", users.len());
        users
    }

    #[instrument(name = "users_info.service.get_user", skip(self), fields(user_id = %id))]
    pub fn get_user(&self, id: &str) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    #[instrument(name = "users_info.service.create_user", skip(self, data))]
    pub fn create_user(&self, data: UserData) -> User {
        let user = User::from_data(Uuid::new_v4().to_string(), data);
        self.repo.insert(user.clone());
        info!(user_id = %user.id, "Created user");
        user
    }

    #[instrument(name = "users_info.service.update_user", skip(self, data), fields(user_id = %id))]
    pub fn update_user(&self, id: &str, data: UserData) -> Result<User, DomainError> {
        let user = self
            .repo
            .replace(id, data)
            .ok_or_else(|| DomainError::user_not_found(id))?;
        info!("Updated user");
        Ok(user)
    }

    #[instrument(name = "users_info.service.delete_user", skip(self), fields(user_id = %id))]
    pub fn delete_user(&self, id: &str) -> Result<(), DomainError> {
        if !self.repo.delete(id) {
            return Err(DomainError::user_not_found(id));
        }
        info!("Deleted user");
        Ok(())
    }
}
