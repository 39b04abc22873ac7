use std::sync::Arc;

use modkit::api::OpenApiRegistry;
use modkit::RestfulModule;
use tracing::info;

use crate::api::rest::routes;
use crate::domain::service::Service;
use crate::infra::storage::InMemoryUsersRepository;

/// Users module: owns one in-memory store and exposes it over REST.
///
/// Each instance has its own store, so tests can assemble isolated services.
#[derive(Clone)]
pub struct UsersInfo {
    service: Arc<Service>,
}

impl Default for UsersInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl UsersInfo {
    pub fn new() -> Self {
        let repo = InMemoryUsersRepository::new();
        Self {
            service: Arc::new(Service::new(Arc::new(repo))),
        }
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }
}

impl RestfulModule for UsersInfo {
    fn register_rest(
        &self,
        router: axum::Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering users_info REST routes");
        let router = routes::register_routes(router, openapi, self.service.clone())?;
        info!("Users REST routes registered successfully");
        Ok(router)
    }
}
